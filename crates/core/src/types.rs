/// Vehicle identifiers are store-assigned PostgreSQL BIGSERIAL values.
pub type VehicleId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
