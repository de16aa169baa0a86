use fleet_core::error::CoreError;
use fleet_core::types::VehicleId;
use fleet_core::validation::ValidationFailed;

/// Failure reported by a [`VehicleStore`](crate::VehicleStore) or
/// [`ChangeFeed`](crate::ChangeFeed).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The write was rejected by the validation layer; nothing was stored.
    #[error(transparent)]
    Validation(#[from] ValidationFailed),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backend cannot currently be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be decoded into a vehicle.
    #[error("Corrupt vehicle row {id}: {reason}")]
    Corrupt { id: VehicleId, reason: String },
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(v) => CoreError::Validation(v),
            StoreError::Database(e) => CoreError::StoreUnavailable(e.to_string()),
            StoreError::Unavailable(msg) => CoreError::StoreUnavailable(msg),
            corrupt @ StoreError::Corrupt { .. } => CoreError::Internal(corrupt.to_string()),
        }
    }
}
