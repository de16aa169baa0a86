//! PostgreSQL repository layer.

pub mod vehicle_repo;

pub use vehicle_repo::PgVehicleStore;
