use crate::validation::ValidationFailed;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Validation(#[from] ValidationFailed),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a missing vehicle.
    pub fn vehicle_not_found(id: impl ToString) -> Self {
        CoreError::NotFound {
            entity: "Vehicle",
            id: id.to_string(),
        }
    }
}
