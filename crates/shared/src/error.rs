use thiserror::Error;

/// Form-level validation failures raised before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },
    #[error("{field} must be a number (got {value:?})")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} must be a whole number of zero or more (got {value:?})")]
    NotAQuantity { field: &'static str, value: String },
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("{field} must not be negative")]
    Negative { field: &'static str },
    #[error("{field} must be at least one cent (got {value:?})")]
    BelowOneCent { field: &'static str, value: String },
    #[error("unknown role {0:?}")]
    UnknownRole(String),
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Required { field }
            | ValidationError::NotANumber { field, .. }
            | ValidationError::NotAQuantity { field, .. }
            | ValidationError::NotPositive { field }
            | ValidationError::Negative { field }
            | ValidationError::BelowOneCent { field, .. } => *field,
            ValidationError::UnknownRole(_) => "role",
        }
    }
}
