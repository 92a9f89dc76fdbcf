use thiserror::Error;

/// Caller-correctable input problems, each a distinct failure mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no image uploaded")]
    MissingFile,
    #[error("unsupported file type `{0}`; only jpeg, jpg, png, webp images are allowed")]
    UnsupportedFileType(String),
    #[error("file too large: {size} bytes exceeds the {max} byte limit")]
    FileTooLarge { size: usize, max: usize },
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("authentication required")]
    Unauthorized,
    #[error("invalid credential: {0}")]
    InvalidCredential(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("identity verifier unavailable: {0}")]
    IdentityUnavailable(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn db(e: impl std::fmt::Display) -> Self { Self::StorageUnavailable(format!("database: {e}")) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(ValidationError::MissingFile) => 1001,
            ServiceError::Validation(ValidationError::UnsupportedFileType(_)) => 1002,
            ServiceError::Validation(ValidationError::FileTooLarge { .. }) => 1003,
            ServiceError::Validation(ValidationError::MissingField(_)) => 1004,
            ServiceError::Validation(ValidationError::Invalid(_)) => 1005,
            ServiceError::NotFound(_) => 1100,
            ServiceError::Unauthorized => 1200,
            ServiceError::InvalidCredential(_) => 1201,
            ServiceError::StorageUnavailable(_) => 1300,
            ServiceError::IdentityUnavailable(_) => 1301,
        }
    }
}

impl From<models::errors::ModelError> for ServiceError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::Validation(msg) => Self::Validation(ValidationError::Invalid(msg)),
            models::errors::ModelError::Db(msg) => Self::db(msg),
        }
    }
}
