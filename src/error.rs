use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("Unexpected data type for total amount: {0}")]
    UnexpectedAggregateType(String),

    #[error("Unexpected data type for total quantity: {0}")]
    UnexpectedQuantityType(String),

    #[error("Malformed order document: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Console I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<mongodb::bson::de::Error> for AppError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
