//! Error types for the store client.
//!
//! # Design
//! A missing record is not an error: single-record operations return
//! `Option` and use `None` for a 404. Everything that is an error lands
//! here, with the raw status code and body kept for non-success responses.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    /// The store answered with a non-2xx status other than 404.
    #[error("request failed with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// No user carries the given `stripeCustomerId`.
    #[error("no user found for customer id {0}")]
    CustomerNotFound(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),
}

impl DbError {
    /// HTTP status carried by the error, if the store produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            DbError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
