use reqwest::StatusCode;
use thiserror::Error;

use crate::auth::TokenError;

#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("failed to get access token: {0}")]
    Token(#[from] TokenError),

    #[error("invalid Firestore URL: {0}")]
    InvalidUrl(String),

    #[error("failed to make request: {0}")]
    Request(#[source] reqwest::Error),

    #[error("firestore API returned error: {status}")]
    Status { status: StatusCode, message: Option<String> },

    #[error("failed to parse response: {0}")]
    Decode(#[source] reqwest::Error),
}
