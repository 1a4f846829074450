use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
    #[error("unsupported input type: {0}")]
    UnsupportedInputType(&'static str),
    /// Missing headers, malformed signature or a signature that does not match.
    /// Callers never learn which one.
    #[error("invalid signature")]
    InvalidSignature,
    #[error("failed to read request body: {0}")]
    BodyRead(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<hex::FromHexError> for Error {
    fn from(err: hex::FromHexError) -> Self {
        Error::InvalidEncoding(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidSignature
            | Error::InvalidEncoding(_)
            | Error::UnsupportedInputType(_) => StatusCode::UNAUTHORIZED,
            Error::InvalidPayload(_) | Error::BodyRead(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match &self {
            // No detail about why verification failed.
            Error::InvalidEncoding(_) | Error::UnsupportedInputType(_) => {
                Error::InvalidSignature.to_string()
            }
            _ => self.to_string(),
        };
        (status, message).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;
