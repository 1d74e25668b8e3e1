//! Error model shared by every component of the client.
//!
//! Errors are `Clone` because single-flight futures hand the same outcome to
//! every waiter.

use serde_json::Value;

pub type ApiResult<T> = Result<T, ApiError>;

/// Message returned for any transport or decoding failure. The underlying
/// detail is logged but never handed to the caller.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Something went wrong making an internal API call.";

#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The API is globally disabled and the call is not allow-listed.
    #[error("LBRY internal API is disabled")]
    Disabled,

    /// Only `get` and `post` are supported.
    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    /// The server answered with `success: false`.
    #[error("{message}")]
    Application {
        message: String,
        data: Option<Value>,
    },

    #[error("{}", TRANSPORT_FAILURE_MESSAGE)]
    Transport,

    /// A registration response did not carry a new auth token.
    #[error("auth_token is missing from response")]
    MissingToken,

    /// The host side of the token channel went away.
    #[error("token host unavailable: {0}")]
    Host(String),

    /// The local status provider could not report the installation.
    #[error("daemon status unavailable: {0}")]
    Status(String),
}

impl ApiError {
    pub fn application(message: impl Into<String>, data: Option<Value>) -> Self {
        ApiError::Application {
            message: message.into(),
            data,
        }
    }
}
