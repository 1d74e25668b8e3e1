use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;

pub const ACCEPT_JSON: (&str, &str) = ("Accept", "application/json");
pub const CONTENT_TYPE_JSON: (&str, &str) = ("Content-Type", "application/json");
pub const CONTENT_TYPE_FORM: (&str, &str) = ("Content-Type", "application/x-www-form-urlencoded");

/// The two verbs the remote API understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl FromStr for HttpMethod {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("get") {
            Ok(HttpMethod::Get)
        } else if s.eq_ignore_ascii_case("post") {
            Ok(HttpMethod::Post)
        } else {
            Err(ApiError::InvalidMethod(s.to_string()))
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// A fully built request: URL already carries the query string for GET,
/// `body` carries the form payload for POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: Option<String>,
}

/// Anything that went wrong below the response envelope: connection errors,
/// unreadable bodies, invalid JSON. The detail is for logs only.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{detail}")]
pub struct TransportFailure {
    pub detail: String,
}

impl TransportFailure {
    pub fn new(detail: impl Into<String>) -> Self {
        TransportFailure {
            detail: detail.into(),
        }
    }
}

/// Performs a request and returns the parsed JSON body, whatever the HTTP
/// status. Interpreting the envelope is the dispatcher's job.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_get_and_post_parse() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("POST".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert!(matches!(
            "put".parse::<HttpMethod>(),
            Err(ApiError::InvalidMethod(m)) if m == "put"
        ));
    }
}
