use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokens longer than this are never sent for validation; they predate the
/// current token format and are replaced by registering again.
pub const MAX_TOKEN_LEN: usize = 60;

/// Opaque credential identifying the local installation to the remote API.
///
/// Always trimmed and never empty; an absent token is `Option::None`.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Normalize a raw value coming from the host or the API.
    /// Whitespace-only or empty input yields no token.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(AuthToken(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token is short enough to be worth probing.
    pub fn is_plausible(&self) -> bool {
        self.0.len() <= MAX_TOKEN_LEN
    }
}

// Tokens are credentials; keep them out of debug logs.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthToken(<{} chars>)", self.0.len())
    }
}
