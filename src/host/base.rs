use async_trait::async_trait;

use crate::error::ApiResult;

/// The process that owns token persistence.
///
/// Exactly two messages cross this boundary: a request expecting a single
/// reply carrying the stored token (possibly none), and a fire-and-forget
/// message asking the host to persist a new value.
#[async_trait]
pub trait HostChannel: Send + Sync {
    /// One round trip. Callers are responsible for not issuing a second
    /// request while one is outstanding.
    async fn request_token(&self) -> ApiResult<Option<String>>;

    /// Hand a new token (or `None` to clear it) to the host.
    fn persist_token(&self, token: Option<String>);
}
