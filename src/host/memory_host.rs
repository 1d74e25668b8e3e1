use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::base::HostChannel;
use crate::error::ApiResult;

/// Host that keeps the token in process memory. Used when no real host
/// process is attached, e.g. from the command line.
#[derive(Debug, Default)]
pub struct MemoryHost {
    token: Mutex<Option<String>>,
    requests: AtomicUsize,
}

impl MemoryHost {
    pub fn new(token: Option<String>) -> Self {
        MemoryHost {
            token: Mutex::new(token),
            requests: AtomicUsize::new(0),
        }
    }

    /// The last value persisted by the client.
    pub fn stored_token(&self) -> Option<String> {
        self.token.lock().expect("memory host mutex poisoned").clone()
    }

    /// How many `get-auth-token` requests were received.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostChannel for MemoryHost {
    async fn request_token(&self) -> ApiResult<Option<String>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(self.stored_token())
    }

    fn persist_token(&self, token: Option<String>) {
        *self.token.lock().expect("memory host mutex poisoned") = token;
    }
}
