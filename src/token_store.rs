//! Process-wide auth token, synchronized with the host process.

use std::sync::{Arc, Mutex, Weak};

use futures::future::FutureExt;
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::flight::SharedResult;
use crate::host::HostChannel;
use crate::models::AuthToken;

#[derive(Default)]
struct TokenState {
    current: Option<AuthToken>,
    /// The outstanding host request, if any. Later callers join it instead of
    /// sending a second request.
    pending: Option<SharedResult<Option<AuthToken>>>,
    /// Set when `set_token` runs while a host request is outstanding; the
    /// explicit value then wins over the reply.
    overridden: bool,
}

struct Inner {
    host: Arc<dyn HostChannel>,
    state: Mutex<TokenState>,
}

/// Owns the current auth token. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct TokenStore {
    inner: Arc<Inner>,
}

impl TokenStore {
    pub fn new(host: Arc<dyn HostChannel>) -> Self {
        TokenStore {
            inner: Arc::new(Inner {
                host,
                state: Mutex::new(TokenState::default()),
            }),
        }
    }

    /// The cached token, or the host's answer to a single outstanding
    /// request shared by every concurrent caller.
    pub async fn get_token(&self) -> ApiResult<Option<AuthToken>> {
        let pending = {
            let mut state = self.inner.state.lock().expect("token store mutex poisoned");
            if let Some(token) = &state.current {
                return Ok(Some(token.clone()));
            }
            match &state.pending {
                Some(pending) => pending.clone(),
                None => {
                    let request = request_from_host(
                        self.inner.host.clone(),
                        Arc::downgrade(&self.inner),
                    )
                    .boxed()
                    .shared();
                    state.pending = Some(request.clone());
                    state.overridden = false;
                    request
                }
            }
        };
        pending.await
    }

    /// Replace the current token. Whitespace is trimmed and an empty value
    /// clears it. The host is told asynchronously; nothing is awaited.
    pub fn set_token(&self, raw: Option<&str>) {
        let token = raw.and_then(AuthToken::parse);
        {
            let mut state = self.inner.state.lock().expect("token store mutex poisoned");
            state.current = token.clone();
            if state.pending.is_some() {
                state.overridden = true;
            }
        }
        info!(present = token.is_some(), "auth token updated");
        self.inner
            .host
            .persist_token(token.map(|t| t.as_str().to_string()));
    }

    /// The cached token without contacting the host.
    pub fn current_token(&self) -> Option<AuthToken> {
        self.inner
            .state
            .lock()
            .expect("token store mutex poisoned")
            .current
            .clone()
    }
}

async fn request_from_host(
    host: Arc<dyn HostChannel>,
    store: Weak<Inner>,
) -> ApiResult<Option<AuthToken>> {
    debug!("requesting auth token from host");
    let reply = host.request_token().await;

    let Some(store) = store.upgrade() else {
        return reply.map(|raw| raw.as_deref().and_then(AuthToken::parse));
    };
    let mut state = store.state.lock().expect("token store mutex poisoned");
    state.pending = None;

    let token = reply?.as_deref().and_then(AuthToken::parse);
    if state.overridden {
        debug!("auth token was set while the host request was outstanding");
        return Ok(state.current.clone());
    }
    state.current = token.clone();
    Ok(token)
}
