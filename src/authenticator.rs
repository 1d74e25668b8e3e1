//! Login/registration of the local installation.
//!
//! One authentication sequence runs at a time; every concurrent caller
//! joins it and sees the same user or the same error.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::AuthRetryPolicy;
use crate::dispatcher::{ApiCall, Dispatcher};
use crate::error::{ApiError, ApiResult};
use crate::flight::FlightCell;
use crate::models::User;
use crate::status::StatusProvider;

/// What one authentication attempt needs. Cloned into the shared future so
/// the future never owns the cell it is stored in.
#[derive(Clone)]
struct Steps {
    dispatcher: Dispatcher,
    status: Arc<dyn StatusProvider>,
    language: String,
}

#[derive(Clone)]
pub struct Authenticator {
    steps: Steps,
    retry: AuthRetryPolicy,
    pending: Arc<FlightCell<User>>,
}

impl Authenticator {
    pub fn new(
        dispatcher: Dispatcher,
        status: Arc<dyn StatusProvider>,
        language: impl Into<String>,
        retry: AuthRetryPolicy,
    ) -> Self {
        Authenticator {
            steps: Steps {
                dispatcher,
                status,
                language: language.into(),
            },
            retry,
            pending: Arc::new(FlightCell::new()),
        }
    }

    /// Authenticate this installation and return the current user.
    ///
    /// While the API is disabled this resolves immediately to
    /// [`User::placeholder`] without touching the network.
    pub async fn authenticate(&self) -> ApiResult<User> {
        if !self.steps.dispatcher.is_enabled() {
            debug!("internal API disabled, using placeholder user");
            return Ok(User::placeholder());
        }

        let start = {
            let steps = self.steps.clone();
            move || async move { steps.run().await }
        };
        let pending = match self.retry {
            AuthRetryPolicy::Once => self.pending.get_or_start(start),
            AuthRetryPolicy::AfterFailure => self.pending.get_or_start_unless_failed(start),
        };
        pending.await
    }

    /// `user/me` with the current token.
    pub async fn current_user(&self) -> ApiResult<User> {
        self.steps.current_user().await
    }
}

impl Steps {
    async fn current_user(&self) -> ApiResult<User> {
        let data = self.dispatcher.call(ApiCall::new("user", "me")).await?;
        Ok(User::from_payload(data))
    }

    async fn run(&self) -> ApiResult<User> {
        if !self.has_working_token().await? {
            self.register().await?;
        }
        let user = self.current_user().await?;
        info!(user_id = ?user.id, "authenticated with internal API");
        Ok(user)
    }

    async fn has_working_token(&self) -> ApiResult<bool> {
        let token = match self.dispatcher.tokens().get_token().await? {
            Some(token) => token,
            None => {
                debug!("no stored auth token");
                return Ok(false);
            }
        };
        if !token.is_plausible() {
            debug!("stored auth token has an outdated format");
            return Ok(false);
        }

        // Any successful envelope means the token is live; the payload is
        // not inspected here.
        match self.dispatcher.call(ApiCall::new("user", "me")).await {
            Ok(_) => Ok(true),
            Err(e) => {
                debug!(error = %e, "stored auth token rejected");
                Ok(false)
            }
        }
    }

    async fn register(&self) -> ApiResult<()> {
        let status = self.status.status().await?;
        info!("registering installation with internal API");

        let call = ApiCall::new("user", "new")
            .param("auth_token", "")
            .param("language", self.language.as_str())
            .param("app_id", status.installation_id)
            .method("post");
        let data = self.dispatcher.call(call).await?;

        let token = data
            .get("auth_token")
            .and_then(Value::as_str)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                warn!("registration response carried no auth token");
                ApiError::MissingToken
            })?;
        self.dispatcher.tokens().set_token(Some(token));
        Ok(())
    }
}
