//! The client context.
//!
//! Holds the state that would otherwise be process-global: the token, the
//! pending authentication and the exchange-rate snapshot. Construct one at
//! startup and hand clones to whoever needs the API.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::authenticator::Authenticator;
use crate::config::{stripe_publishable_key, ApiConfig};
use crate::dispatcher::{ApiCall, Dispatcher};
use crate::error::ApiResult;
use crate::exchange_rates::ExchangeRateCache;
use crate::host::HostChannel;
use crate::models::{AuthToken, ExchangeRates, User};
use crate::status::{DaemonStatusProvider, StatusProvider};
use crate::token_store::TokenStore;
use crate::transport::{HttpTransport, Transport};

#[derive(Clone)]
pub struct Lbryio {
    dispatcher: Dispatcher,
    authenticator: Authenticator,
    exchange_rates: ExchangeRateCache,
}

impl Lbryio {
    /// Wire up a client talking HTTP to the configured API and daemon.
    pub fn new(config: &ApiConfig, host: Arc<dyn HostChannel>) -> Self {
        Self::with_parts(
            config,
            host,
            Arc::new(HttpTransport::new()),
            Arc::new(DaemonStatusProvider::new(config.daemon_url.clone())),
        )
    }

    /// Same as [`Lbryio::new`] with explicit transport and status provider.
    pub fn with_parts(
        config: &ApiConfig,
        host: Arc<dyn HostChannel>,
        transport: Arc<dyn Transport>,
        status: Arc<dyn StatusProvider>,
    ) -> Self {
        info!(
            api_url = config.api_url.as_str(),
            enabled = config.enabled,
            "Creating internal API client"
        );
        let tokens = TokenStore::new(host);
        let dispatcher = Dispatcher::new(config.api_url.clone(), config.enabled, tokens, transport);
        let authenticator = Authenticator::new(
            dispatcher.clone(),
            status,
            config.language.clone(),
            config.auth_retry,
        );
        let exchange_rates = ExchangeRateCache::new(dispatcher.clone(), config.exchange_rate_ttl());

        Lbryio {
            dispatcher,
            authenticator,
            exchange_rates,
        }
    }

    pub async fn call(&self, call: ApiCall) -> ApiResult<Value> {
        self.dispatcher.call(call).await
    }

    pub async fn authenticate(&self) -> ApiResult<User> {
        self.authenticator.authenticate().await
    }

    pub async fn current_user(&self) -> ApiResult<User> {
        self.authenticator.current_user().await
    }

    pub async fn get_exchange_rates(&self) -> ApiResult<ExchangeRates> {
        self.exchange_rates.get_exchange_rates().await
    }

    pub async fn get_auth_token(&self) -> ApiResult<Option<AuthToken>> {
        self.dispatcher.tokens().get_token().await
    }

    pub fn set_auth_token(&self, token: Option<&str>) {
        self.dispatcher.tokens().set_token(token)
    }

    pub fn is_enabled(&self) -> bool {
        self.dispatcher.is_enabled()
    }

    pub fn set_enabled(&self, enabled: bool) {
        info!(enabled, "internal API enablement changed");
        self.dispatcher.set_enabled(enabled)
    }

    pub fn stripe_publishable_key(&self) -> &'static str {
        stripe_publishable_key(self.dispatcher.base_url())
    }
}
