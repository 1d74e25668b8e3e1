//! Time-bounded cache of LBC exchange rates.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::dispatcher::{ApiCall, Dispatcher};
use crate::error::ApiResult;
use crate::flight::FlightCell;
use crate::models::ExchangeRates;

struct Inner {
    dispatcher: Dispatcher,
    ttl: Duration,
    rates: FlightCell<ExchangeRates>,
}

#[derive(Clone)]
pub struct ExchangeRateCache {
    inner: Arc<Inner>,
}

impl ExchangeRateCache {
    pub fn new(dispatcher: Dispatcher, ttl: Duration) -> Self {
        ExchangeRateCache {
            inner: Arc::new(Inner {
                dispatcher,
                ttl,
                rates: FlightCell::new(),
            }),
        }
    }

    /// Current rates, fetched at most once per freshness window.
    ///
    /// The window is measured from when a fetch starts, so a burst of callers
    /// shares one request. A failed fetch is served to every caller until the
    /// window runs out rather than retried immediately.
    pub async fn get_exchange_rates(&self) -> ApiResult<ExchangeRates> {
        let fetch = self.inner.rates.get_or_start_fresh(self.inner.ttl, || {
            let dispatcher = self.inner.dispatcher.clone();
            async move {
                debug!("fetching exchange rates");
                let call = ApiCall::new("lbc", "exchange_rate").bypass_disabled();
                dispatcher.call_as::<ExchangeRates>(call).await
            }
        });
        fetch.await
    }
}
