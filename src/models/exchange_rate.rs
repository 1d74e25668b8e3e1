use serde::{Deserialize, Serialize};

/// Exchange rates as reported by `lbc/exchange_rate`. Other fields of the
/// payload are dropped.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ExchangeRates {
    pub lbc_usd: f64,
    pub lbc_btc: f64,
    pub btc_usd: f64,
}
