//! Client-side access layer for the LBRY internal API, shared between the
//! binary and tests.

pub mod authenticator;
pub mod cli;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod exchange_rates;
pub mod flight;
pub mod host;
pub mod models;
pub mod status;
pub mod token_store;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod testing;

pub use client::Lbryio;
pub use dispatcher::ApiCall;
pub use error::{ApiError, ApiResult};
