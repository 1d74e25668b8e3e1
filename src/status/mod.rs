pub mod base;
pub mod daemon_provider;

pub use base::{DaemonStatus, StatusProvider};
pub use daemon_provider::DaemonStatusProvider;
