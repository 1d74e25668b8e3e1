pub mod base;
pub mod http_transport;

// Re-export the primary transport items so code outside can do
// "use crate::transport::{Transport, ApiRequest};"
pub use base::{ApiRequest, HttpMethod, Transport, TransportFailure};
pub use http_transport::HttpTransport;
