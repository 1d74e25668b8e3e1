pub mod base;
pub mod channel_host;
pub mod memory_host;

pub use base::HostChannel;
pub use channel_host::{ChannelHost, HostMessage};
pub use memory_host::MemoryHost;
