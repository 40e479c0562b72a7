//! Registry of open SSE connections, indexed by connection id and user id.

mod registry;
mod types;

pub use registry::ConnectionManager;
pub use types::{ConnectionHandle, ConnectionStats, SendResult};
