// Shared infrastructure
pub mod config;
pub mod encoding;
pub mod error;
pub mod metrics;

// Domain
pub mod connection_manager;
pub mod push;

// Application layer
pub mod api;
pub mod server;
pub mod sse;

// Listener side of the event stream
pub mod client;

// Supporting modules
pub mod shutdown;
pub mod telemetry;
