//! Bitcoin payment gate library.
//!
//! Releases a directory as a downloadable archive once a payment to a
//! watched address reaches one confirmation, and keeps it released when
//! the explorer later becomes unreachable.

pub mod bundle;
pub mod config;
pub mod explorer;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod payments;

pub use config::GateConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
