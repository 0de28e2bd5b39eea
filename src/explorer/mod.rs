//! Blockchain explorer integration subsystem.
//!
//! # Data Flow
//! ```text
//! ExplorerConfig (base URL, failovers, timeout)
//!     → client.rs (HTTP calls with timeouts and failover)
//!     → types.rs (transaction decoding, error taxonomy)
//!     → payments::evaluator
//! ```
//!
//! # Constraints
//! - Every call has a deadline
//! - Any failure means "explorer unavailable" to callers, whatever the cause
//! - Malformed transaction entries are skipped, not propagated

pub mod client;
pub mod types;

pub use client::ExplorerClient;
pub use types::{ExplorerConfig, ExplorerError, ExplorerResult, Transaction, TxOutput, TxStatus};
