//! Payment verification core.
//!
//! # Data Flow
//! ```text
//! explorer transactions
//!     → evaluator.rs (select transaction, count confirmations)
//!     → reconcile.rs (fold in persisted unlock)
//!     → store.rs (persist new unlock)
//!     → gate.rs (permit or deny the bundle)
//! ```
//!
//! verifier.rs runs one cycle; monitor.rs repeats it in the background.

pub mod evaluator;
pub mod gate;
pub mod monitor;
pub mod reconcile;
pub mod store;
pub mod types;
pub mod verifier;

pub use gate::GateDecision;
pub use reconcile::{reconcile, FetchOutcome, Reconciliation};
pub use store::{JsonFileStore, MemoryStore, PaymentStateStore, StorageError};
pub use types::{
    AuthoritativeStatus, ConfirmationEvaluation, PaymentState, StatusSource,
    REQUIRED_CONFIRMATIONS,
};
pub use verifier::PaymentVerifier;
