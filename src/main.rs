//! Bitcoin payment gate server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser                      PAYMENT GATE                         Explorer
//!  ─────────┐   ┌──────────┐   ┌──────────────┐   ┌───────────┐
//!  GET      ├──▶│   http   │──▶│   verifier   │──▶│  explorer │──────▶ Esplora API
//!  status / │   │ handlers │   │ fetch/eval/  │   │  client   │
//!  download │   └────┬─────┘   │  reconcile   │   └───────────┘
//!  ◀────────┤        │         └──────┬───────┘
//!           │        ▼                ▼
//!           │   ┌──────────┐   ┌──────────────┐
//!           │   │   gate   │   │ state store  │ (payment_state.json)
//!           │   └────┬─────┘   └──────────────┘
//!           │        ▼
//!           │   ┌──────────┐
//!           └───│  bundle  │ (tar.gz of the gated directory)
//!               └──────────┘
//! ```
//!
//! Usage: `payment-gate [config.toml]` (or set `GATE_CONFIG`).

use std::path::PathBuf;

use payment_gate::config::resolve_config;
use payment_gate::lifecycle::startup;
use payment_gate::observability::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = resolve_config(config_path.as_deref())?;

    init_logging(&config.observability);
    tracing::info!("payment-gate v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await
}
