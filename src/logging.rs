//! Console logging for the CLI.
//!
//!   estate-store --debug ...               # debug events from the store
//!   RUST_LOG=estate_store=trace estate-store  # fine-grained control
//!
//! `RUST_LOG` wins over `--debug` when both are set. The library itself only
//! emits `tracing` events and never installs a subscriber.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

pub fn init_tracing(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
