//! Logging initialization.
//!
//! The engine itself only emits `tracing` events; hosts that want output on
//! stdout can call `init_logging` once at startup. Honors `RUST_LOG`.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

pub fn init_logging(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_initialization_is_rejected() {
        assert!(init_logging("info").is_ok());
        assert!(init_logging("info").is_err());
    }
}
