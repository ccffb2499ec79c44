//! Tracing subscriber setup.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// ## Summary
/// Installs a global `fmt` subscriber. `RUST_LOG` wins over `level` when set.
///
/// ## Errors
/// Returns an error if the filter directive is invalid or a global
/// subscriber is already installed.
pub fn init_tracing(level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))?;

    tracing::debug!(level, "Tracing initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_directive() {
        if std::env::var_os("RUST_LOG").is_none() {
            assert!(init_tracing("vobject=loud").is_err());
        }
    }
}
