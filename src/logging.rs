// SPDX-License-Identifier: GPL-3.0-only

//! Tracing subscriber setup for embedding shells and demos

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber.
///
/// `RUST_LOG` controls the level (e.g. `RUST_LOG=promo_studio=debug`);
/// without it only warnings are shown. Calling this again, or after the host
/// installed its own subscriber, does nothing.
pub fn init() {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(true)
        .with_level(true)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(version = crate::constants::app_version(), "Logging initialized");
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_init_twice_is_harmless() {
        super::init();
        super::init();
    }
}
