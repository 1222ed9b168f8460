//! Nowcast Configuration Module
//!
//! Per-deployment configuration loaded from TOML, covering the data source,
//! trend windows, alert thresholds, statistics and polling cadence.
//!
//! ## Loading Order
//!
//! 1. `NOWCAST_CONFIG` environment variable (path to TOML file)
//! 2. `nowcast.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! config::init(NowcastConfig::load());
//! let period = config::get().statistics.moving_average_period;
//! ```

mod nowcast_config;
pub mod defaults;
pub mod validation;

pub use nowcast_config::*;

use std::sync::OnceLock;

/// Global configuration, initialized once at startup.
static NOWCAST_CONFIG: OnceLock<NowcastConfig> = OnceLock::new();

/// Initialize the global configuration. Later calls are ignored.
pub fn init(config: NowcastConfig) {
    if NOWCAST_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get the global configuration, falling back to built-in defaults when
/// `init()` was never called.
pub fn get() -> &'static NowcastConfig {
    NOWCAST_CONFIG.get_or_init(NowcastConfig::default)
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    NOWCAST_CONFIG.get().is_some()
}
