//! # Runtime Configuration Module
//!
//! Environment-driven tuning of the `may` coroutine runtime.
//!
//! ## Environment Variables
//!
//! ### `PKGMETA_STACK_SIZE`
//!
//! Stack size for connection and handler coroutines. Accepts decimal (`262144`)
//! or hexadecimal (`0x40000`). Default: `0x40000` (256 KB).
//!
//! Handlers call into SQLite, whose statement preparation needs noticeably more
//! stack than a plain JSON handler. Values below 64 KB are known to overflow.
//!
//! ```rust
//! use pkgmeta::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! assert!(config.stack_size > 0);
//! ```

use std::env;

/// Stack size used when `PKGMETA_STACK_SIZE` is unset or unparseable.
pub const DEFAULT_STACK_SIZE: usize = 0x40000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let stack_size = env::var("PKGMETA_STACK_SIZE")
            .ok()
            .and_then(|val| parse_size(&val))
            .unwrap_or(DEFAULT_STACK_SIZE);
        RuntimeConfig { stack_size }
    }

    /// Apply to the global `may` configuration (connection coroutines).
    pub fn apply(&self) {
        may::config().set_stack_size(self.stack_size);
    }
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
    .filter(|size| *size > 0)
}
