//! Logger initialization.
//!
//! Centralizes `env_logger` setup behind the `log` facade; the rest of the
//! workspace only ever uses `log::` macros.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
///
/// `RUST_LOG` takes precedence; otherwise `default_filter` applies (standard
/// `env_logger` filter syntax, e.g. `"info"` or `"orrery_gl=debug"`).
/// Intended usage is early in `main`.
pub fn init_logging(default_filter: &str) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.parse_filters(default_filter);
        }
        builder.init();
        log::debug!("logging initialized");
    });
}
