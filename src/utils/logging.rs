// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";
/// Filter used with `--debug` when `RUST_LOG` is unset: engine internals at
/// debug, dependencies stay at info.
const DEBUG_FILTER: &str = "info,myneta_extractor=debug";

/// Installs the global `tracing` subscriber. `RUST_LOG` always wins over the
/// built-in defaults.
pub fn setup_logging(debug: bool) {
    let fallback = if debug { DEBUG_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    fmt().with_env_filter(filter).with_target(false).init();

    tracing::debug!("Logging setup complete (fallback filter: {}).", fallback);
}
