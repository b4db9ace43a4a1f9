//! Tracing setup for the crate.
//!
//! Thin wrapper over `tracing-subscriber` exposing the single process-wide
//! toggle the coordinator needs: logging is either enabled (honoring
//! `RUST_LOG`, defaulting to `info`) or fully off. The subscriber is
//! installed once behind a reloadable filter, so a later initialization
//! with a different toggle swaps the filter instead of being ignored.

use std::sync::OnceLock;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

static FILTER: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

fn filter_for(enabled: bool) -> EnvFilter {
    if enabled {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    } else {
        EnvFilter::new("off")
    }
}

/// Install the global subscriber, or retarget its filter if it is already
/// installed. Every call applies the latest `enabled` value.
pub fn init(enabled: bool) {
    if let Some(handle) = FILTER.get() {
        let _ = handle.reload(filter_for(enabled));
        return;
    }

    let (filter, handle) = reload::Layer::new(filter_for(enabled));
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init()
        .is_ok();
    if installed {
        let _ = FILTER.set(handle);
    }
}
