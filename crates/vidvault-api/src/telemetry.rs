//! Tracing initialization.

use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Default log filter when `RUST_LOG` is unset. Targets are module paths,
/// so the workspace crates appear with underscores, not hyphens.
const DEFAULT_FILTER: &str = "vidvault_api=debug,vidvault_core=debug,vidvault_db=debug,\
                              vidvault_storage=debug,vidvault_processing=debug,tower_http=debug";

/// Initialize the tracing subscriber. Console gets a compact format; the
/// filter is overridable through `RUST_LOG`.
pub fn init_telemetry() {
    let console_fmt = tracing_subscriber::fmt::layer()
        .event_format(Format::default().compact().with_target(false));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(console_fmt)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses_and_targets_real_modules() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        for directive in DEFAULT_FILTER.split(',') {
            let target = directive.trim().split('=').next().unwrap();
            assert!(
                !target.contains('-'),
                "tracing targets use underscores: {target}"
            );
        }
        assert!(DEFAULT_FILTER.contains("vidvault_api"));
        assert!(DEFAULT_FILTER.contains("vidvault_processing"));
    }
}
