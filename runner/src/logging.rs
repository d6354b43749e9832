//! Diagnostic tracing for the runner.
//!
//! Output goes to stderr so it never mixes with the Prisma CLI's stdout.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used with `--verbose` when `RUST_LOG` is unset.
const VERBOSE_FILTER: &str = "prisma_runner=debug,warn";
/// Keeps the schema rewrite notice visible by default.
const DEFAULT_FILTER: &str = "prisma_runner=info,warn";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence. Otherwise `verbose` selects debug output for
/// this crate, and the default shows this crate's info lines and warnings
/// from everything else.
///
/// # Example
/// ```bash
/// RUST_LOG=prisma_runner=trace prisma-runner -- migrate dev
/// ```
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback_filter(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

fn fallback_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        DEFAULT_FILTER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn default_filter_shows_crate_info() {
        let filter = EnvFilter::new(fallback_filter(false));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
        assert!(DEFAULT_FILTER.contains("prisma_runner=info"));
    }

    #[test]
    fn verbose_filter_shows_crate_debug() {
        let filter = EnvFilter::new(fallback_filter(true));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
