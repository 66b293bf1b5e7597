//! # Diagnostics
//!
//! The `vault` binary prints share tokens on stdout so they can be piped into
//! a file or a password manager. Anything else it has to say (progress,
//! warnings about bundles, recovery summaries) goes to stderr through
//! `tracing`, either as plain lines for a terminal or as JSON lines for an
//! audit trail.
//!
//! Verbosity comes from `RUST_LOG` when it is set and non-empty, and from
//! [`DEFAULT_FILTER`] otherwise.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directives used when `RUST_LOG` says nothing: both the binary and the
/// library at `info`, dependencies silent.
pub const DEFAULT_FILTER: &str = "vault=info,threshold_vault=info";

/// How diagnostics are rendered on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One readable line per event, no source locations.
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// `json` in any case selects [`LogFormat::Json`]. Anything else,
    /// including typos, falls back to [`LogFormat::Pretty`] so a bad value
    /// never stops a recovery.
    pub fn from_str_lossy(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Filter for the given `RUST_LOG` value. Blank or unparsable directives
/// fall back to [`DEFAULT_FILTER`].
fn filter_for(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .map(str::trim)
        .filter(|directives| !directives.is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the stderr subscriber.
///
/// A second call leaves the first subscriber in place.
pub fn init_logging(format: LogFormat) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = filter_for(rust_log.as_deref());
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(?format, "diagnostics on stderr");
    }
}
