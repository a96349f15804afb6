//! Tracing subscriber setup. Logs go to stderr so stdout stays clean for
//! command output.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogFormat;

/// Default filter when `RUST_LOG` is unset.
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "pts=debug,pts_lib=debug,tower_http=debug,info"
    } else {
        "pts=info,pts_lib=info,warn"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Installs the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(verbose: bool, format: LogFormat) {
    let builder = fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_target(true);

    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_enables_debug_for_crate() {
        assert!(default_directive(true).contains("pts_lib=debug"));
        assert!(default_directive(false).contains("pts_lib=info"));
    }

    #[test]
    fn init_twice_does_not_panic() {
        init(false, LogFormat::Text);
        init(true, LogFormat::Json);
    }
}
