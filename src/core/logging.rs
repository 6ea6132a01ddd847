//! Diagnostic logging using tracing
//!
//! User-facing progress goes to stdout via `println!`. This subscriber only
//! carries diagnostics (commands executed, exit codes) to stderr.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directive for a `-v` count, used when `RUST_LOG` is unset
pub fn default_directive(verbosity: u8) -> &'static str {
  match verbosity {
    0 => "warn",
    1 => "info",
    _ => "debug",
  }
}

/// Initialize the tracing subscriber
///
/// `RUST_LOG` takes precedence over `-v`. Calling this twice is harmless.
pub fn init(verbosity: u8) {
  let env_filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

  let _ = tracing_subscriber::registry()
    .with(env_filter)
    .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
    .try_init();
}
