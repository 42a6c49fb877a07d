//! Logging setup shared by the daemon and the CLI.
//!
//! Under systemd (`JOURNAL_STREAM` set) events go to the journal with
//! structured fields intact. Everywhere else they are printed to stdout
//! with a local timestamp. `RUST_LOG` overrides the default `info` level.

use time::macros::format_description;
use tracing_subscriber::{EnvFilter, fmt, fmt::time::LocalTime, prelude::*};

pub mod prelude {
    pub use ::tracing::{debug, error, info, trace, warn};
}

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber, preferring journald when run as a unit.
pub fn init_journald_or_stdout() {
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        match tracing_journald::layer() {
            Ok(journald) => {
                tracing_subscriber::registry()
                    .with(env_filter())
                    .with(journald)
                    .init();
                return;
            }
            Err(e) => eprintln!("journald unavailable ({e}), logging to stdout"),
        }
    }

    init_stdout();
}

/// Install a stdout-only subscriber.
pub fn init_stdout() {
    let timer = LocalTime::new(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
    ));

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_timer(timer))
        .init();
}
