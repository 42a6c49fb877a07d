//! Crate-wide error type.
//!
//! Only failures that abort a control cycle live here. Problems pulling a
//! value out of the tool's text are [`ExtractError`](crate::sensor::ExtractError)s
//! and never leave the sensor module.

use std::process::ExitStatus;

/// Errors raised while talking to the vendor tool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The tool could not be started or waited on.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran but exited unsuccessfully.
    #[error("{program} exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    /// The tool printed something that is not UTF-8.
    #[error("{program} produced non-UTF-8 output")]
    InvalidOutput { program: String },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
