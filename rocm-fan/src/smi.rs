//! Boundary to the vendor system management tool.
//!
//! The daemon only ever asks two things of the tool: "print temperature and
//! fan telemetry for this device" and "set this device's fan level". Both go
//! through [`SmiTool`] so the control loop can be driven by scripted tools in
//! tests. [`RocmSmi`] is the real implementation on top of `rocm-smi`.
//!
//! Commands run to completion; there is no timeout on the tool.

use async_trait::async_trait;
use std::process::Output;
use tokio::process::Command;

use crate::error::{Error, Result};
use crate::tracing::prelude::*;

/// Result of asking the tool to change the fan level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Tool exited successfully. `output` is its cleaned stdout.
    Applied { output: String },

    /// Tool ran but exited unsuccessfully.
    Rejected { code: Option<i32>, output: String },
}

/// Vendor tool operations the control loop depends on.
#[async_trait]
pub trait SmiTool: Send + Sync {
    /// Temperature and fan telemetry text for `device_id`.
    ///
    /// Fails when the tool cannot be run or exits unsuccessfully.
    async fn read_telemetry(&self, device_id: &str) -> Result<String>;

    /// Set the fan level of `device_id`.
    ///
    /// An unsuccessful exit is reported as [`ApplyOutcome::Rejected`]; only a
    /// failure to run the tool at all is an error.
    async fn set_fan_level(&self, device_id: &str, level: u8) -> Result<ApplyOutcome>;
}

/// `rocm-smi` invoked as a child process.
#[derive(Debug, Clone)]
pub struct RocmSmi {
    program: String,
}

impl RocmSmi {
    pub const PROGRAM: &'static str = "rocm-smi";

    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<Output> {
        trace!(program = %self.program, ?args, "Running tool");

        Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })
    }

    fn stdout(&self, output: &Output) -> Result<String> {
        String::from_utf8(output.stdout.clone()).map_err(|_| Error::InvalidOutput {
            program: self.program.clone(),
        })
    }
}

impl Default for RocmSmi {
    fn default() -> Self {
        Self::new(Self::PROGRAM)
    }
}

#[async_trait]
impl SmiTool for RocmSmi {
    async fn read_telemetry(&self, device_id: &str) -> Result<String> {
        let output = self.run(&["-d", device_id, "-t", "-f"]).await?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(clean_output(&self.stdout(&output)?, device_id))
    }

    async fn set_fan_level(&self, device_id: &str, level: u8) -> Result<ApplyOutcome> {
        let level = level.to_string();
        let output = self.run(&["-d", device_id, "--setfan", &level]).await?;
        let text = clean_output(&String::from_utf8_lossy(&output.stdout), device_id);

        if output.status.success() {
            Ok(ApplyOutcome::Applied { output: text })
        } else {
            Ok(ApplyOutcome::Rejected {
                code: output.status.code(),
                output: text,
            })
        }
    }
}

/// Strip `rocm-smi` decoration from its output.
///
/// Drops the `=====` banner lines and blank lines, and removes the
/// `GPU[<id>]<whitespace>: ` prefix from each remaining line, leaving one
/// `label: value` pair per line.
pub fn clean_output(text: &str, device_id: &str) -> String {
    let prefix = format!("GPU[{device_id}]");

    text.lines()
        .filter(|line| !line.trim().is_empty() && !line.trim_start().starts_with("===="))
        .map(|line| strip_device_prefix(line, &prefix))
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_device_prefix<'a>(line: &'a str, prefix: &str) -> &'a str {
    line.strip_prefix(prefix)
        .and_then(|rest| rest.trim_start().strip_prefix(':'))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .unwrap_or(line)
}
