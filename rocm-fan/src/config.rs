use std::time::Duration;

use crate::smi::RocmSmi;

/// Process-wide settings. There is no config file; these are the values
/// the daemon is built with.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Vendor tool executable, looked up on `PATH`.
    pub program: String,

    /// Device index passed to the tool's `-d` option.
    pub device_id: String,

    /// Time between control cycles.
    pub poll_interval: Duration,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            program: RocmSmi::PROGRAM.to_string(),
            device_id: "0".to_string(),
            poll_interval: Duration::from_millis(1000),
        }
    }
}
