//! Fan curve daemon for AMD GPUs.
//!
//! Every poll interval the daemon asks `rocm-smi` for a device's edge,
//! junction and memory temperatures plus its current fan level, maps them to
//! a new fan level, and writes that level back through `rocm-smi` when it
//! differs enough from what the device reports.

pub mod config;
pub mod error;
pub mod scheduler;
pub mod sensor;
pub mod smi;
pub mod thermal;
pub mod tracing;
