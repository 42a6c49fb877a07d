//! Fan control daemon.
//!
//! Runs the control loop against device 0 until SIGINT or SIGTERM, then
//! lets any in-flight cycle finish before exiting.

use std::sync::Arc;

use anyhow::Result;
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;

use rocm_fan::config::DaemonConfig;
use rocm_fan::scheduler::{FanJob, JobRunner};
use rocm_fan::smi::RocmSmi;
use rocm_fan::thermal::{FanCurve, SpeedController};
use rocm_fan::tracing::{self, prelude::*};

#[tokio::main]
async fn main() -> Result<()> {
    tracing::init_journald_or_stdout();

    let config = DaemonConfig::default();
    let curve = FanCurve::default();
    info!(
        program = %config.program,
        device = %config.device_id,
        min_speed = curve.min_speed,
        max_speed = curve.max_speed,
        "Starting rocm-fand"
    );

    let tool = Arc::new(RocmSmi::new(config.program.clone()));
    let job = FanJob::new(tool, config.device_id.clone(), SpeedController::new(curve));
    let runner = JobRunner::new(job, config.poll_interval);

    let running = CancellationToken::new();
    let loop_handle = tokio::spawn(runner.run(running.clone()));

    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Received SIGINT"),
        _ = sigterm.recv() => info!("Received SIGTERM"),
    }

    running.cancel();
    loop_handle.await?;

    info!("Exiting");
    Ok(())
}
