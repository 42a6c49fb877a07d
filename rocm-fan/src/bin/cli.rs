//! Command-line interface for rocm-fan.
//!
//! One-shot diagnostics against the same device and fan curve the daemon
//! uses. Useful for checking what the daemon would do without running it.

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result, bail};

use rocm_fan::config::DaemonConfig;
use rocm_fan::scheduler::{CycleOutcome, FanJob};
use rocm_fan::smi::{ApplyOutcome, RocmSmi, SmiTool};
use rocm_fan::thermal::{FanCurve, SpeedController, SpeedDecision};

fn usage() {
    eprintln!("Usage: rocm-fan-cli <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  status         Show sensor readings and the decision the daemon would take");
    eprintln!("  set <level>    Set the fan level once (clamped to the fan curve)");
    eprintln!("  cycle          Run one full control cycle");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ROCM_SMI    Path to the rocm-smi executable (default: rocm-smi)");
}

#[tokio::main]
async fn main() -> Result<()> {
    rocm_fan::tracing::init_stdout();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        usage();
        std::process::exit(1);
    }

    let command = &args[1];

    match command.as_str() {
        "status" => cmd_status().await?,
        "set" => cmd_set(args.get(2).map(String::as_str)).await?,
        "cycle" => cmd_cycle().await?,
        _ => {
            eprintln!("Unknown command: {}", command);
            eprintln!("Run without arguments to see usage.");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// The daemon's tool, honoring ROCM_SMI if set.
fn make_tool(config: &DaemonConfig) -> RocmSmi {
    RocmSmi::new(env::var("ROCM_SMI").unwrap_or_else(|_| config.program.clone()))
}

/// Build the job the daemon would run.
fn make_job() -> FanJob {
    let config = DaemonConfig::default();
    FanJob::new(
        Arc::new(make_tool(&config)),
        config.device_id,
        SpeedController::default(),
    )
}

/// Print the current snapshot and the decision, without writing anything.
async fn cmd_status() -> Result<()> {
    let job = make_job();
    let snapshot = job.reader().read().await?;
    let evaluation = job.controller().evaluate(&snapshot);

    println!("Device:    {}", job.reader().device_id());
    println!("Edge:      {}", snapshot.edge);
    println!("Junction:  {}", snapshot.junction);
    println!("Memory:    {}", snapshot.memory);
    println!("Fan level: {}", snapshot.fan_level);
    println!("Regime:    {:?}", evaluation.regime);

    if let Some(ramp) = evaluation.ramp {
        println!(
            "Ramp:      {}°C, diff {}, ratio {:.3}",
            ramp.temperature_c, ramp.diff_c, ramp.ratio
        );
    }

    match evaluation.decision {
        SpeedDecision::Apply(level) => println!("Decision:  set fan level to {}", level),
        SpeedDecision::NoChange => println!(
            "Decision:  no change (target {} within threshold)",
            evaluation.candidate
        ),
    }

    Ok(())
}

/// Write a single fan level.
async fn cmd_set(level: Option<&str>) -> Result<()> {
    let Some(level) = level else {
        bail!("set requires a fan level");
    };
    let requested: u8 = level
        .parse()
        .with_context(|| format!("invalid fan level {level:?} (expected 0-255)"))?;

    let config = DaemonConfig::default();
    let curve = FanCurve::default();
    let clamped = requested.clamp(curve.min_speed, curve.max_speed);
    if clamped != requested {
        println!("Clamping {} to {}", requested, clamped);
    }

    match make_tool(&config).set_fan_level(&config.device_id, clamped).await? {
        ApplyOutcome::Applied { output } => {
            println!("Set fan level to {}", clamped);
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        ApplyOutcome::Rejected { code, output } => {
            bail!("failed to set fan level (exit {:?}): {}", code, output);
        }
    }

    Ok(())
}

/// Run one read-decide-apply cycle, exactly as the daemon would.
async fn cmd_cycle() -> Result<()> {
    match make_job().run_cycle().await? {
        CycleOutcome::Unchanged { fan_level } => println!("Unchanged at {}", fan_level),
        CycleOutcome::Applied { level } => println!("Set fan level to {}", level),
        CycleOutcome::ApplyFailed { level, code } => {
            bail!("failed to set fan level {} (exit {:?})", level, code)
        }
    }

    Ok(())
}
