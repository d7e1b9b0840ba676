//! `ekfusion` CLI: run measurement logs through the fusion EKF, score the
//! estimates against ground truth, and run variance diagnostics.

use anyhow::Result;
use clap::{Parser, Subcommand};
use fusion_core::metrics::Rmse;
use fusion_core::types::DataPoint;
use fusion_core::{FusionConfig, FusionEkf};
use measurement_io::parser::parse_file;
use measurement_io::variance::Differences;
use measurement_io::{report, ParsedLog};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ekfusion", about = "Lidar/radar EKF sensor fusion CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fuse a measurement log and report RMSE against ground truth.
    Run {
        /// Path to the measurement log
        input: PathBuf,
        /// Write summary metrics to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print the full per-record table, not just the RMSE summary
        #[arg(long)]
        print_records: bool,
    },
    /// Measurement-vs-truth variance analysis over one or more logs.
    Variance {
        /// Paths to measurement logs
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            output,
            print_records,
        } => run_log(&input, output.as_deref(), print_records),
        Commands::Variance { inputs } => run_variance(&inputs),
    }
}

fn run_log(
    input: &std::path::Path,
    output: Option<&std::path::Path>,
    print_records: bool,
) -> Result<()> {
    let log = parse_file(input)?;
    let estimates = fuse(&log)?;
    let rmse = Rmse::of_streams(&estimates, &log.ground_truths);

    let mut stdout = std::io::stdout().lock();
    if print_records {
        report::write_report(
            &mut stdout,
            &log.measurements,
            &estimates,
            &log.ground_truths,
            &rmse,
        )?;
    } else {
        report::write_rmse(&mut stdout, &rmse)?;
        println!("NUMBER OF DATA POINTS: {}", log.measurements.len());
    }

    if let Some(opath) = output {
        let [px, py, vx, vy] = rmse.values();
        let json = serde_json::json!({
            "input": input.display().to_string(),
            "records": log.measurements.len(),
            "rmse": { "px": px, "py": py, "vx": vx, "vy": vy },
        });
        std::fs::write(opath, serde_json::to_string_pretty(&json)?)?;
        println!("Metrics saved to {}", opath.display());
    }

    Ok(())
}

/// Feed every measurement through a fresh engine, collecting the
/// post-update estimate for each record.
fn fuse(log: &ParsedLog) -> Result<Vec<DataPoint>> {
    let mut ekf = FusionEkf::new(FusionConfig::default());
    let mut estimates = Vec::with_capacity(log.measurements.len());

    for dp in &log.measurements {
        ekf.process(dp)?;
        if let Some(est) = ekf.estimate() {
            estimates.push(est);
        }
    }

    Ok(estimates)
}

fn run_variance(inputs: &[PathBuf]) -> Result<()> {
    let mut combined = Differences::default();

    for input in inputs {
        let log = parse_file(input)?;
        let diffs = Differences::collect(&log.measurements, &log.ground_truths);
        println!("Variances from: {}", input.display());
        print_variances(&diffs);
        combined.extend(&diffs);
    }

    if inputs.len() > 1 {
        println!("Combined variances");
        print_variances(&combined);
    }

    Ok(())
}

fn print_variances(diffs: &Differences) {
    let v = diffs.variances();
    println!("x: {}", v.px);
    println!("y: {}", v.py);
    println!("vx: {}", v.vx);
    println!("vy: {}", v.vy);
    println!("rho: {}", v.rho);
    println!("phi: {}", v.phi);
    println!("drho: {}", v.drho);
    println!();
}
