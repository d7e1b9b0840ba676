//! Measurement log parsing.
//!
//! Each line of a log holds one sensor reading followed by the ground truth
//! at the same instant, whitespace-separated:
//!
//! ```text
//! L  x  y            timestamp  gt_x gt_y gt_vx gt_vy
//! R  rho phi drho    timestamp  gt_x gt_y gt_vx gt_vy
//! ```
//!
//! Timestamps are epoch microseconds. A malformed or truncated line is a
//! fatal parse error — bad records never reach the estimation core.

use anyhow::{bail, Context, Result};
use fusion_core::types::{DataPoint, SensorReading};
use std::io::BufRead;
use std::path::Path;

/// A parsed measurement log: measurements and ground truths paired by
/// stream position.
#[derive(Clone, Debug, Default)]
pub struct ParsedLog {
    pub measurements: Vec<DataPoint>,
    pub ground_truths: Vec<DataPoint>,
}

/// Parse a measurement log from any buffered reader. Blank lines are
/// ignored; anything else must be a well-formed `L` or `R` record.
pub fn parse_log<R: BufRead>(reader: R) -> Result<ParsedLog> {
    let mut log = ParsedLog::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading log line {}", idx + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let (measurement, truth) =
            parse_line(&line).with_context(|| format!("log line {}: {line:?}", idx + 1))?;
        log.measurements.push(measurement);
        log.ground_truths.push(truth);
    }

    Ok(log)
}

/// Parse a measurement log file.
pub fn parse_file(path: &Path) -> Result<ParsedLog> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening measurement log {}", path.display()))?;
    parse_log(std::io::BufReader::new(file))
}

fn parse_line(line: &str) -> Result<(DataPoint, DataPoint)> {
    let mut fields = line.split_whitespace();
    let tag = fields.next().context("empty record")?;

    match tag {
        "L" => {
            let x = next_f64(&mut fields, "x")?;
            let y = next_f64(&mut fields, "y")?;
            let timestamp = next_u64(&mut fields, "timestamp")?;
            let truth = parse_truth(&mut fields, timestamp)?;
            Ok((
                DataPoint::new(timestamp, SensorReading::Lidar { x, y }),
                truth,
            ))
        }
        "R" => {
            let rho = next_f64(&mut fields, "rho")?;
            let phi = next_f64(&mut fields, "phi")?;
            let drho = next_f64(&mut fields, "drho")?;
            let timestamp = next_u64(&mut fields, "timestamp")?;
            let truth = parse_truth(&mut fields, timestamp)?;
            Ok((
                DataPoint::new(timestamp, SensorReading::Radar { rho, phi, drho }),
                truth,
            ))
        }
        other => bail!("unknown sensor tag {other:?} (expected L or R)"),
    }
}

fn parse_truth<'a, I: Iterator<Item = &'a str>>(fields: &mut I, timestamp: u64) -> Result<DataPoint> {
    let x = next_f64(fields, "gt_x")?;
    let y = next_f64(fields, "gt_y")?;
    let vx = next_f64(fields, "gt_vx")?;
    let vy = next_f64(fields, "gt_vy")?;
    Ok(DataPoint::new(
        timestamp,
        SensorReading::State { x, y, vx, vy },
    ))
}

fn next_f64<'a, I: Iterator<Item = &'a str>>(fields: &mut I, name: &str) -> Result<f64> {
    let raw = fields
        .next()
        .with_context(|| format!("missing field {name}"))?;
    raw.parse()
        .with_context(|| format!("field {name}: invalid float {raw:?}"))
}

fn next_u64<'a, I: Iterator<Item = &'a str>>(fields: &mut I, name: &str) -> Result<u64> {
    let raw = fields
        .next()
        .with_context(|| format!("missing field {name}"))?;
    raw.parse()
        .with_context(|| format!("field {name}: invalid integer {raw:?}"))
}
