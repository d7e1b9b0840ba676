//! Console report formatting: RMSE header plus one block per record with
//! the raw sensor values, the estimate and the ground truth.

use anyhow::Result;
use fusion_core::metrics::Rmse;
use fusion_core::types::{DataPoint, SensorReading};
use std::io::Write;

const RULE: &str = "-----------------------------------------------------------";

/// Write the RMSE summary line.
pub fn write_rmse<W: Write>(out: &mut W, rmse: &Rmse) -> Result<()> {
    let [px, py, vx, vy] = rmse.values();
    writeln!(out, "{RULE}")?;
    writeln!(
        out,
        "{:10} | {px:8.3} | {py:8.3} | {vx:8.3} | {vy:8.3} |",
        "RMSE:"
    )?;
    writeln!(out, "{RULE}")?;
    Ok(())
}

/// Write the full report: RMSE, record count, then one block per record.
pub fn write_report<W: Write>(
    out: &mut W,
    measurements: &[DataPoint],
    estimates: &[DataPoint],
    truths: &[DataPoint],
    rmse: &Rmse,
) -> Result<()> {
    write_rmse(out, rmse)?;
    writeln!(out, "NUMBER OF DATA POINTS: {}", measurements.len())?;
    writeln!(out, "{RULE}")?;

    for (i, ((m, e), t)) in measurements.iter().zip(estimates).zip(truths).enumerate() {
        writeln!(out, "# {} : {}", i + 1, m.timestamp)?;
        writeln!(out, "{RULE}")?;

        match m.reading {
            SensorReading::Lidar { x, y } => {
                writeln!(out, "{:15} | {x:8.3} | {y:8.3} |", "LIDAR:")?;
            }
            SensorReading::Radar { rho, phi, drho } => {
                writeln!(out, "{:15} | {rho:8.3} | {phi:8.3} | {drho:8.3} |", "RADAR:")?;
            }
            SensorReading::State { .. } => {}
        }

        let e = e.state();
        writeln!(
            out,
            "{:15} | {:8.3} | {:8.3} | {:8.3} | {:8.3} |",
            "PREDICTION:", e[0], e[1], e[2], e[3]
        )?;
        let t = t.state();
        writeln!(
            out,
            "{:15} | {:8.3} | {:8.3} | {:8.3} | {:8.3} |",
            "TRUTH:", t[0], t[1], t[2], t[3]
        )?;
        writeln!(out, "{RULE}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fusion_core::types::StateVec;

    #[test]
    fn report_lists_every_record() {
        let measurements = vec![
            DataPoint::new(100, SensorReading::Lidar { x: 1.0, y: 2.0 }),
            DataPoint::new(
                200,
                SensorReading::Radar {
                    rho: 3.0,
                    phi: 0.1,
                    drho: -1.0,
                },
            ),
        ];
        let estimates = vec![
            DataPoint::from_state(100, StateVec::new(1.0, 2.0, 0.0, 0.0)),
            DataPoint::from_state(200, StateVec::new(3.0, 0.3, -1.0, 0.0)),
        ];
        let truths = estimates.clone();
        let rmse = Rmse::of_streams(&estimates, &truths);

        let mut buf = Vec::new();
        write_report(&mut buf, &measurements, &estimates, &truths, &rmse).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("RMSE:"));
        assert!(text.contains("NUMBER OF DATA POINTS: 2"));
        assert!(text.contains("LIDAR:"));
        assert!(text.contains("RADAR:"));
        assert!(text.contains("# 2 : 200"));
    }

    #[test]
    fn rmse_line_formats_zero() {
        let mut buf = Vec::new();
        write_rmse(&mut buf, &Rmse::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("0.000"));
    }
}
