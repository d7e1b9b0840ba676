//! Variance diagnostics: measurement-vs-truth differences per component.
//!
//! Used offline to tune the measurement noise covariances. Lidar records
//! contribute position differences only; radar records contribute the full
//! cartesian state plus the polar components, with the truth converted
//! through `cartesian_to_polar` for a like-for-like comparison.

use fusion_core::coords::cartesian_to_polar;
use fusion_core::types::{DataPoint, SensorReading};
use serde::Serialize;

/// Raw per-component difference samples.
#[derive(Clone, Debug, Default)]
pub struct Differences {
    pub px: Vec<f64>,
    pub py: Vec<f64>,
    pub vx: Vec<f64>,
    pub vy: Vec<f64>,
    pub rho: Vec<f64>,
    pub phi: Vec<f64>,
    pub drho: Vec<f64>,
}

impl Differences {
    /// Collect differences from paired measurement / truth streams.
    pub fn collect(measurements: &[DataPoint], truths: &[DataPoint]) -> Self {
        let mut diffs = Self::default();
        for (m, t) in measurements.iter().zip(truths) {
            diffs.push(m, t);
        }
        diffs
    }

    fn push(&mut self, measurement: &DataPoint, truth: &DataPoint) {
        let s = measurement.state();
        let t = truth.state();

        match measurement.reading {
            SensorReading::Lidar { .. } => {
                self.px.push(s[0] - t[0]);
                self.py.push(s[1] - t[1]);
            }
            SensorReading::Radar { rho, phi, drho } => {
                self.px.push(s[0] - t[0]);
                self.py.push(s[1] - t[1]);
                self.vx.push(s[2] - t[2]);
                self.vy.push(s[3] - t[3]);

                let (t_rho, t_phi, t_drho) = cartesian_to_polar(t[0], t[1], t[2], t[3]);
                self.rho.push(rho - t_rho);
                self.phi.push(phi - t_phi);
                self.drho.push(drho - t_drho);
            }
            SensorReading::State { .. } => {}
        }
    }

    /// Merge another set of samples (for combined multi-log statistics).
    pub fn extend(&mut self, other: &Differences) {
        self.px.extend_from_slice(&other.px);
        self.py.extend_from_slice(&other.py);
        self.vx.extend_from_slice(&other.vx);
        self.vy.extend_from_slice(&other.vy);
        self.rho.extend_from_slice(&other.rho);
        self.phi.extend_from_slice(&other.phi);
        self.drho.extend_from_slice(&other.drho);
    }

    /// Population variance of each component.
    pub fn variances(&self) -> VarianceSummary {
        VarianceSummary {
            px: variance(&self.px),
            py: variance(&self.py),
            vx: variance(&self.vx),
            vy: variance(&self.vy),
            rho: variance(&self.rho),
            phi: variance(&self.phi),
            drho: variance(&self.drho),
        }
    }
}

/// Per-component variances of measurement-vs-truth differences.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct VarianceSummary {
    pub px: f64,
    pub py: f64,
    pub vx: f64,
    pub vy: f64,
    pub rho: f64,
    pub phi: f64,
    pub drho: f64,
}

/// Population variance; zero for an empty sample.
pub fn variance(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let n = xs.len() as f64;
    let mean = xs.iter().sum::<f64>() / n;
    xs.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn truth(t: u64, x: f64, y: f64, vx: f64, vy: f64) -> DataPoint {
        DataPoint::new(t, SensorReading::State { x, y, vx, vy })
    }

    #[test]
    fn variance_of_constant_is_zero() {
        assert_eq!(variance(&[2.0, 2.0, 2.0]), 0.0);
        assert_eq!(variance(&[]), 0.0);
    }

    #[test]
    fn variance_matches_hand_computation() {
        // mean 2, squared deviations [1, 0, 1] ⇒ variance 2/3
        assert_abs_diff_eq!(variance(&[1.0, 2.0, 3.0]), 2.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn lidar_contributes_position_only() {
        let m = vec![DataPoint::new(0, SensorReading::Lidar { x: 1.5, y: 2.0 })];
        let t = vec![truth(0, 1.0, 2.0, 9.0, 9.0)];
        let diffs = Differences::collect(&m, &t);
        assert_eq!(diffs.px, vec![0.5]);
        assert!(diffs.vx.is_empty());
        assert!(diffs.rho.is_empty());
    }

    #[test]
    fn radar_contributes_cartesian_and_polar() {
        let m = vec![DataPoint::new(
            0,
            SensorReading::Radar {
                rho: 5.0,
                phi: 0.0,
                drho: 1.0,
            },
        )];
        // Truth exactly on the x axis: polar conversion is exact.
        let t = vec![truth(0, 5.0, 0.0, 1.0, 0.0)];
        let diffs = Differences::collect(&m, &t);
        assert_eq!(diffs.px.len(), 1);
        assert_eq!(diffs.rho.len(), 1);
        assert_abs_diff_eq!(diffs.rho[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(diffs.drho[0], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn extend_merges_samples() {
        let mut a = Differences::default();
        a.px.push(1.0);
        let mut b = Differences::default();
        b.px.push(3.0);
        a.extend(&b);
        assert_eq!(a.px, vec![1.0, 3.0]);
        assert_abs_diff_eq!(a.variances().px, 1.0, epsilon = 1e-12);
    }
}
