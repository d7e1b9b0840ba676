//! Estimation metrics: per-component RMSE against ground truth.

use crate::types::DataPoint;
use serde::{Deserialize, Serialize};

/// Accumulated squared errors for the four state components.
///
/// Estimates and ground truths are paired by stream position; both sides
/// are compared through their normalized state vectors.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Rmse {
    /// Number of (estimate, truth) pairs accumulated
    pub n: u64,
    /// Sum of squared errors, one slot per state component
    pub sum_sq: [f64; 4],
}

impl Rmse {
    /// Accumulate one estimate/truth pair.
    pub fn accumulate(&mut self, estimate: &DataPoint, truth: &DataPoint) {
        let e = estimate.state();
        let t = truth.state();
        for i in 0..4 {
            let d = e[i] - t[i];
            self.sum_sq[i] += d * d;
        }
        self.n += 1;
    }

    /// Root-mean-square error per component [px, py, vx, vy].
    /// Zero when nothing has been accumulated.
    pub fn values(&self) -> [f64; 4] {
        if self.n == 0 {
            return [0.0; 4];
        }
        let n = self.n as f64;
        self.sum_sq.map(|s| (s / n).sqrt())
    }

    /// RMSE over two paired record streams (shorter length wins).
    pub fn of_streams(estimates: &[DataPoint], truths: &[DataPoint]) -> Self {
        let mut rmse = Self::default();
        for (e, t) in estimates.iter().zip(truths) {
            rmse.accumulate(e, t);
        }
        rmse
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SensorReading;
    use approx::assert_abs_diff_eq;

    fn state(t: u64, x: f64, y: f64, vx: f64, vy: f64) -> DataPoint {
        DataPoint::new(t, SensorReading::State { x, y, vx, vy })
    }

    #[test]
    fn perfect_predictions_give_zero_rmse() {
        let truths: Vec<_> = (0..10)
            .map(|i| state(i, i as f64, 2.0 * i as f64, 1.0, 2.0))
            .collect();
        let rmse = Rmse::of_streams(&truths, &truths);
        assert_eq!(rmse.values(), [0.0; 4]);
    }

    #[test]
    fn constant_offset_gives_that_offset() {
        let truths = vec![state(0, 0.0, 0.0, 0.0, 0.0), state(1, 1.0, 1.0, 1.0, 1.0)];
        let estimates = vec![state(0, 3.0, 0.0, 0.0, 0.0), state(1, 4.0, 1.0, 1.0, 1.0)];
        let [px, py, vx, vy] = Rmse::of_streams(&estimates, &truths).values();
        assert_abs_diff_eq!(px, 3.0, epsilon = 1e-12);
        assert_eq!((py, vx, vy), (0.0, 0.0, 0.0));
    }

    #[test]
    fn empty_streams_are_zero() {
        assert_eq!(Rmse::default().values(), [0.0; 4]);
    }

    #[test]
    fn accumulate_uses_normalized_state() {
        // A lidar estimate compares through [x, y, 0, 0].
        let est = DataPoint::new(0, SensorReading::Lidar { x: 1.0, y: 1.0 });
        let truth = state(0, 1.0, 1.0, 5.0, 0.0);
        let mut rmse = Rmse::default();
        rmse.accumulate(&est, &truth);
        let v = rmse.values();
        assert_eq!(v[0], 0.0);
        assert_abs_diff_eq!(v[2], 5.0, epsilon = 1e-12);
    }
}
