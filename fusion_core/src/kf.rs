//! Kalman filter: the generic linear predict / update recursion.
//!
//! # Design choices
//! - All math is done in `f64` via fixed-size `nalgebra` types; dimension
//!   mismatches between state and measurement are compile errors.
//! - The filter owns its matrices. It is constructed already initialised
//!   (`new` takes x₀, P₀, F₀, Q₀), so predict/update can never run on an
//!   un-started filter.
//! - The update is generic over the measurement dimension `M`; the fusion
//!   engine instantiates it with M = 2 (lidar) and M = 3 (radar).
//!
//! ## Recursion
//! predict:  x ← F·x,  P ← F·P·Fᵀ + Q
//! update:   y = z − Hx,  S = H·P·Hᵀ + R,  K = P·Hᵀ·S⁻¹,
//!           x ← x + K·y,  P ← (I − K·H)·P

use crate::types::{StateCov, StateMat, StateVec};
use crate::{FusionError, Result};
use nalgebra::{SMatrix, SVector};

/// Discrete linear Kalman filter over a 4-dimensional state.
#[derive(Clone, Debug)]
pub struct KalmanFilter {
    x: StateVec,
    p: StateCov,
    f: StateMat,
    q: StateMat,
}

impl KalmanFilter {
    /// Start the filter from an initial state and the configured matrices.
    ///
    /// The matrices are copied in; the filter never aliases caller state.
    pub fn new(x0: StateVec, p0: StateCov, f0: StateMat, q0: StateMat) -> Self {
        Self {
            x: x0,
            p: p0,
            f: f0,
            q: q0,
        }
    }

    /// Current state estimate [px, py, vx, vy].
    pub fn x(&self) -> &StateVec {
        &self.x
    }

    /// Current state covariance.
    pub fn p(&self) -> &StateCov {
        &self.p
    }

    /// Replace the process-noise matrix (rebuilt per step from dt).
    pub fn set_q(&mut self, q: StateMat) {
        self.q = q;
    }

    /// Set the position/velocity coupling entries of F for an elapsed dt.
    pub fn update_f(&mut self, dt: f64) {
        self.f[(0, 2)] = dt;
        self.f[(1, 3)] = dt;
    }

    /// Propagate state and covariance through the transition model.
    pub fn predict(&mut self) {
        self.x = self.f * self.x;
        self.p = self.f * self.p * self.f.transpose() + self.q;
    }

    /// Correct the estimate with a measurement.
    ///
    /// `z` is the measurement, `hx` the predicted measurement h(x̂), `h` the
    /// (possibly linearised) observation matrix and `r` the measurement
    /// noise covariance. Fails if the innovation covariance S cannot be
    /// inverted — that step must not be silently skipped, the caller decides
    /// whether to abort the stream.
    pub fn update<const M: usize>(
        &mut self,
        z: &SVector<f64, M>,
        h: &SMatrix<f64, M, 4>,
        hx: &SVector<f64, M>,
        r: &SMatrix<f64, M, M>,
    ) -> Result<()> {
        let y = z - hx;
        let pht = self.p * h.transpose();
        let s = h * pht + r;
        let s_inv = s.try_inverse().ok_or(FusionError::SingularInnovation)?;
        let k = pht * s_inv;

        self.x += k * y;
        self.p = (StateCov::identity() - k * h) * self.p;
        Ok(())
    }
}
