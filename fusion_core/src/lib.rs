//! `fusion_core` — Lidar/radar sensor-fusion state estimation.
//!
//! Estimates the 2D kinematic state [px, py, vx, vy] of a single moving
//! object by fusing asynchronous measurements from a lidar (cartesian
//! position) and a radar (range / bearing / range-rate) with an extended
//! Kalman filter.
//!
//! # Module layout
//! - [`types`]   — Fundamental types (sensor readings, data points, state aliases)
//! - [`coords`]  — Polar ↔ cartesian conversion, measurement Jacobian, time delta
//! - [`kf`]      — Kalman filter recursion (predict / update)
//! - [`fusion`]  — Fusion engine: per-measurement orchestration and model selection
//! - [`metrics`] — Per-component RMSE against ground truth

pub mod coords;
pub mod fusion;
pub mod kf;
pub mod metrics;
pub mod types;

pub use fusion::{FusionConfig, FusionEkf};
pub use kf::KalmanFilter;
pub use types::{DataPoint, SensorKind, SensorReading, StateCov, StateVec};

use std::fmt;

/// Errors surfaced by the estimation core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FusionError {
    /// Innovation covariance S was not invertible during a filter update.
    SingularInnovation,
    /// A measurement's timestamp precedes the previously processed one.
    NonMonotonicTimestamp {
        last_us: u64,
        got_us: u64,
    },
}

impl fmt::Display for FusionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FusionError::SingularInnovation => {
                write!(f, "innovation covariance S is singular")
            }
            FusionError::NonMonotonicTimestamp { last_us, got_us } => write!(
                f,
                "non-monotonic measurement timestamp: {got_us} µs after {last_us} µs"
            ),
        }
    }
}

impl std::error::Error for FusionError {}

pub type Result<T> = std::result::Result<T, FusionError>;
