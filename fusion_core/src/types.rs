//! Fundamental types used across the entire workspace.

use crate::coords::polar_to_cartesian;
use nalgebra::{Matrix2, Matrix2x4, Matrix3, Matrix3x4, Matrix4, Vector2, Vector3, Vector4};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Scalar type: f64 throughout for numerical precision in the Kalman filter.
// ---------------------------------------------------------------------------

/// 4-DOF state vector: [px, py, vx, vy]
pub type StateVec = Vector4<f64>;

/// 4×4 state covariance matrix
pub type StateCov = Matrix4<f64>;

/// 4×4 state transition / process-noise matrix
pub type StateMat = Matrix4<f64>;

/// Lidar measurement vector: [x, y]
pub type LidarVec = Vector2<f64>;

/// Radar measurement vector: [rho, phi, drho]
pub type RadarVec = Vector3<f64>;

/// 2×2 lidar measurement noise covariance
pub type LidarCov = Matrix2<f64>;

/// 3×3 radar measurement noise covariance
pub type RadarCov = Matrix3<f64>;

/// 2×4 lidar observation matrix (constant, linear)
pub type LidarObsMat = Matrix2x4<f64>;

/// 3×4 radar observation Jacobian (linearised at the state estimate)
pub type RadarObsMat = Matrix3x4<f64>;

// ---------------------------------------------------------------------------
// Sensor readings
// ---------------------------------------------------------------------------

/// Which sensor (or stream) a [`DataPoint`] came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    /// Lidar: linear sensor, observes cartesian position only
    Lidar,
    /// Radar: nonlinear sensor, observes range / bearing / range-rate
    Radar,
    /// Ground truth or produced estimate: full cartesian state
    State,
}

/// The raw observation carried by a [`DataPoint`], in sensor-native units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SensorReading {
    /// Cartesian position (meters)
    Lidar { x: f64, y: f64 },
    /// Range (meters), bearing (radians), range-rate (m/s)
    Radar { rho: f64, phi: f64, drho: f64 },
    /// Full state [px, py, vx, vy] (meters, m/s)
    State { x: f64, y: f64, vx: f64, vy: f64 },
}

impl SensorReading {
    pub fn kind(&self) -> SensorKind {
        match self {
            SensorReading::Lidar { .. } => SensorKind::Lidar,
            SensorReading::Radar { .. } => SensorKind::Radar,
            SensorReading::State { .. } => SensorKind::State,
        }
    }

    /// Dimension of the raw observation vector.
    pub fn dim(&self) -> usize {
        match self {
            SensorReading::Lidar { .. } => 2,
            SensorReading::Radar { .. } => 3,
            SensorReading::State { .. } => 4,
        }
    }
}

// ---------------------------------------------------------------------------
// DataPoint — one timestamped observation, normalized to state space
// ---------------------------------------------------------------------------

/// A single timestamped observation, used uniformly for incoming
/// measurements, ground truth and produced estimates.
///
/// The normalized `state` is derived from the raw reading once at
/// construction and never mutated:
/// - lidar:  `[x, y, 0, 0]` (velocity unobserved)
/// - radar:  polar → cartesian conversion of `(rho, phi, drho)`
/// - state:  identity copy of the four supplied components
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Source epoch timestamp in microseconds
    pub timestamp: u64,
    /// Raw sensor observation
    pub reading: SensorReading,
    state: StateVec,
}

impl DataPoint {
    /// Normalize a raw reading into a data point.
    pub fn new(timestamp: u64, reading: SensorReading) -> Self {
        let state = match reading {
            SensorReading::Lidar { x, y } => StateVec::new(x, y, 0.0, 0.0),
            SensorReading::Radar { rho, phi, drho } => {
                let (x, y, vx, vy) = polar_to_cartesian(rho, phi, drho);
                StateVec::new(x, y, vx, vy)
            }
            SensorReading::State { x, y, vx, vy } => StateVec::new(x, y, vx, vy),
        };
        Self {
            timestamp,
            reading,
            state,
        }
    }

    /// Wrap an estimated state vector as a `State`-kind data point.
    pub fn from_state(timestamp: u64, state: StateVec) -> Self {
        Self {
            timestamp,
            reading: SensorReading::State {
                x: state[0],
                y: state[1],
                vx: state[2],
                vy: state[3],
            },
            state,
        }
    }

    pub fn kind(&self) -> SensorKind {
        self.reading.kind()
    }

    /// Normalized state-space view [px, py, vx, vy] of the raw reading.
    pub fn state(&self) -> &StateVec {
        &self.state
    }
}
