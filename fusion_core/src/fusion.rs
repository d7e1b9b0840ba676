//! Fusion engine: feeds an ordered measurement stream through the filter.
//!
//! # Processing steps per measurement
//! 1. First record seen: initialise the filter from its normalized state
//! 2. Otherwise: dt from the previous timestamp, rebuild F and Q
//! 3. Predict
//! 4. Select the measurement model — constant H for lidar, Jacobian
//!    linearised at the predicted state for radar
//! 5. Update
//!
//! The engine is a strict step function over a time-ordered stream: each
//! call depends on the state left by the previous one. One engine tracks
//! one object; independent tracks get independent engines.

use crate::coords::{cartesian_to_polar, jacobian, time_difference};
use crate::kf::KalmanFilter;
use crate::types::{
    DataPoint, LidarCov, LidarObsMat, LidarVec, RadarCov, RadarVec, SensorReading, StateCov,
    StateMat, StateVec,
};
use crate::{FusionError, Result};
use tracing::debug;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Configuration for the fusion engine. Every matrix and scalar the engine
/// needs is an explicit field; the engine copies them into the filter at
/// initialisation and treats them as immutable afterwards.
#[derive(Clone, Debug)]
pub struct FusionConfig {
    /// Initial state covariance P₀
    pub initial_p: StateCov,
    /// Initial state transition matrix F₀ (dt entries rebuilt per step)
    pub initial_f: StateMat,
    /// Initial process noise Q₀ (rebuilt per step from dt)
    pub initial_q: StateMat,
    /// Lidar measurement noise covariance (2×2)
    pub lidar_r: LidarCov,
    /// Radar measurement noise covariance (3×3)
    pub radar_r: RadarCov,
    /// Constant lidar observation matrix (2×4, picks out position)
    pub lidar_h: LidarObsMat,
    /// White-noise acceleration variances (ax, ay) used to rebuild Q
    pub accel_noise: (f64, f64),
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            // Position known to measurement accuracy, velocity unknown.
            initial_p: StateCov::from_diagonal(&StateVec::new(1.0, 1.0, 1000.0, 1000.0)),
            initial_f: StateMat::identity(),
            initial_q: StateMat::zeros(),
            // Tuned from offline variance analysis of the sample logs.
            lidar_r: LidarCov::from_diagonal(&LidarVec::new(0.0225, 0.0225)),
            radar_r: RadarCov::from_diagonal(&RadarVec::new(0.09, 0.0009, 0.09)),
            lidar_h: LidarObsMat::new(1., 0., 0., 0., 0., 1., 0., 0.),
            accel_noise: (5.0, 5.0),
        }
    }
}

/// Discrete white-noise-acceleration process noise for an elapsed dt,
/// block-structured per axis with dt⁴/4, dt³/2 and dt² terms.
fn process_noise(dt: f64, ax: f64, ay: f64) -> StateMat {
    let dt2 = dt * dt;
    let dt3 = dt2 * dt;
    let dt4 = dt3 * dt;
    StateMat::new(
        dt4 * ax / 4.0,
        0.0,
        dt3 * ax / 2.0,
        0.0,
        0.0,
        dt4 * ay / 4.0,
        0.0,
        dt3 * ay / 2.0,
        dt3 * ax / 2.0,
        0.0,
        dt2 * ax,
        0.0,
        0.0,
        dt3 * ay / 2.0,
        0.0,
        dt2 * ay,
    )
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Extended Kalman filter fusion engine for one track.
///
/// Uninitialised until the first record arrives; the transition is one-way.
/// Holding the filter in an `Option` makes predict/update on an un-started
/// filter unrepresentable rather than a runtime error.
#[derive(Clone, Debug)]
pub struct FusionEkf {
    config: FusionConfig,
    last_timestamp: u64,
    filter: Option<KalmanFilter>,
}

impl FusionEkf {
    pub fn new(config: FusionConfig) -> Self {
        Self {
            config,
            last_timestamp: 0,
            filter: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.filter.is_some()
    }

    /// Process one measurement in stream order.
    ///
    /// The first record initialises the filter from its normalized state
    /// (zero velocity for lidar, polar-converted for radar); every later
    /// record runs a predict/update cycle. Records older than the last
    /// processed timestamp are rejected; equal timestamps are allowed and
    /// yield a no-op predict (dt = 0 ⇒ Q = 0).
    pub fn process(&mut self, data: &DataPoint) -> Result<()> {
        let Some(kf) = self.filter.as_mut() else {
            self.start(data);
            return Ok(());
        };

        if data.timestamp < self.last_timestamp {
            return Err(FusionError::NonMonotonicTimestamp {
                last_us: self.last_timestamp,
                got_us: data.timestamp,
            });
        }

        // Ground-truth records carry no measurement to fuse.
        if let SensorReading::State { .. } = data.reading {
            debug!(timestamp = data.timestamp, "skipping state-kind record");
            return Ok(());
        }

        let dt = time_difference(self.last_timestamp, data.timestamp);
        self.last_timestamp = data.timestamp;

        let (ax, ay) = self.config.accel_noise;
        kf.update_f(dt);
        kf.set_q(process_noise(dt, ax, ay));
        kf.predict();

        match data.reading {
            SensorReading::Lidar { x, y } => {
                let h = self.config.lidar_h;
                let hx = h * kf.x();
                let z = LidarVec::new(x, y);
                kf.update(&z, &h, &hx, &self.config.lidar_r)
            }
            SensorReading::Radar { rho, phi, drho } => {
                let x = *kf.x();
                let (p_rho, p_phi, p_drho) = cartesian_to_polar(x[0], x[1], x[2], x[3]);
                let h = jacobian(x[0], x[1], x[2], x[3]);
                let hx = RadarVec::new(p_rho, p_phi, p_drho);
                let z = RadarVec::new(rho, phi, drho);
                kf.update(&z, &h, &hx, &self.config.radar_r)
            }
            SensorReading::State { .. } => unreachable!("handled above"),
        }
    }

    fn start(&mut self, data: &DataPoint) {
        self.last_timestamp = data.timestamp;
        self.filter = Some(KalmanFilter::new(
            *data.state(),
            self.config.initial_p,
            self.config.initial_f,
            self.config.initial_q,
        ));
        debug!(timestamp = data.timestamp, kind = ?data.kind(), "filter initialised");
    }

    /// Current state estimate, if at least one record has been processed.
    pub fn get(&self) -> Option<&StateVec> {
        self.filter.as_ref().map(|kf| kf.x())
    }

    /// Current state covariance, if initialised.
    pub fn covariance(&self) -> Option<&StateCov> {
        self.filter.as_ref().map(|kf| kf.p())
    }

    /// Wrap the current estimate in a `State`-kind data point, timestamped
    /// with the last processed measurement.
    pub fn estimate(&self) -> Option<DataPoint> {
        self.get()
            .map(|x| DataPoint::from_state(self.last_timestamp, *x))
    }
}
