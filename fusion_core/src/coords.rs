//! Coordinate math: polar ↔ cartesian conversion, the radar measurement
//! Jacobian, and timestamp deltas.
//!
//! # Conventions
//! - `phi` is the bearing in radians measured from the x axis (`atan2(y, x)`)
//! - `drho` is the range-rate: the velocity projected onto the line of sight
//!
//! Degenerate geometry (target essentially at the sensor origin) is
//! recoverable: the conversion and the Jacobian return all-zero output and
//! log a warning instead of dividing by zero.

use crate::types::RadarObsMat;
use tracing::warn;

/// Minimum squared distance (and range) below which the polar conversion
/// and the Jacobian are considered degenerate.
pub const DEGENERATE_THRESH: f64 = 1e-4;

/// Convert cartesian position/velocity to polar `(rho, phi, drho)`.
///
/// Returns `(0, 0, 0)` when `rho` falls below [`DEGENERATE_THRESH`].
pub fn cartesian_to_polar(px: f64, py: f64, vx: f64, vy: f64) -> (f64, f64, f64) {
    let rho = (px * px + py * py).sqrt();
    if rho < DEGENERATE_THRESH {
        warn!(rho, "degenerate polar conversion: range below threshold");
        return (0.0, 0.0, 0.0);
    }
    let phi = py.atan2(px);
    let drho = (px * vx + py * vy) / rho;
    (rho, phi, drho)
}

/// Convert polar `(rho, phi, drho)` to cartesian `(x, y, vx, vy)`.
///
/// Always well-defined; the velocity is the range-rate projected onto the
/// bearing direction (the tangential component is unobservable).
pub fn polar_to_cartesian(rho: f64, phi: f64, drho: f64) -> (f64, f64, f64, f64) {
    let (sin_phi, cos_phi) = phi.sin_cos();
    (
        rho * cos_phi,
        rho * sin_phi,
        drho * cos_phi,
        drho * sin_phi,
    )
}

/// Jacobian of the radar measurement function h(x) = [rho, phi, drho]ᵀ,
/// linearised at the state `[px, py, vx, vy]`.
///
/// Returns the 3×4 zero matrix when the squared distance falls below
/// [`DEGENERATE_THRESH`] (linearisation undefined at the origin).
pub fn jacobian(px: f64, py: f64, vx: f64, vy: f64) -> RadarObsMat {
    let d2 = px * px + py * py;
    if d2 < DEGENERATE_THRESH {
        warn!(d2, "degenerate Jacobian: squared distance below threshold");
        return RadarObsMat::zeros();
    }
    let d = d2.sqrt();
    let d3 = d2 * d;

    // ∂rho/∂p  = p/d
    // ∂phi/∂p  = [-py, px]/d²
    // ∂drho/∂p = p(v×p)/d³, ∂drho/∂v = p/d
    RadarObsMat::new(
        px / d,
        py / d,
        0.0,
        0.0,
        -py / d2,
        px / d2,
        0.0,
        0.0,
        py * (vx * py - vy * px) / d3,
        px * (vy * px - vx * py) / d3,
        px / d,
        py / d,
    )
}

/// Elapsed time in seconds between two microsecond epoch timestamps.
///
/// Not guarded against `t2 < t1`; callers that require monotonic input
/// must check before converting.
pub fn time_difference(t1: u64, t2: u64) -> f64 {
    (t2 as f64 - t1 as f64) / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn polar_cartesian_roundtrip() {
        for &(rho, phi, drho) in &[
            (8.46642, 0.0287602, -3.04035),
            (1.0, std::f64::consts::FRAC_PI_4, 0.5),
            (120.0, -2.8, 14.0),
        ] {
            let (x, y, vx, vy) = polar_to_cartesian(rho, phi, drho);
            let (r2, p2, d2) = cartesian_to_polar(x, y, vx, vy);
            assert_abs_diff_eq!(r2, rho, epsilon = 1e-9);
            assert_abs_diff_eq!(p2, phi, epsilon = 1e-9);
            assert_abs_diff_eq!(d2, drho, epsilon = 1e-9);
        }
    }

    #[test]
    fn degenerate_polar_conversion_is_zero() {
        let (rho, phi, drho) = cartesian_to_polar(0.0, 0.0, 3.0, -1.0);
        assert_eq!((rho, phi, drho), (0.0, 0.0, 0.0));
    }

    #[test]
    fn jacobian_matches_analytic_values() {
        let h = jacobian(1.0, 1.0, 1.0, 0.0);
        let d = 2.0_f64.sqrt();
        // rho row
        assert_abs_diff_eq!(h[(0, 0)], 1.0 / d, epsilon = 1e-12);
        assert_abs_diff_eq!(h[(0, 1)], 1.0 / d, epsilon = 1e-12);
        // phi row
        assert_abs_diff_eq!(h[(1, 0)], -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(h[(1, 1)], 0.5, epsilon = 1e-12);
        // drho row: py(vx·py − vy·px)/d³ = 1·(1−0)/d³
        assert_abs_diff_eq!(h[(2, 0)], 1.0 / (2.0 * d), epsilon = 1e-12);
        assert_abs_diff_eq!(h[(2, 1)], -1.0 / (2.0 * d), epsilon = 1e-12);
        assert_abs_diff_eq!(h[(2, 2)], 1.0 / d, epsilon = 1e-12);
        assert_abs_diff_eq!(h[(2, 3)], 1.0 / d, epsilon = 1e-12);
    }

    #[test]
    fn jacobian_degenerate_at_origin() {
        let h = jacobian(0.0, 0.0, 5.0, -2.0);
        assert_eq!(h, RadarObsMat::zeros());
    }

    #[test]
    fn time_difference_microseconds_to_seconds() {
        assert_abs_diff_eq!(
            time_difference(1_477_010_443_449_633, 1_477_010_443_499_633),
            0.05,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(time_difference(10, 10), 0.0, epsilon = 1e-15);
    }
}
