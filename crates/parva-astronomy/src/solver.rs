//! Angle boundary search.
//!
//! Locates the instant at which a periodic angle (elongation, solar longitude,
//! ...) crosses a target. All comparisons use the shortest signed difference
//! to the target, so the 360/0 wrap of the raw angle never looks like a
//! crossing: a sign change only counts when the two samples are close
//! (|f(a) - f(b)| < 270 degrees).

use parva_types::{Instant, ParvaError, normalize_degrees, shortest_signed_difference, time::add_days};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Search direction in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

/// Coarse-scan plus bisection root finder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundarySolver {
    /// Time between coarse samples.
    pub scan_step_days: f64,
    /// Width of the final bracket.
    pub tolerance_seconds: f64,
    /// Bisection cap.
    pub max_iterations: u32,
}

impl Default for BoundarySolver {
    fn default() -> Self {
        Self { scan_step_days: 0.25, tolerance_seconds: 1.0, max_iterations: 64 }
    }
}

impl BoundarySolver {
    /// Same solver with a different coarse step.
    pub fn with_scan_step(mut self, days: f64) -> Self {
        self.scan_step_days = days;
        self
    }

    /// Next instant (in `direction`) at which the angle crosses a multiple of
    /// `step_degrees`.
    ///
    /// Forward finds the end of the segment containing `start`; Backward finds
    /// its beginning. The returned instant lies on the far side of the
    /// boundary, within `tolerance_seconds`.
    pub fn find_crossing<F>(
        &self,
        angle_fn: F,
        start: Instant,
        step_degrees: f64,
        direction: Direction,
        max_scan_days: u32,
    ) -> Result<Instant, ParvaError>
    where
        F: Fn(Instant) -> Result<f64, ParvaError>,
    {
        if !step_degrees.is_finite() || step_degrees <= 0.0 || step_degrees > 360.0 {
            return Err(ParvaError::invalid_input(format!("step {} outside (0, 360]", step_degrees)));
        }
        let a0 = normalize_degrees(angle_fn(start)?);
        let segment = (a0 / step_degrees).floor();
        let target = match direction {
            Direction::Forward => (segment + 1.0) * step_degrees,
            Direction::Backward => segment * step_degrees,
        };
        self.find_angle(angle_fn, start, target, direction, max_scan_days)
    }

    /// Next instant (in `direction`) at which the angle equals `target_degrees`.
    pub fn find_angle<F>(
        &self,
        angle_fn: F,
        start: Instant,
        target_degrees: f64,
        direction: Direction,
        max_scan_days: u32,
    ) -> Result<Instant, ParvaError>
    where
        F: Fn(Instant) -> Result<f64, ParvaError>,
    {
        let target = normalize_degrees(target_degrees);
        self.find_zero(
            |t| Ok(shortest_signed_difference(angle_fn(t)?, target)),
            start,
            direction,
            max_scan_days,
        )
    }

    /// Root of a signed angular distance function.
    pub fn find_zero<F>(
        &self,
        signed_fn: F,
        start: Instant,
        direction: Direction,
        max_scan_days: u32,
    ) -> Result<Instant, ParvaError>
    where
        F: Fn(Instant) -> Result<f64, ParvaError>,
    {
        if !(self.scan_step_days.is_finite() && self.scan_step_days > 0.0) {
            return Err(ParvaError::invalid_input(format!(
                "scan step {} days must be positive",
                self.scan_step_days
            )));
        }
        let step = match direction {
            Direction::Forward => self.scan_step_days,
            Direction::Backward => -self.scan_step_days,
        };
        let max_steps = (f64::from(max_scan_days) / self.scan_step_days).ceil() as u64;

        let mut t_prev = start;
        let mut f_prev = signed_fn(start)?;
        if f_prev == 0.0 {
            return Ok(start);
        }

        for _ in 0..max_steps {
            let t_curr = add_days(t_prev, step);
            let f_curr = signed_fn(t_curr)?;
            if is_genuine_crossing(f_prev, f_curr) {
                let (a, fa, b) = match direction {
                    Direction::Forward => (t_prev, f_prev, t_curr),
                    Direction::Backward => (t_curr, f_curr, t_prev),
                };
                return self.bisect(&signed_fn, a, fa, b);
            }
            t_prev = t_curr;
            f_prev = f_curr;
        }

        Err(ParvaError::BoundaryNotFound { start, max_scan_days })
    }

    /// Narrows `[a, b]` (a before b, sign change inside) to the tolerance and
    /// returns the later edge, which is always on the new side of the boundary.
    fn bisect<F>(&self, signed_fn: &F, mut a: Instant, mut fa: f64, mut b: Instant) -> Result<Instant, ParvaError>
    where
        F: Fn(Instant) -> Result<f64, ParvaError>,
    {
        let tolerance_ms = (self.tolerance_seconds * 1000.0).max(1.0) as i64;
        let mut iterations = 0;
        while (b - a).num_milliseconds() > tolerance_ms && iterations < self.max_iterations {
            let mid = a + (b - a) / 2;
            let fm = signed_fn(mid)?;
            if fm == 0.0 {
                return Ok(mid);
            }
            if is_genuine_crossing(fa, fm) {
                b = mid;
            } else {
                a = mid;
                fa = fm;
            }
            iterations += 1;
        }
        trace!(iterations, bracket_ms = (b - a).num_milliseconds(), "boundary bracketed");
        Ok(b)
    }
}

fn is_genuine_crossing(f_a: f64, f_b: f64) -> bool {
    (f_a <= 0.0) != (f_b <= 0.0) && (f_a - f_b).abs() < 270.0
}

/// [`BoundarySolver::find_crossing`] with default settings.
pub fn find_crossing<F>(
    angle_fn: F,
    start: Instant,
    step_degrees: f64,
    direction: Direction,
    max_scan_days: u32,
) -> Result<Instant, ParvaError>
where
    F: Fn(Instant) -> Result<f64, ParvaError>,
{
    BoundarySolver::default().find_crossing(angle_fn, start, step_degrees, direction, max_scan_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use parva_types::time::days_between;

    fn epoch() -> Instant {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    /// Angle advancing `rate` degrees per day from `offset` at the epoch.
    fn linear(offset: f64, rate: f64) -> impl Fn(Instant) -> Result<f64, ParvaError> {
        move |t| Ok(normalize_degrees(offset + rate * days_between(epoch(), t)))
    }

    #[test]
    fn test_forward_crossing_precision() {
        // 5 -> 12 degrees at 12.2 deg/day
        let t = find_crossing(linear(5.0, 12.2), epoch(), 12.0, Direction::Forward, 3).unwrap();
        let expected = 7.0 / 12.2;
        assert!((days_between(epoch(), t) - expected).abs() * 86_400.0 < 60.0);
    }

    #[test]
    fn test_wraparound_is_not_a_crossing() {
        // 350 -> 360 takes one day at 10 deg/day; step 360 means target 0.
        let t = find_crossing(linear(350.0, 10.0), epoch(), 360.0, Direction::Forward, 5).unwrap();
        assert!((days_between(epoch(), t) - 1.0).abs() * 86_400.0 < 60.0);

        // Target 180 from 300: the difference jumps from +180 to -180 when the
        // angle passes 0, which must not be mistaken for the crossing.
        let t = BoundarySolver::default()
            .find_angle(linear(300.0, 12.0), epoch(), 180.0, Direction::Forward, 40)
            .unwrap();
        assert!((days_between(epoch(), t) - 20.0).abs() * 86_400.0 < 60.0);
    }

    #[test]
    fn test_backward_finds_segment_start() {
        let t = find_crossing(linear(30.0, 1.0), epoch(), 12.0, Direction::Backward, 10).unwrap();
        // 30 -> 24 is six days back
        assert!((days_between(epoch(), t) + 6.0).abs() * 86_400.0 < 60.0);
    }

    #[test]
    fn test_result_lies_past_the_boundary() {
        let f = linear(5.0, 12.2);
        let t = find_crossing(&f, epoch(), 12.0, Direction::Forward, 3).unwrap();
        assert!(f(t).unwrap() >= 12.0);
    }

    #[test]
    fn test_constant_angle_is_boundary_not_found() {
        let err = find_crossing(|_| Ok(45.0), epoch(), 30.0, Direction::Forward, 10).unwrap_err();
        assert_eq!(err, ParvaError::BoundaryNotFound { start: epoch(), max_scan_days: 10 });
    }

    #[test]
    fn test_provider_errors_propagate() {
        let err = find_crossing(|_| Err(ParvaError::provider("offline")), epoch(), 12.0, Direction::Forward, 1)
            .unwrap_err();
        assert_eq!(err, ParvaError::provider("offline"));
    }

    #[test]
    fn test_bad_step_rejected() {
        assert!(find_crossing(linear(0.0, 1.0), epoch(), 0.0, Direction::Forward, 1).is_err());
        let solver = BoundarySolver::default().with_scan_step(-1.0);
        assert!(solver.find_angle(linear(0.0, 1.0), epoch(), 10.0, Direction::Forward, 20).is_err());
    }
}
