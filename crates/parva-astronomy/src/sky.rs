use parva_types::{Body, Instant, ParvaError, normalize_degrees};

use crate::provider::PositionProvider;
use crate::solver::BoundarySolver;

/// A position provider paired with the solver used to search it.
///
/// Cheap to copy; every calculator in this crate takes one.
#[derive(Debug, Clone, Copy)]
pub struct Sky<'a> {
    pub provider: &'a dyn PositionProvider,
    pub solver: BoundarySolver,
}

impl<'a> Sky<'a> {
    pub fn new(provider: &'a dyn PositionProvider, solver: BoundarySolver) -> Self {
        Self { provider, solver }
    }

    pub fn sun_sidereal(&self, at: Instant) -> Result<f64, ParvaError> {
        self.provider.sidereal_longitude(Body::Sun, at)
    }

    pub fn moon_sidereal(&self, at: Instant) -> Result<f64, ParvaError> {
        self.provider.sidereal_longitude(Body::Moon, at)
    }

    /// Moon minus Sun. The ayanamsa cancels, so tropical longitudes are used.
    pub fn elongation(&self, at: Instant) -> Result<f64, ParvaError> {
        let sun = self.provider.tropical_longitude(Body::Sun, at)?;
        let moon = self.provider.tropical_longitude(Body::Moon, at)?;
        Ok(normalize_degrees(moon - sun))
    }

    /// Sidereal Sun plus sidereal Moon, the yoga argument.
    pub fn yoga_sum(&self, at: Instant) -> Result<f64, ParvaError> {
        Ok(normalize_degrees(self.sun_sidereal(at)? + self.moon_sidereal(at)?))
    }

    /// Solver tuned for slow or coarse targets (sign ingress, syzygies).
    pub fn coarse_solver(&self) -> BoundarySolver {
        self.solver.with_scan_step(self.solver.scan_step_days.max(1.0))
    }
}
