//! Body positions.

use chrono::{Datelike, Duration, NaiveDate};
use parva_types::{AngularPosition, Body, GeoCoordinate, Instant, ParvaError, normalize_degrees, shortest_signed_difference};
use std::fmt;

use crate::ayanamsa::Ayanamsa;
use crate::sunrise::find_sunrise;
use crate::time::julian_day_tt;

/// Source of ecliptic positions and sunrise times.
///
/// Implementations are pure: the same arguments always give the same answer.
pub trait PositionProvider: fmt::Debug + Send + Sync {
    /// Geocentric tropical ecliptic longitude in degrees, `[0, 360)`.
    fn tropical_longitude(&self, body: Body, at: Instant) -> Result<f64, ParvaError>;

    /// Degrees to subtract from tropical longitudes.
    fn ayanamsa(&self, at: Instant) -> Result<f64, ParvaError>;

    /// Local sunrise on a civil date.
    fn sunrise(&self, date: NaiveDate, coord: GeoCoordinate) -> Result<Instant, ParvaError>;

    fn sidereal_longitude(&self, body: Body, at: Instant) -> Result<f64, ParvaError> {
        Ok(normalize_degrees(self.tropical_longitude(body, at)? - self.ayanamsa(at)?))
    }

    /// Tropical longitude plus velocity from a one-hour central difference.
    fn tropical_position(&self, body: Body, at: Instant) -> Result<AngularPosition, ParvaError> {
        let h = Duration::minutes(30);
        let before = self.tropical_longitude(body, at - h)?;
        let after = self.tropical_longitude(body, at + h)?;
        let velocity = shortest_signed_difference(after, before) * 24.0;
        Ok(AngularPosition::new(self.tropical_longitude(body, at)?, velocity))
    }

    fn sidereal_position(&self, body: Body, at: Instant) -> Result<AngularPosition, ParvaError> {
        Ok(self.tropical_position(body, at)?.shifted(-self.ayanamsa(at)?))
    }
}

/// Analytic Sun and Moon series from the `astro` crate.
///
/// VSOP87 for the Sun and the ELP-2000/82 truncation for the Moon; a few
/// arcseconds for the Sun and roughly ten for the Moon over the supported
/// span, well below one minute of tithi timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnalyticEphemeris {
    ayanamsa: Ayanamsa,
}

impl AnalyticEphemeris {
    /// Earliest supported year.
    pub const MIN_YEAR: i32 = -1000;
    /// Latest supported year.
    pub const MAX_YEAR: i32 = 3000;

    pub fn new(ayanamsa: Ayanamsa) -> Self {
        Self { ayanamsa }
    }

    pub fn ayanamsa_system(&self) -> Ayanamsa {
        self.ayanamsa
    }

    fn jd_tt(&self, at: Instant) -> Result<f64, ParvaError> {
        let year = at.year();
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(ParvaError::provider(format!(
                "instant {} outside analytic ephemeris span {}..={}",
                at,
                Self::MIN_YEAR,
                Self::MAX_YEAR
            )));
        }
        Ok(julian_day_tt(at))
    }
}

impl PositionProvider for AnalyticEphemeris {
    fn tropical_longitude(&self, body: Body, at: Instant) -> Result<f64, ParvaError> {
        let jd = self.jd_tt(at)?;
        let (point, _distance) = match body {
            Body::Sun => astro::sun::geocent_ecl_pos(jd),
            Body::Moon => astro::lunar::geocent_ecl_pos(jd),
        };
        let lon = point.long.to_degrees();
        if !lon.is_finite() {
            return Err(ParvaError::provider(format!("non-finite {} longitude at {}", body, at)));
        }
        Ok(normalize_degrees(lon))
    }

    fn ayanamsa(&self, at: Instant) -> Result<f64, ParvaError> {
        Ok(self.ayanamsa.value_at(self.jd_tt(at)?))
    }

    fn sunrise(&self, date: NaiveDate, coord: GeoCoordinate) -> Result<Instant, ParvaError> {
        find_sunrise(date, coord, |t| self.tropical_longitude(Body::Sun, t))
    }
}
