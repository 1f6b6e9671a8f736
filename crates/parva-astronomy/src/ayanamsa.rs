//! Sidereal zero point.

use serde::{Deserialize, Serialize};

use crate::time::julian_centuries;

/// Sidereal reference system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ayanamsa {
    /// Chitrapaksha, the Indian and Nepali government standard.
    #[default]
    Lahiri,
    Raman,
    Krishnamurti,
    /// No correction: sidereal longitudes equal tropical ones.
    Tropical,
}

impl Ayanamsa {
    /// Value at J2000.0 in degrees.
    pub const fn reference_j2000_deg(self) -> f64 {
        match self {
            Ayanamsa::Lahiri => 23.853,
            Ayanamsa::Raman => 22.370,
            Ayanamsa::Krishnamurti => 23.850,
            Ayanamsa::Tropical => 0.0,
        }
    }

    /// Mean ayanamsa in degrees at a TT Julian Day.
    pub fn value_at(self, jd_tt: f64) -> f64 {
        match self {
            Ayanamsa::Tropical => 0.0,
            _ => self.reference_j2000_deg() + general_precession_deg(julian_centuries(jd_tt)),
        }
    }
}

/// IAU 2006 general precession in longitude, degrees, `t` in Julian centuries.
pub fn general_precession_deg(t: f64) -> f64 {
    let arcsec = 5028.796195 * t + 1.1054348 * t.powi(2) + 0.00007964 * t.powi(3)
        - 0.000023857 * t.powi(4)
        - 0.0000000383 * t.powi(5);
    arcsec / 3600.0
}
