use serde::{Deserialize, Serialize};
use std::fmt;

/// Bodies the position provider can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Body {
    Sun,
    Moon,
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
        };
        write!(f, "{}", s)
    }
}

/// Ecliptic longitude and its rate of change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngularPosition {
    /// Degrees in `[0, 360)`.
    pub longitude: f64,
    /// Degrees per day.
    pub angular_velocity: f64,
}

impl AngularPosition {
    pub fn new(longitude: f64, angular_velocity: f64) -> Self {
        Self { longitude: normalize_degrees(longitude), angular_velocity }
    }

    pub fn is_retrograde(&self) -> bool {
        self.angular_velocity < 0.0
    }

    /// Same body shifted by `offset` degrees (e.g. minus ayanamsa).
    pub fn shifted(&self, offset: f64) -> Self {
        Self::new(self.longitude + offset, self.angular_velocity)
    }
}

/// Wraps an angle into `[0, 360)`.
pub fn normalize_degrees(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negatives
    if r >= 360.0 { 0.0 } else { r }
}

/// Shortest signed difference `a - b`, in `(-180, 180]`.
pub fn shortest_signed_difference(a: f64, b: f64) -> f64 {
    let d = normalize_degrees(a - b);
    if d > 180.0 { d - 360.0 } else { d }
}
