//! Instants, civil dates and observer locations.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParvaError;

/// A point in time, always normalized to UTC.
///
/// Local inputs are accepted only as zoned `DateTime<Tz>` and go through
/// [`to_instant`], so a naive timestamp can never reach a calculation.
pub type Instant = DateTime<Utc>;

/// Nepal Standard Time offset (UTC+05:45) in minutes.
pub const NEPAL_UTC_OFFSET_MINUTES: i32 = 345;

/// Normalizes a zoned timestamp to UTC.
pub fn to_instant<Tz: TimeZone>(dt: &DateTime<Tz>) -> Instant {
    dt.with_timezone(&Utc)
}

/// Builds a fixed civil offset from minutes east of UTC.
pub fn civil_offset(minutes: i32) -> Result<FixedOffset, ParvaError> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or_else(|| ParvaError::invalid_input(format!("UTC offset {} minutes out of range", minutes)))
}

/// Civil calendar date of an instant at a fixed offset.
pub fn civil_date(instant: Instant, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}

/// 00:00 UTC of a date.
pub fn utc_midnight(date: NaiveDate) -> Instant {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Shifts an instant by a fractional number of days (millisecond resolution).
pub fn add_days(instant: Instant, days: f64) -> Instant {
    instant + Duration::milliseconds((days * 86_400_000.0).round() as i64)
}

/// Signed difference `b - a` in fractional days.
pub fn days_between(a: Instant, b: Instant) -> f64 {
    (b - a).num_milliseconds() as f64 / 86_400_000.0
}

/// Geographic coordinates of an observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    /// Latitude in degrees, north positive.
    pub lat: f64,
    /// Longitude in degrees, east positive.
    pub lng: f64,
}

impl GeoCoordinate {
    /// Kathmandu, the reference location for official Nepali dates.
    pub const KATHMANDU: GeoCoordinate = GeoCoordinate { lat: 27.7172, lng: 85.3240 };

    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Creates a coordinate, rejecting non-finite or out-of-range values.
    pub fn try_new(lat: f64, lng: f64) -> Result<Self, ParvaError> {
        let coord = Self { lat, lng };
        coord.validate()?;
        Ok(coord)
    }

    pub fn validate(&self) -> Result<(), ParvaError> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(ParvaError::invalid_input(format!("latitude {} outside [-90, 90]", self.lat)));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(ParvaError::invalid_input(format!("longitude {} outside [-180, 180]", self.lng)));
        }
        Ok(())
    }
}

impl Default for GeoCoordinate {
    fn default() -> Self {
        Self::KATHMANDU
    }
}
