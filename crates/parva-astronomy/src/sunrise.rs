//! Sunrise by bisection on the Sun's altitude.

use chrono::{Duration, NaiveDate};
use parva_types::{GeoCoordinate, Instant, ParvaError, time::utc_midnight};

use crate::coords;
use crate::time::{julian_day, julian_day_tt};

/// Apparent altitude of the upper limb at rise: refraction plus semi-diameter.
pub const SUNRISE_ALTITUDE_DEG: f64 = -0.8333;

const BISECTION_STEPS: u32 = 24;

/// Altitude of the Sun at `instant`, given a tropical longitude function.
pub fn sun_altitude<F>(instant: Instant, coord: GeoCoordinate, sun_longitude: &F) -> Result<f64, ParvaError>
where
    F: Fn(Instant) -> Result<f64, ParvaError>,
{
    let lon = sun_longitude(instant)?;
    let obliquity = coords::mean_obliquity(julian_day_tt(instant));
    let (ra, dec) = coords::ecliptic_to_equatorial(lon, 0.0, obliquity);
    let lst = coords::local_sidereal_time(julian_day(instant), coord.lng);
    Ok(coords::altitude(ra, dec, lst, coord.lat))
}

/// Finds the instant of sunrise on a local date.
///
/// Searches between local mean midnight and local mean noon, where the Sun's
/// altitude rises monotonically. A missing bracket means the Sun does not
/// rise or does not set that day.
///
/// # Errors
/// `ExternalProviderFailure` during polar day or night.
pub fn find_sunrise<F>(date: NaiveDate, coord: GeoCoordinate, sun_longitude: F) -> Result<Instant, ParvaError>
where
    F: Fn(Instant) -> Result<f64, ParvaError>,
{
    coord.validate()?;
    let local_midnight = utc_midnight(date) - Duration::seconds((coord.lng * 240.0).round() as i64);
    let mut low = local_midnight;
    let mut high = local_midnight + Duration::hours(12);

    let alt_low = sun_altitude(low, coord, &sun_longitude)?;
    let alt_high = sun_altitude(high, coord, &sun_longitude)?;
    if alt_low >= SUNRISE_ALTITUDE_DEG || alt_high <= SUNRISE_ALTITUDE_DEG {
        return Err(ParvaError::provider(format!(
            "no sunrise on {} at ({:.4}, {:.4})",
            date, coord.lat, coord.lng
        )));
    }

    for _ in 0..BISECTION_STEPS {
        let mid = low + (high - low) / 2;
        if sun_altitude(mid, coord, &sun_longitude)? < SUNRISE_ALTITUDE_DEG {
            low = mid;
        } else {
            high = mid;
        }
    }

    Ok(low + (high - low) / 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Utc};

    // Low-precision solar longitude (Meeus ch. 25 short form), enough to
    // exercise the search without the full ephemeris.
    fn approx_sun(instant: Instant) -> Result<f64, ParvaError> {
        let d = julian_day(instant) - crate::time::J2000_JD;
        let g = (357.529 + 0.985_600_28 * d).to_radians();
        let q = 280.459 + 0.985_647_36 * d;
        Ok(parva_types::normalize_degrees(q + 1.915 * g.sin() + 0.020 * (2.0 * g).sin()))
    }

    #[test]
    fn test_sunrise_kathmandu_february() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
        let rise = find_sunrise(date, GeoCoordinate::KATHMANDU, approx_sun).unwrap();
        // ~06:45 NPT = ~01:00 UTC
        let lo = Utc.with_ymd_and_hms(2026, 2, 15, 0, 30, 0).unwrap();
        let hi = Utc.with_ymd_and_hms(2026, 2, 15, 1, 30, 0).unwrap();
        assert!(rise > lo && rise < hi, "sunrise {}", rise);
    }

    #[test]
    fn test_sunrise_west_of_greenwich() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap();
        let new_york = GeoCoordinate::new(40.7128, -74.0060);
        let rise = find_sunrise(date, new_york, approx_sun).unwrap();
        // ~05:25 EDT = ~09:25 UTC, same UTC date
        assert_eq!(rise.day(), 21);
        let lo = Utc.with_ymd_and_hms(2025, 6, 21, 9, 0, 0).unwrap();
        let hi = Utc.with_ymd_and_hms(2025, 6, 21, 9, 50, 0).unwrap();
        assert!(rise > lo && rise < hi, "sunrise {}", rise);
    }

    #[test]
    fn test_polar_night_is_provider_failure() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 21).unwrap();
        let svalbard = GeoCoordinate::new(78.22, 15.65);
        let err = find_sunrise(date, svalbard, approx_sun).unwrap_err();
        assert_eq!(err.kind(), parva_types::ErrorKind::ExternalProviderFailure);
    }

    #[test]
    fn test_invalid_coordinate_rejected() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let err = find_sunrise(date, GeoCoordinate::new(95.0, 0.0), approx_sun).unwrap_err();
        assert_eq!(err.kind(), parva_types::ErrorKind::InvalidInput);
    }
}
