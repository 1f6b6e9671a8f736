//! Julian Day and Delta T.

use parva_types::Instant;

/// Julian Day of J2000.0 (2000-01-01 12:00 TT).
pub const J2000_JD: f64 = 2_451_545.0;
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Julian Day (UT) of an instant.
pub fn julian_day(instant: Instant) -> f64 {
    instant.timestamp_millis() as f64 / 86_400_000.0 + UNIX_EPOCH_JD
}

/// Julian Day in Terrestrial Time, the argument of the analytic series.
pub fn julian_day_tt(instant: Instant) -> f64 {
    let jd = julian_day(instant);
    jd + delta_t_seconds(decimal_year(jd)) / 86_400.0
}

/// Julian centuries since J2000.0.
pub fn julian_centuries(jd: f64) -> f64 {
    (jd - J2000_JD) / 36_525.0
}

/// Approximate decimal year of a Julian Day.
pub fn decimal_year(jd: f64) -> f64 {
    2000.0 + (jd - J2000_JD) / 365.25
}

/// TT - UT in seconds.
///
/// Espenak-Meeus polynomials for 1900-2150, Morrison-Stephenson parabola
/// elsewhere. Good to a few seconds over the last century, which is far below
/// what a calendar day can resolve.
pub fn delta_t_seconds(year: f64) -> f64 {
    let y = year;
    if y < 1900.0 || y >= 2150.0 {
        let u = (y - 1820.0) / 100.0;
        return -20.0 + 32.0 * u * u;
    }
    if y < 1920.0 {
        let t = y - 1900.0;
        return -2.79 + 1.494119 * t - 0.0598939 * t.powi(2) + 0.0061966 * t.powi(3) - 0.000197 * t.powi(4);
    }
    if y < 1941.0 {
        let t = y - 1920.0;
        return 21.20 + 0.84493 * t - 0.076100 * t.powi(2) + 0.0020936 * t.powi(3);
    }
    if y < 1961.0 {
        let t = y - 1950.0;
        return 29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0;
    }
    if y < 1986.0 {
        let t = y - 1975.0;
        return 45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0;
    }
    if y < 2005.0 {
        let t = y - 2000.0;
        return 63.86 + 0.3345 * t - 0.060374 * t.powi(2)
            + 0.0017275 * t.powi(3)
            + 0.000651814 * t.powi(4)
            + 0.00002373599 * t.powi(5);
    }
    if y < 2050.0 {
        let t = y - 2000.0;
        return 62.92 + 0.32217 * t + 0.005589 * t.powi(2);
    }
    let u = (y - 1820.0) / 100.0;
    -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_julian_day_epochs() {
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!((julian_day(j2000) - J2000_JD).abs() < 1e-9);
        let unix = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert!((julian_day(unix) - 2_440_587.5).abs() < 1e-9);
    }

    #[test]
    fn test_delta_t_modern_values() {
        // Observed: ~63.8 s in 2000, ~69 s in 2020.
        assert!((delta_t_seconds(2000.0) - 63.86).abs() < 0.5);
        assert!((delta_t_seconds(2020.0) - 71.6).abs() < 3.0);
        // Continuous across the 2005 seam.
        assert!((delta_t_seconds(2004.999) - delta_t_seconds(2005.0)).abs() < 0.5);
    }

    #[test]
    fn test_tt_runs_ahead_of_ut() {
        let t = Utc.with_ymd_and_hms(2026, 2, 15, 0, 0, 0).unwrap();
        let lead = (julian_day_tt(t) - julian_day(t)) * 86_400.0;
        assert!(lead > 60.0 && lead < 90.0);
    }
}
