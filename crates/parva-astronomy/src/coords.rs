//! Ecliptic, equatorial and horizontal coordinate conversions (degrees).

use parva_types::normalize_degrees;

use crate::time::{J2000_JD, julian_centuries};

/// Mean obliquity of the ecliptic (Meeus 22.2).
pub fn mean_obliquity(jd_tt: f64) -> f64 {
    let t = julian_centuries(jd_tt);
    23.439_291_111 - 0.013_004_167 * t - 1.638_9e-7 * t * t + 5.036_1e-7 * t * t * t
}

/// Ecliptic (longitude, latitude) to equatorial (right ascension, declination).
pub fn ecliptic_to_equatorial(lon: f64, lat: f64, obliquity: f64) -> (f64, f64) {
    let (l, b, e) = (lon.to_radians(), lat.to_radians(), obliquity.to_radians());
    let ra = (l.sin() * e.cos() - b.tan() * e.sin()).atan2(l.cos());
    let dec = (b.sin() * e.cos() + b.cos() * e.sin() * l.sin()).asin();
    (normalize_degrees(ra.to_degrees()), dec.to_degrees())
}

/// Greenwich mean sidereal time for a UT Julian Day.
pub fn greenwich_sidereal_time(jd_ut: f64) -> f64 {
    let t = julian_centuries(jd_ut);
    normalize_degrees(
        280.460_618_37 + 360.985_647_366_29 * (jd_ut - J2000_JD) + 0.000_387_933 * t * t
            - t * t * t / 38_710_000.0,
    )
}

pub fn local_sidereal_time(jd_ut: f64, lng: f64) -> f64 {
    normalize_degrees(greenwich_sidereal_time(jd_ut) + lng)
}

/// Altitude above the horizon of an equatorial position.
pub fn altitude(ra: f64, dec: f64, lst: f64, lat: f64) -> f64 {
    let h = (lst - ra).to_radians();
    let (d, p) = (dec.to_radians(), lat.to_radians());
    (p.sin() * d.sin() + p.cos() * d.cos() * h.cos()).asin().to_degrees()
}
