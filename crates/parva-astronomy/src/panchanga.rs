//! The daily almanac.

use chrono::{Datelike, NaiveDate};
use parva_types::{
    GeoCoordinate, Karana, Nakshatra, Panchanga, ParvaError, Rashi, Vaara, Yoga,
    panchanga::{KARANA_SPAN_DEG, NAKSHATRA_SPAN_DEG},
};
use tracing::trace;

use crate::sky::Sky;
use crate::solver::Direction;
use crate::tithi::udaya_tithi;

const LIMB_SCAN_DAYS: u32 = 2;

/// Panchanga for `date` at `coord`, every limb taken at local sunrise.
pub fn compute_panchanga(sky: &Sky<'_>, date: NaiveDate, coord: GeoCoordinate) -> Result<Panchanga, ParvaError> {
    let tithi = udaya_tithi(sky, date, coord)?;
    let sunrise = tithi.sunrise;

    let moon = sky.moon_sidereal(sunrise)?;
    let sun = sky.sun_sidereal(sunrise)?;
    let elongation = sky.elongation(sunrise)?;
    let yoga_sum = sky.yoga_sum(sunrise)?;

    let nakshatra_ends_at = sky.solver.find_crossing(
        |t| sky.moon_sidereal(t),
        sunrise,
        NAKSHATRA_SPAN_DEG,
        Direction::Forward,
        LIMB_SCAN_DAYS,
    )?;
    let yoga_ends_at =
        sky.solver
            .find_crossing(|t| sky.yoga_sum(t), sunrise, NAKSHATRA_SPAN_DEG, Direction::Forward, LIMB_SCAN_DAYS)?;
    let karana_ends_at =
        sky.solver
            .find_crossing(|t| sky.elongation(t), sunrise, KARANA_SPAN_DEG, Direction::Forward, LIMB_SCAN_DAYS)?;

    trace!(%date, tithi = %tithi.tithi, "panchanga computed");

    Ok(Panchanga {
        date,
        location: coord,
        vaara: Vaara::from_weekday(date.weekday()),
        tithi,
        nakshatra: Nakshatra::from_longitude(moon),
        nakshatra_ends_at,
        yoga: Yoga::from_longitude_sum(yoga_sum),
        yoga_ends_at,
        karana: Karana::from_elongation(elongation),
        karana_ends_at,
        sun_rashi: Rashi::from_longitude(sun),
        moon_rashi: Rashi::from_longitude(moon),
    })
}
