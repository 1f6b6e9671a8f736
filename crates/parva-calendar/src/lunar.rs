//! Amavasya-to-Amavasya lunar months and Adhik Maas detection.
//!
//! Months follow the amanta convention. A month takes the name of the sign
//! the Sun occupies when it opens: the month in which the Sun enters Mesha is
//! Chaitra, the one in which it enters Vrishabha is Baishakh, and so on. A
//! month with no ingress opens and closes in the same sign, so it shares its
//! name with the month after it; it is the Adhik one, and the later month
//! keeps the plain name.

use chrono::{Datelike, NaiveDate};
use parva_types::{
    BsMonth, Instant, LunarMonth, LunarYear, ParvaError, Rashi,
    time::utc_midnight,
};
use parva_astronomy::{Direction, Sky};
use smallvec::SmallVec;
use tracing::{debug, trace};

/// One synodic month plus margin.
const LUNATION_SCAN_DAYS: u32 = 32;

/// Nearest Sun-Moon conjunction in `direction` from `at`.
///
/// The returned instant lies just after the conjunction, inside the month it
/// opens.
pub fn find_amavasya(sky: &Sky<'_>, at: Instant, direction: Direction) -> Result<Instant, ParvaError> {
    sky.coarse_solver()
        .find_crossing(|t| sky.elongation(t), at, 360.0, direction, LUNATION_SCAN_DAYS)
}

/// Nearest full moon in `direction` from `at`.
pub fn find_purnima(sky: &Sky<'_>, at: Instant, direction: Direction) -> Result<Instant, ParvaError> {
    sky.coarse_solver()
        .find_angle(|t| sky.elongation(t), at, 180.0, direction, LUNATION_SCAN_DAYS)
}

/// Describes the window `[start, end)` between two conjunctions.
///
/// # Errors
/// `UndefinedLunarMonth` when no full moon falls inside the window.
pub fn build_month(sky: &Sky<'_>, start: Instant, end: Instant) -> Result<LunarMonth, ParvaError> {
    let purnima = find_purnima(sky, start, Direction::Forward)?;
    if purnima >= end {
        return Err(ParvaError::UndefinedLunarMonth { start, end });
    }

    let sign_at_start = Rashi::from_longitude(sky.sun_sidereal(start)?);
    let sign_at_end = Rashi::from_longitude(sky.sun_sidereal(end)?);
    let sign_at_purnima = Rashi::from_longitude(sky.sun_sidereal(purnima)?);
    let sankranti_count = (sign_at_end.index() + 12 - sign_at_start.index()) % 12;

    let month = BsMonth::ALL[usize::from(sign_at_start.index())];
    let is_adhik = sankranti_count == 0;
    let name = if is_adhik { format!("Adhik {}", month) } else { month.to_string() };

    trace!(%start, %end, %name, sankranti_count, "lunar month");
    Ok(LunarMonth {
        start,
        end,
        purnima,
        solar_sign_at_purnima: sign_at_purnima.index() + 1,
        sankranti_count,
        month,
        name,
        is_adhik,
    })
}

/// Lunar month containing `at`.
pub fn lunar_month_at(sky: &Sky<'_>, at: Instant) -> Result<LunarMonth, ParvaError> {
    let start = find_amavasya(sky, at, Direction::Backward)?;
    let end = find_amavasya(sky, start, Direction::Forward)?;
    build_month(sky, start, end)
}

/// Consecutive months whose windows intersect `[from, to)`.
pub fn months_between(sky: &Sky<'_>, from: Instant, to: Instant) -> Result<Vec<LunarMonth>, ParvaError> {
    let mut months = Vec::with_capacity(14);
    let mut start = find_amavasya(sky, from, Direction::Backward)?;
    while start < to {
        let end = find_amavasya(sky, start, Direction::Forward)?;
        months.push(build_month(sky, start, end)?);
        start = end;
    }
    Ok(months)
}

fn jan_first(year: i32) -> Result<Instant, ParvaError> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .map(utc_midnight)
        .ok_or_else(|| ParvaError::invalid_input(format!("year {} not representable", year)))
}

/// Lunar months covering Gregorian `year`: from the conjunction at or
/// before 1 January to the first one after 31 December.
pub fn lunar_year(sky: &Sky<'_>, year: i32) -> Result<LunarYear, ParvaError> {
    let months = months_between(sky, jan_first(year)?, jan_first(year + 1)?)?;
    let year_value = LunarYear { gregorian_year: year, months: SmallVec::from_vec(months) };
    if let Some(adhik) = year_value.adhik_month() {
        debug!(year, month = %adhik.name, start = %adhik.start, "adhik maas");
    }
    Ok(year_value)
}

/// Intercalary months opening in Gregorian years `start_year..=end_year`.
pub fn adhik_months(sky: &Sky<'_>, start_year: i32, end_year: i32) -> Result<Vec<LunarMonth>, ParvaError> {
    if end_year < start_year {
        return Err(ParvaError::invalid_input(format!("year span {}..={} is empty", start_year, end_year)));
    }
    let months = months_between(sky, jan_first(start_year)?, jan_first(end_year + 1)?)?;
    Ok(months
        .into_iter()
        .filter(|m| m.is_adhik && (start_year..=end_year).contains(&m.start.year()))
        .collect())
}
