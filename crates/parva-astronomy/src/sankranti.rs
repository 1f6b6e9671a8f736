//! Solar ingress into the sidereal signs.

use chrono::{Datelike, NaiveDate};
use parva_types::{
    Instant, NEPAL_UTC_OFFSET_MINUTES, ParvaError, Rashi, SankrantiEvent,
    panchanga::RASHI_SPAN_DEG,
    time::{civil_date, civil_offset, utc_midnight},
};
use tracing::debug;

use crate::sky::Sky;
use crate::solver::Direction;

/// A sign lasts at most ~31.5 days.
const NEXT_SCAN_DAYS: u32 = 35;
/// Any given sign recurs within a sidereal year.
const SIGN_SCAN_DAYS: u32 = 370;

fn event(rashi: Rashi, instant: Instant) -> Result<SankrantiEvent, ParvaError> {
    let npt = civil_offset(NEPAL_UTC_OFFSET_MINUTES)?;
    Ok(SankrantiEvent { rashi, instant, bs_month: rashi.bs_month(), civil_date: civil_date(instant, npt) })
}

fn year_start(year: i32, month: u32, day: u32) -> Result<Instant, ParvaError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(utc_midnight)
        .ok_or_else(|| ParvaError::invalid_input(format!("year {} not representable", year)))
}

/// Next ingress into `rashi` after `after`.
pub fn find_sankranti(sky: &Sky<'_>, rashi: Rashi, after: Instant) -> Result<SankrantiEvent, ParvaError> {
    let instant = sky.coarse_solver().find_angle(
        |t| sky.sun_sidereal(t),
        after,
        rashi.start_longitude(),
        Direction::Forward,
        SIGN_SCAN_DAYS,
    )?;
    event(rashi, instant)
}

/// Next ingress into any sign after `after`.
pub fn next_sankranti(sky: &Sky<'_>, after: Instant) -> Result<SankrantiEvent, ParvaError> {
    let entering = Rashi::from_longitude(sky.sun_sidereal(after)?).next();
    let instant = sky.coarse_solver().find_crossing(
        |t| sky.sun_sidereal(t),
        after,
        RASHI_SPAN_DEG,
        Direction::Forward,
        NEXT_SCAN_DAYS,
    )?;
    event(entering, instant)
}

/// Mesh Sankranti (Nepali new year) of a Gregorian year.
pub fn mesh_sankranti(sky: &Sky<'_>, year: i32) -> Result<SankrantiEvent, ParvaError> {
    find_sankranti(sky, Rashi::Mesha, year_start(year, 3, 15)?)
}

/// Makara (Maghe) Sankranti of a Gregorian year.
pub fn makara_sankranti(sky: &Sky<'_>, year: i32) -> Result<SankrantiEvent, ParvaError> {
    find_sankranti(sky, Rashi::Makara, year_start(year, 1, 1)?)
}

/// The twelve ingresses starting with the first at or after 1 January 00:00
/// UTC of `year`, in time order.
pub fn sankrantis_in_year(sky: &Sky<'_>, year: i32) -> Result<[SankrantiEvent; 12], ParvaError> {
    let mut after = year_start(year, 1, 1)?;
    let mut events = Vec::with_capacity(12);
    for _ in 0..12 {
        let ev = next_sankranti(sky, after)?;
        after = ev.instant;
        events.push(ev);
    }
    debug!(year, first = %events[0].rashi, "sankrantis located");
    events
        .try_into()
        .map_err(|_| ParvaError::invalid_input(format!("expected 12 sankrantis in {}", year)))
}

/// Ingresses in `[start, end)`.
pub fn sankrantis_between(sky: &Sky<'_>, start: Instant, end: Instant) -> Result<Vec<SankrantiEvent>, ParvaError> {
    let mut found = Vec::new();
    let mut after = start;
    loop {
        let ev = next_sankranti(sky, after)?;
        if ev.instant >= end {
            break;
        }
        after = ev.instant;
        found.push(ev);
    }
    Ok(found)
}

/// Gregorian year whose Mesh Sankranti has passed by `instant`, i.e. the
/// solar year the instant belongs to.
pub fn solar_year_of(sky: &Sky<'_>, instant: Instant) -> Result<i32, ParvaError> {
    let year = instant.year();
    let mesh = mesh_sankranti(sky, year)?;
    Ok(if instant >= mesh.instant { year } else { year - 1 })
}
