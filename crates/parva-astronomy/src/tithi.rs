//! Tithi lookup, Udaya Tithi and tithi day search.

use chrono::{Duration, FixedOffset, NaiveDate};
use parva_types::{
    GeoCoordinate, Instant, ParvaError, Tithi, UdayaTithi,
    panchanga::TITHI_SPAN_DEG,
    time::civil_date,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::sky::Sky;
use crate::solver::Direction;

/// No tithi lasts longer than about 26 hours.
const TITHI_SCAN_DAYS: u32 = 2;
/// One synodic month plus margin.
const LUNATION_SCAN_DAYS: u32 = 32;

/// Tithi at an instant.
pub fn tithi_at(sky: &Sky<'_>, at: Instant) -> Result<Tithi, ParvaError> {
    Ok(Tithi::from_elongation(sky.elongation(at)?))
}

/// Start and end of the tithi prevailing at `at`.
///
/// The start lies inside the tithi, the end just past it.
pub fn tithi_bounds(sky: &Sky<'_>, at: Instant) -> Result<(Instant, Instant), ParvaError> {
    let elongation = |t| sky.elongation(t);
    let start = sky
        .solver
        .find_crossing(elongation, at, TITHI_SPAN_DEG, Direction::Backward, TITHI_SCAN_DAYS)?;
    let end = sky
        .solver
        .find_crossing(elongation, at, TITHI_SPAN_DEG, Direction::Forward, TITHI_SCAN_DAYS)?;
    Ok((start, end))
}

/// Tithi prevailing at local sunrise on `date`.
///
/// Flags a Vriddhi tithi (also prevails at the next sunrise) and reports the
/// tithi skipped entirely between this sunrise and the next (Ksheepana).
pub fn udaya_tithi(sky: &Sky<'_>, date: NaiveDate, coord: GeoCoordinate) -> Result<UdayaTithi, ParvaError> {
    let next_date = date
        .succ_opt()
        .ok_or_else(|| ParvaError::invalid_input(format!("no day after {}", date)))?;
    let sunrise = sky.provider.sunrise(date, coord)?;
    let next_sunrise = sky.provider.sunrise(next_date, coord)?;

    let tithi = tithi_at(sky, sunrise)?;
    let elongation = |t| sky.elongation(t);
    let ends_at = sky
        .solver
        .find_crossing(elongation, sunrise, TITHI_SPAN_DEG, Direction::Forward, TITHI_SCAN_DAYS)?;

    let is_vriddhi = ends_at > next_sunrise;
    let skipped = if is_vriddhi {
        None
    } else {
        let following_end = sky
            .solver
            .find_crossing(elongation, ends_at, TITHI_SPAN_DEG, Direction::Forward, TITHI_SCAN_DAYS)?;
        (following_end <= next_sunrise).then(|| tithi.next())
    };

    if let Some(lost) = skipped {
        debug!(%date, tithi = %lost, "ksheepana tithi between sunrises");
    }

    Ok(UdayaTithi { date, sunrise, next_sunrise, tithi, ends_at, is_vriddhi, skipped })
}

/// Start of the next occurrence of `tithi` after `after`.
pub fn find_next_tithi(sky: &Sky<'_>, tithi: Tithi, after: Instant, within_days: u32) -> Result<Instant, ParvaError> {
    sky.solver.find_angle(
        |t| sky.elongation(t),
        after,
        tithi.start_elongation(),
        Direction::Forward,
        within_days,
    )
}

/// Civil day assigned to one occurrence of a tithi.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TithiDay {
    pub date: NaiveDate,
    pub tithi: Tithi,
    pub starts_at: Instant,
    pub ends_at: Instant,
    /// Sunrises inside the tithi: 0 for Ksheepana, 2 for Vriddhi.
    pub sunrise_count: u8,
}

impl TithiDay {
    pub fn is_ksheepana(&self) -> bool {
        self.sunrise_count == 0
    }

    pub fn is_vriddhi(&self) -> bool {
        self.sunrise_count > 1
    }
}

/// First occurrence of `tithi` starting inside `[window_start, window_end)`,
/// dated by the sunrise rule at `coord`.
///
/// The first date whose sunrise falls inside the tithi wins, so a Vriddhi
/// tithi is observed on its first day. A Ksheepana tithi falls back to the
/// day whose sunrise-to-sunrise span contains it.
pub fn tithi_in_window(
    sky: &Sky<'_>,
    tithi: Tithi,
    window_start: Instant,
    window_end: Instant,
    coord: GeoCoordinate,
    civil: FixedOffset,
) -> Result<Option<TithiDay>, ParvaError> {
    // A lunar month opens exactly on a tithi boundary; step back so the
    // opening tithi is not missed by a hair.
    let search_from = window_start - Duration::hours(1);
    let starts_at = find_next_tithi(sky, tithi, search_from, LUNATION_SCAN_DAYS)?;
    if starts_at >= window_end {
        trace!(%tithi, %starts_at, "tithi starts after window");
        return Ok(None);
    }
    let ends_at = sky.solver.find_crossing(
        |t| sky.elongation(t),
        starts_at,
        TITHI_SPAN_DEG,
        Direction::Forward,
        TITHI_SCAN_DAYS,
    )?;

    let first = civil_date(starts_at, civil);
    let mut chosen = None;
    let mut sunrise_count = 0u8;
    for date in first.iter_days().take(3) {
        let sunrise = sky.provider.sunrise(date, coord)?;
        if sunrise >= starts_at && sunrise < ends_at {
            sunrise_count += 1;
            chosen.get_or_insert(date);
        }
    }

    let date = match chosen {
        Some(date) => date,
        None => {
            let sunrise = sky.provider.sunrise(first, coord)?;
            let date = if sunrise <= starts_at {
                first
            } else {
                first
                    .pred_opt()
                    .ok_or_else(|| ParvaError::invalid_input(format!("no day before {}", first)))?
            };
            debug!(%tithi, %date, "ksheepana tithi, dated by enclosing day");
            date
        }
    };

    Ok(Some(TithiDay { date, tithi, starts_at, ends_at, sunrise_count }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::AnalyticEphemeris;
    use crate::solver::BoundarySolver;
    use chrono::{Datelike, TimeZone, Utc};
    use parva_types::{NEPAL_UTC_OFFSET_MINUTES, Paksha, time::civil_offset};

    fn sky(eph: &AnalyticEphemeris) -> Sky<'_> {
        Sky::new(eph, BoundarySolver::default())
    }

    #[test]
    fn test_bounds_contain_instant() {
        let eph = AnalyticEphemeris::default();
        let sky = sky(&eph);
        let t = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let (start, end) = tithi_bounds(&sky, t).unwrap();
        assert!(start <= t && t < end);
        let hours = (end - start).num_minutes() as f64 / 60.0;
        assert!((19.0..=27.0).contains(&hours), "tithi lasted {} h", hours);
        assert!(tithi_at(&sky, start).unwrap().same_as(&tithi_at(&sky, t).unwrap()));
        assert!(!tithi_at(&sky, end).unwrap().same_as(&tithi_at(&sky, t).unwrap()));
    }

    #[test]
    fn test_full_moon_is_purnima() {
        // Full moon 2025-03-14 06:55 UTC (lunar eclipse).
        let eph = AnalyticEphemeris::default();
        let t = Utc.with_ymd_and_hms(2025, 3, 14, 5, 0, 0).unwrap();
        let tithi = tithi_at(&sky(&eph), t).unwrap();
        assert_eq!((tithi.display_number, tithi.paksha), (15, Paksha::Shukla));
    }

    #[test]
    fn test_udaya_tithi_is_tithi_at_sunrise() {
        let eph = AnalyticEphemeris::default();
        let sky = sky(&eph);
        let date = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
        let udaya = udaya_tithi(&sky, date, GeoCoordinate::KATHMANDU).unwrap();
        assert!(udaya.sunrise < udaya.next_sunrise);
        assert!(udaya.ends_at > udaya.sunrise);
        assert!(udaya.tithi.same_as(&tithi_at(&sky, udaya.sunrise).unwrap()));
        assert_eq!(udaya.is_vriddhi, udaya.ends_at > udaya.next_sunrise);
    }

    #[test]
    fn test_vriddhi_and_ksheepana_over_a_year() {
        let eph = AnalyticEphemeris::default();
        let sky = sky(&eph);
        let mut date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let (mut vriddhi, mut ksheepana) = (0, 0);
        let mut previous: Option<UdayaTithi> = None;
        for _ in 0..120 {
            let today = udaya_tithi(&sky, date, GeoCoordinate::KATHMANDU).unwrap();
            if let Some(prev) = previous {
                if prev.is_vriddhi {
                    vriddhi += 1;
                    assert!(today.tithi.same_as(&prev.tithi));
                }
                if let Some(lost) = prev.skipped {
                    ksheepana += 1;
                    assert!(!today.tithi.same_as(&lost));
                    assert!(today.tithi.same_as(&lost.next()));
                }
            }
            previous = Some(today);
            date = date.succ_opt().unwrap();
        }
        // Roughly one of each per fortnight.
        assert!(vriddhi > 0 && ksheepana > 0, "vriddhi {} ksheepana {}", vriddhi, ksheepana);
    }

    #[test]
    fn test_find_next_tithi_lands_on_start() {
        let eph = AnalyticEphemeris::default();
        let sky = sky(&eph);
        let after = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        let dashami = Tithi::from_paksha(Paksha::Shukla, 10).unwrap();
        let t = find_next_tithi(&sky, dashami, after, 32).unwrap();
        assert!(t > after);
        assert!(tithi_at(&sky, t).unwrap().same_as(&dashami));
        assert!(!tithi_at(&sky, t - Duration::minutes(1)).unwrap().same_as(&dashami));
    }

    #[test]
    fn test_tithi_in_window_outside_is_none() {
        let eph = AnalyticEphemeris::default();
        let sky = sky(&eph);
        let npt = civil_offset(NEPAL_UTC_OFFSET_MINUTES).unwrap();
        let start = Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap();
        let purnima = Tithi::from_paksha(Paksha::Shukla, 15).unwrap();
        let hit = tithi_in_window(&sky, purnima, start, start + Duration::days(30), GeoCoordinate::KATHMANDU, npt)
            .unwrap()
            .unwrap();
        assert_eq!(hit.date.month(), 9);
        assert!(hit.sunrise_count <= 2);
        let miss = tithi_in_window(&sky, purnima, start, start + Duration::days(2), GeoCoordinate::KATHMANDU, npt)
            .unwrap();
        assert!(miss.is_none());
    }
}
