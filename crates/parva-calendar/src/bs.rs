//! Gregorian <-> Bikram Sambat conversion.
//!
//! Inside the official table the answer is a lookup. Outside it, month
//! starts are derived from the sidereal sankrantis at the reference location
//! and the result is tagged [`ConversionConfidence::Estimated`]. The switch
//! is decided by the date alone.

use chrono::{Datelike, Days, FixedOffset, NaiveDate};
use parva_types::{
    BsDate, BsMonth, ConversionConfidence, GeoCoordinate, NEPAL_UTC_OFFSET_MINUTES, ParvaError, SankrantiEvent,
    time::{civil_date, civil_offset},
};
use parva_astronomy::{Sky, sankranti};
use tracing::debug;

use crate::table::BsCalendarTable;

/// Days the sankranti model may differ from a published calendar.
pub const ESTIMATED_ERROR_BOUND_DAYS: u8 = 1;
/// Default reach of the model on either side of the table.
pub const DEFAULT_ESTIMATED_SPAN_YEARS: u16 = 200;

const ESTIMATED: ConversionConfidence = ConversionConfidence::Estimated { error_bound_days: ESTIMATED_ERROR_BOUND_DAYS };

/// Twelve month starts plus the start of the following year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ModelYear {
    year: i32,
    starts: [NaiveDate; 13],
}

impl ModelYear {
    fn month_length(&self, month: u8) -> u8 {
        let i = usize::from(month - 1);
        (self.starts[i + 1] - self.starts[i]).num_days() as u8
    }

    fn locate(&self, date: NaiveDate) -> Option<BsDate> {
        let i = self.starts.partition_point(|s| *s <= date).checked_sub(1)?;
        if i >= 12 {
            return None;
        }
        let day = (date - self.starts[i]).num_days() as u8 + 1;
        Some(BsDate::new(self.year, i as u8 + 1, day))
    }
}

/// BS converter over an official table and a position provider.
#[derive(Debug, Clone, Copy)]
pub struct BsConverter<'a> {
    table: &'a BsCalendarTable,
    sky: Sky<'a>,
    reference: GeoCoordinate,
    civil: FixedOffset,
    estimated_span_years: u16,
}

impl<'a> BsConverter<'a> {
    /// Converter anchored at Kathmandu in Nepal Standard Time.
    pub fn new(table: &'a BsCalendarTable, sky: Sky<'a>) -> Result<Self, ParvaError> {
        Ok(Self {
            table,
            sky,
            reference: GeoCoordinate::KATHMANDU,
            civil: civil_offset(NEPAL_UTC_OFFSET_MINUTES)?,
            estimated_span_years: DEFAULT_ESTIMATED_SPAN_YEARS,
        })
    }

    pub fn with_reference(mut self, reference: GeoCoordinate, civil: FixedOffset) -> Self {
        self.reference = reference;
        self.civil = civil;
        self
    }

    pub fn with_estimated_span(mut self, years: u16) -> Self {
        self.estimated_span_years = years;
        self
    }

    pub fn table(&self) -> &'a BsCalendarTable {
        self.table
    }

    /// Confidence attached to anything in BS `year`.
    pub fn confidence_for_year(&self, year: i32) -> ConversionConfidence {
        if self.table.covers_year(year) { ConversionConfidence::Official } else { ESTIMATED }
    }

    /// Gregorian date to BS.
    ///
    /// # Errors
    /// `DateOutOfRange` beyond the estimated span.
    pub fn gregorian_to_bs(&self, date: NaiveDate) -> Result<(BsDate, ConversionConfidence), ParvaError> {
        if let Some(bs) = self.table.to_bs(date) {
            return Ok((bs, ConversionConfidence::Official));
        }
        self.check_date_span(date)?;

        // Mesh falls in mid-April, so the BS year is greg + 57 after it.
        let guess = date.year() + 57;
        for year in [guess, guess - 1] {
            if self.table.covers_year(year) {
                continue;
            }
            if let Some(bs) = self.model_year(year)?.locate(date) {
                debug!(%date, %bs, "estimated BS conversion");
                return Ok((bs, ESTIMATED));
            }
        }
        Err(ParvaError::invalid_input(format!("no BS year located for {}", date)))
    }

    /// BS date to Gregorian.
    ///
    /// # Errors
    /// `InvalidBsDate` when the day exceeds the month length, `InvalidInput`
    /// for a year beyond the estimated span.
    pub fn bs_to_gregorian(&self, bs: BsDate) -> Result<NaiveDate, ParvaError> {
        self.bs_to_gregorian_with_confidence(bs).map(|(d, _)| d)
    }

    pub fn bs_to_gregorian_with_confidence(&self, bs: BsDate) -> Result<(NaiveDate, ConversionConfidence), ParvaError> {
        let bs = BsDate::try_new(bs.year, bs.month, bs.day)?;
        if let Some(date) = self.table.to_gregorian(bs)? {
            return Ok((date, ConversionConfidence::Official));
        }
        self.check_year_span(bs.year)?;
        let model = self.model_year(bs.year)?;
        let max_day = model.month_length(bs.month);
        if bs.day > max_day {
            return Err(ParvaError::InvalidBsDate { year: bs.year, month: bs.month, day: bs.day, max_day });
        }
        let date = model.starts[usize::from(bs.month - 1)]
            .checked_add_days(Days::new(u64::from(bs.day) - 1))
            .ok_or_else(|| ParvaError::invalid_input(format!("BS date {} not representable", bs)))?;
        debug!(%bs, %date, "estimated Gregorian conversion");
        Ok((date, ESTIMATED))
    }

    /// Length of a BS month in either mode.
    pub fn days_in_month(&self, year: i32, month: u8) -> Result<u8, ParvaError> {
        BsMonth::from_number(month)?;
        if let Some(days) = self.table.days_in_month(year, month) {
            return Ok(days);
        }
        self.check_year_span(year)?;
        Ok(self.model_year(year)?.month_length(month))
    }

    /// Gregorian date of 1 Baishakh.
    pub fn year_start(&self, year: i32) -> Result<NaiveDate, ParvaError> {
        self.month_start(year, 1).map(|(d, _)| d)
    }

    /// Gregorian date of day 1 of a BS month.
    pub fn month_start(&self, year: i32, month: u8) -> Result<(NaiveDate, ConversionConfidence), ParvaError> {
        self.bs_to_gregorian_with_confidence(BsDate::try_new(year, month, 1)?)
    }

    /// Civil start of the month opened by a sankranti: the sankranti's date
    /// if it happens by sunrise, otherwise the following day.
    pub fn sankranti_month_start(&self, ev: &SankrantiEvent) -> Result<NaiveDate, ParvaError> {
        let date = civil_date(ev.instant, self.civil);
        let sunrise = self.sky.provider.sunrise(date, self.reference)?;
        if ev.instant <= sunrise {
            Ok(date)
        } else {
            date.succ_opt()
                .ok_or_else(|| ParvaError::invalid_input(format!("no day after {}", date)))
        }
    }

    fn model_year(&self, year: i32) -> Result<ModelYear, ParvaError> {
        let mesh = sankranti::mesh_sankranti(&self.sky, year - 57)?;
        let mut starts = [self.sankranti_month_start(&mesh)?; 13];
        let mut after = mesh.instant;
        for slot in starts.iter_mut().skip(1) {
            let ev = sankranti::next_sankranti(&self.sky, after)?;
            *slot = self.sankranti_month_start(&ev)?;
            after = ev.instant;
        }

        // Years touching the table share its edge days exactly.
        if year + 1 == self.table.first_year() {
            if let Some(first) = self.table.first_day() {
                starts[12] = first;
            }
        }
        if year - 1 == self.table.last_year() {
            if let Some(last) = self.table.last_day().and_then(|d| d.succ_opt()) {
                starts[0] = last;
            }
        }
        Ok(ModelYear { year, starts })
    }

    fn year_bounds(&self) -> (i32, i32) {
        let span = i32::from(self.estimated_span_years);
        (self.table.first_year() - span, self.table.last_year() + span)
    }

    /// # Errors
    /// `InvalidInput` for a BS year beyond the estimated span.
    pub fn check_year_span(&self, year: i32) -> Result<(), ParvaError> {
        let (min, max) = self.year_bounds();
        if (min..=max).contains(&year) {
            return Ok(());
        }
        Err(ParvaError::invalid_input(format!("BS year {} outside supported {}..={}", year, min, max)))
    }

    fn check_date_span(&self, date: NaiveDate) -> Result<(), ParvaError> {
        let (min_year, max_year) = self.year_bounds();
        // Approximate Gregorian edges; 1 Baishakh falls near 14 April.
        let min = NaiveDate::from_ymd_opt(min_year - 57, 4, 20);
        let max = NaiveDate::from_ymd_opt(max_year - 56, 4, 10);
        match (min, max) {
            (Some(min), Some(max)) if min <= date && date <= max => Ok(()),
            (Some(min), Some(max)) => Err(ParvaError::DateOutOfRange { date, min, max }),
            _ => Err(ParvaError::invalid_input(format!("date {} not representable", date))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parva_astronomy::{AnalyticEphemeris, BoundarySolver};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn with_converter(f: impl FnOnce(BsConverter<'_>)) {
        let table = BsCalendarTable::bundled().unwrap();
        let eph = AnalyticEphemeris::default();
        let sky = Sky::new(&eph, BoundarySolver::default());
        f(BsConverter::new(&table, sky).unwrap());
    }

    #[test]
    fn test_official_conversion() {
        with_converter(|c| {
            let (bs, conf) = c.gregorian_to_bs(ymd(2026, 2, 15)).unwrap();
            assert_eq!(bs, BsDate::new(2082, 11, 3));
            assert_eq!(conf, ConversionConfidence::Official);
            assert_eq!(c.bs_to_gregorian(bs).unwrap(), ymd(2026, 2, 15));
        });
    }

    #[test]
    fn test_estimated_round_trip() {
        with_converter(|c| {
            let date = ymd(2045, 8, 20);
            let (bs, conf) = c.gregorian_to_bs(date).unwrap();
            assert_eq!(conf, ESTIMATED);
            assert_eq!((bs.year, bs.month), (2102, 5));
            let (back, conf) = c.bs_to_gregorian_with_confidence(bs).unwrap();
            assert_eq!(back, date);
            assert_eq!(conf.error_bound_days(), 1);
        });
    }

    #[test]
    fn test_modes_meet_without_gap() {
        with_converter(|c| {
            let (before, conf) = c.gregorian_to_bs(ymd(2013, 4, 12)).unwrap();
            assert!(!conf.is_official());
            assert_eq!(before.year, 2069);
            assert_eq!(before.month, 12);
            assert_eq!(c.days_in_month(2069, 12).unwrap(), before.day);

            let (after, conf) = c.gregorian_to_bs(ymd(2039, 4, 15)).unwrap();
            assert!(!conf.is_official());
            assert_eq!(after, BsDate::new(2096, 1, 1));
        });
    }

    #[test]
    fn test_estimated_month_lengths_are_plausible() {
        with_converter(|c| {
            let total: u32 = (1..=12).map(|m| u32::from(c.days_in_month(2110, m).unwrap())).sum();
            assert!((365..=366).contains(&total), "year of {} days", total);
            for m in 1..=12 {
                assert!((29..=32).contains(&c.days_in_month(2110, m).unwrap()));
            }
        });
    }

    #[test]
    fn test_out_of_span() {
        with_converter(|c| {
            let err = c.gregorian_to_bs(ymd(1500, 1, 1)).unwrap_err();
            assert!(matches!(err, ParvaError::DateOutOfRange { .. }));
            assert!(c.year_start(2400).is_err());
            let narrow = c.with_estimated_span(0);
            assert!(narrow.gregorian_to_bs(ymd(2045, 1, 1)).is_err());
        });
    }

    #[test]
    fn test_invalid_day_in_month() {
        with_converter(|c| {
            let err = c.bs_to_gregorian(BsDate::new(2082, 11, 31)).unwrap_err();
            assert!(matches!(err, ParvaError::InvalidBsDate { max_day: 30, .. }));
            assert!(c.bs_to_gregorian(BsDate::new(2082, 13, 1)).is_err());
        });
    }
}
