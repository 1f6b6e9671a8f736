//! The official Bikram Sambat month-length table.

use chrono::{Days, NaiveDate};
use parva_types::{BsDate, ParvaError};
use serde::Deserialize;
use std::collections::BTreeMap;

const BUNDLED_TABLE: &str = include_str!("../data/bs_calendar.json");

#[derive(Debug, Deserialize)]
struct RawTable {
    #[serde(default)]
    source: Option<String>,
    reference: RawReference,
    years: BTreeMap<i32, [u8; 12]>,
}

#[derive(Debug, Deserialize)]
struct RawReference {
    bs_year: i32,
    gregorian: NaiveDate,
}

/// One BS year of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsYear {
    pub year: i32,
    /// Gregorian date of 1 Baishakh.
    pub start: NaiveDate,
    pub month_lengths: [u8; 12],
}

impl BsYear {
    pub fn total_days(&self) -> u32 {
        self.month_lengths.iter().map(|&d| u32::from(d)).sum()
    }

    /// Gregorian date of day 1 of `month` (1..=12).
    pub fn month_start(&self, month: u8) -> Option<NaiveDate> {
        let before: u32 = self.month_lengths.get(..usize::from(month).checked_sub(1)?)?.iter().map(|&d| u32::from(d)).sum();
        self.start.checked_add_days(Days::new(u64::from(before)))
    }

    /// Last day of the year.
    pub fn end(&self) -> Option<NaiveDate> {
        self.start.checked_add_days(Days::new(u64::from(self.total_days()) - 1))
    }
}

/// Immutable snapshot of the official calendar.
///
/// Years are contiguous; each starts the day after the previous one ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BsCalendarTable {
    years: Vec<BsYear>,
    source: Option<String>,
}

impl BsCalendarTable {
    /// The table compiled into the crate (BS 2070-2095).
    pub fn bundled() -> Result<Self, ParvaError> {
        Self::from_json_str(BUNDLED_TABLE)
    }

    /// Parses a table of `{"reference": {..}, "years": {"2080": [31, ..]}}`.
    pub fn from_json_str(json: &str) -> Result<Self, ParvaError> {
        let raw: RawTable = serde_json::from_str(json)
            .map_err(|e| ParvaError::invalid_input(format!("BS table: {}", e)))?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawTable) -> Result<Self, ParvaError> {
        let (&first, &last) = match (raw.years.keys().next(), raw.years.keys().next_back()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Err(ParvaError::invalid_input("BS table is empty")),
        };
        if usize::try_from(last - first + 1).ok() != Some(raw.years.len()) {
            return Err(ParvaError::invalid_input(format!("BS table years {}..={} are not contiguous", first, last)));
        }
        for (year, lengths) in &raw.years {
            if let Some(bad) = lengths.iter().find(|d| !(29..=32).contains(*d)) {
                return Err(ParvaError::invalid_input(format!("BS {} has a {}-day month", year, bad)));
            }
        }
        let reference = raw.reference.bs_year;
        if !raw.years.contains_key(&reference) {
            return Err(ParvaError::invalid_input(format!("reference year {} not in table", reference)));
        }

        // Walk back from the reference to find where the first year starts.
        let days_before: u64 = raw
            .years
            .range(first..reference)
            .map(|(_, l)| l.iter().map(|&d| u64::from(d)).sum::<u64>())
            .sum();
        let mut start = raw
            .reference
            .gregorian
            .checked_sub_days(Days::new(days_before))
            .ok_or_else(|| ParvaError::invalid_input("BS table start not representable"))?;

        let mut years = Vec::with_capacity(raw.years.len());
        for (year, month_lengths) in raw.years {
            let entry = BsYear { year, start, month_lengths };
            start = start
                .checked_add_days(Days::new(u64::from(entry.total_days())))
                .ok_or_else(|| ParvaError::invalid_input("BS table end not representable"))?;
            years.push(entry);
        }
        Ok(Self { years, source: raw.source })
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn first_year(&self) -> i32 {
        self.years.first().map_or(0, |y| y.year)
    }

    pub fn last_year(&self) -> i32 {
        self.years.last().map_or(0, |y| y.year)
    }

    pub fn covers_year(&self, year: i32) -> bool {
        (self.first_year()..=self.last_year()).contains(&year)
    }

    pub fn year(&self, year: i32) -> Option<&BsYear> {
        let index = usize::try_from(year - self.first_year()).ok()?;
        self.years.get(index)
    }

    /// First Gregorian day covered.
    pub fn first_day(&self) -> Option<NaiveDate> {
        self.years.first().map(|y| y.start)
    }

    /// Last Gregorian day covered.
    pub fn last_day(&self) -> Option<NaiveDate> {
        self.years.last().and_then(BsYear::end)
    }

    pub fn covers_date(&self, date: NaiveDate) -> bool {
        matches!((self.first_day(), self.last_day()), (Some(f), Some(l)) if f <= date && date <= l)
    }

    /// Month length, `None` outside the table.
    pub fn days_in_month(&self, year: i32, month: u8) -> Option<u8> {
        self.year(year)?.month_lengths.get(usize::from(month).checked_sub(1)?).copied()
    }

    /// Gregorian to BS, `None` outside the table.
    pub fn to_bs(&self, date: NaiveDate) -> Option<BsDate> {
        if !self.covers_date(date) {
            return None;
        }
        let index = self.years.partition_point(|y| y.start <= date).checked_sub(1)?;
        let entry = &self.years[index];
        let mut remaining = (date - entry.start).num_days();
        for (i, &len) in entry.month_lengths.iter().enumerate() {
            let len = i64::from(len);
            if remaining < len {
                return Some(BsDate::new(entry.year, i as u8 + 1, remaining as u8 + 1));
            }
            remaining -= len;
        }
        None
    }

    /// BS to Gregorian. `Ok(None)` when the year is outside the table.
    ///
    /// # Errors
    /// `InvalidBsDate` when the day exceeds the month length.
    pub fn to_gregorian(&self, bs: BsDate) -> Result<Option<NaiveDate>, ParvaError> {
        let Some(entry) = self.year(bs.year) else {
            return Ok(None);
        };
        let max_day = self.days_in_month(bs.year, bs.month).ok_or_else(|| {
            ParvaError::invalid_input(format!("BS month {} outside 1..=12", bs.month))
        })?;
        if bs.day == 0 || bs.day > max_day {
            return Err(ParvaError::InvalidBsDate { year: bs.year, month: bs.month, day: bs.day, max_day });
        }
        let date = entry
            .month_start(bs.month)
            .and_then(|d| d.checked_add_days(Days::new(u64::from(bs.day) - 1)))
            .ok_or_else(|| ParvaError::invalid_input(format!("BS date {} not representable", bs)))?;
        Ok(Some(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bundled_bounds() {
        let table = BsCalendarTable::bundled().unwrap();
        assert_eq!((table.first_year(), table.last_year()), (2070, 2095));
        assert_eq!(table.year(2080).unwrap().start, ymd(2023, 4, 14));
        assert_eq!(table.first_day(), Some(ymd(2013, 4, 13)));
        assert_eq!(table.last_day(), Some(ymd(2039, 4, 14)));
    }

    #[test]
    fn test_known_conversion() {
        let table = BsCalendarTable::bundled().unwrap();
        assert_eq!(table.to_bs(ymd(2026, 2, 15)), Some(BsDate::new(2082, 11, 3)));
        assert_eq!(table.to_gregorian(BsDate::new(2082, 11, 3)).unwrap(), Some(ymd(2026, 2, 15)));
        assert_eq!(table.year(2083).unwrap().start, ymd(2026, 4, 14));
    }

    #[test]
    fn test_month_edges() {
        let table = BsCalendarTable::bundled().unwrap();
        // Last day of Chaitra 2082 then 1 Baishakh 2083.
        assert_eq!(table.to_bs(ymd(2026, 4, 13)), Some(BsDate::new(2082, 12, 30)));
        assert_eq!(table.to_bs(ymd(2026, 4, 14)), Some(BsDate::new(2083, 1, 1)));
        assert_eq!(table.to_bs(ymd(2013, 4, 12)), None);
        assert_eq!(table.to_bs(ymd(2039, 4, 15)), None);
    }

    #[test]
    fn test_day_past_month_end() {
        let table = BsCalendarTable::bundled().unwrap();
        let err = table.to_gregorian(BsDate::new(2082, 1, 32)).unwrap_err();
        assert_eq!(err, ParvaError::InvalidBsDate { year: 2082, month: 1, day: 32, max_day: 31 });
        assert_eq!(table.to_gregorian(BsDate::new(2100, 1, 1)).unwrap(), None);
    }

    #[test]
    fn test_rejects_gap_and_bad_length() {
        let gap = r#"{"reference": {"bs_year": 2080, "gregorian": "2023-04-14"},
            "years": {"2080": [31,31,32,31,31,31,30,29,30,29,30,30],
                      "2082": [31,32,31,32,31,30,30,29,30,29,30,30]}}"#;
        assert!(BsCalendarTable::from_json_str(gap).is_err());
        let short = r#"{"reference": {"bs_year": 2080, "gregorian": "2023-04-14"},
            "years": {"2080": [31,31,32,31,31,31,30,28,30,29,30,30]}}"#;
        assert!(BsCalendarTable::from_json_str(short).is_err());
    }
}
