//! Lazy day-by-day panchanga.

use chrono::NaiveDate;
use parva_types::{GeoCoordinate, Panchanga, ParvaError};

use crate::engine::Parva;

/// Iterator over daily panchangas for an inclusive date range.
///
/// Each item is computed on demand; an error for one day does not stop the
/// days after it.
#[derive(Debug, Clone)]
pub struct PanchangaRange<'a> {
    parva: &'a Parva,
    current: Option<NaiveDate>,
    end: NaiveDate,
    coord: GeoCoordinate,
}

impl<'a> PanchangaRange<'a> {
    pub(crate) fn new(parva: &'a Parva, start: NaiveDate, end: NaiveDate, coord: GeoCoordinate) -> Self {
        Self { parva, current: Some(start), end, coord }
    }
}

impl Iterator for PanchangaRange<'_> {
    type Item = Result<Panchanga, ParvaError>;

    fn next(&mut self) -> Option<Self::Item> {
        let date = self.current.filter(|d| *d <= self.end)?;
        self.current = date.succ_opt();
        Some(self.parva.panchanga_at(date, self.coord))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .current
            .map_or(0, |d| usize::try_from((self.end - d).num_days() + 1).unwrap_or(0));
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PanchangaRange<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_range_is_inclusive_and_lazy() {
        let parva = Parva::new().unwrap();
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let range = parva.panchanga_range(start, start + Duration::days(6), GeoCoordinate::KATHMANDU);
        assert_eq!(range.len(), 7);

        let days: Vec<Panchanga> = range.map(|p| p.unwrap()).collect();
        assert_eq!(days.len(), 7);
        for pair in days.windows(2) {
            assert_eq!(pair[1].date, pair[0].date.succ_opt().unwrap());
            assert_ne!(pair[0].vaara, pair[1].vaara);
        }
    }

    #[test]
    fn test_empty_and_invalid() {
        let parva = Parva::new().unwrap();
        let start = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(parva.panchanga_range(start, end, GeoCoordinate::KATHMANDU).count(), 0);

        let nowhere = GeoCoordinate::new(120.0, 0.0);
        let mut bad = parva.panchanga_range(end, end, nowhere);
        assert!(bad.next().unwrap().is_err());
        assert!(bad.next().is_none());
    }
}
