//! Extension trait for `NaiveDate`.

use chrono::NaiveDate;
use parva_rules::RuleExecutionError;
use parva_types::{BsDate, ConversionConfidence, Panchanga, ParvaError, ResolvedOccurrence, UdayaTithi};

use crate::engine::Parva;

/// Days searched by `next_festival`.
const FESTIVAL_SEARCH_DAYS: u32 = 400;

/// Calendar lookups on a Gregorian date through an engine.
pub trait ParvaDateExt {
    /// BS date and the confidence of the conversion.
    fn to_bs(&self, parva: &Parva) -> Result<(BsDate, ConversionConfidence), ParvaError>;

    /// Panchanga at the engine's reference location.
    fn panchanga(&self, parva: &Parva) -> Result<Panchanga, ParvaError>;

    /// Udaya tithi at the engine's reference location.
    fn udaya_tithi(&self, parva: &Parva) -> Result<UdayaTithi, ParvaError>;

    /// Festivals in progress on this date.
    fn festivals(&self, parva: &Parva) -> Result<Vec<ResolvedOccurrence>, RuleExecutionError>;

    /// True if the festival is in progress on this date. Unknown or
    /// non-executable festivals are never in progress.
    fn is_festival(&self, parva: &Parva, festival_id: &str) -> bool;

    /// First festival starting after this date, within about a year.
    fn next_festival(&self, parva: &Parva) -> Option<ResolvedOccurrence>;
}

impl ParvaDateExt for NaiveDate {
    fn to_bs(&self, parva: &Parva) -> Result<(BsDate, ConversionConfidence), ParvaError> {
        parva.convert_gregorian_to_bs(*self)
    }

    fn panchanga(&self, parva: &Parva) -> Result<Panchanga, ParvaError> {
        parva.panchanga_at(*self, parva.config().reference)
    }

    fn udaya_tithi(&self, parva: &Parva) -> Result<UdayaTithi, ParvaError> {
        parva.udaya_tithi(*self, parva.config().reference)
    }

    fn festivals(&self, parva: &Parva) -> Result<Vec<ResolvedOccurrence>, RuleExecutionError> {
        parva.festivals_on(*self)
    }

    fn is_festival(&self, parva: &Parva, festival_id: &str) -> bool {
        use chrono::Datelike;
        [self.year(), self.year() - 1]
            .into_iter()
            .any(|year| parva.resolve_festival(festival_id, year).is_ok_and(|occ| occ.contains(*self)))
    }

    fn next_festival(&self, parva: &Parva) -> Option<ResolvedOccurrence> {
        let from = self.succ_opt()?;
        parva.upcoming_festivals(from, FESTIVAL_SEARCH_DAYS).ok()?.into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_trait() {
        let parva = Parva::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
        assert_eq!(date.to_bs(&parva).unwrap().0, BsDate::new(2082, 11, 3));
        assert_eq!(date.panchanga(&parva).unwrap().date, date);
        assert_eq!(date.udaya_tithi(&parva).unwrap().date, date);
    }

    #[test]
    fn test_festival_lookups() {
        let parva = Parva::new().unwrap();
        let dashain = NaiveDate::from_ymd_opt(2025, 10, 2).unwrap();
        assert!(dashain.is_festival(&parva, "dashain"));
        assert!(!dashain.is_festival(&parva, "no-such-festival"));
        assert!(dashain.festivals(&parva).unwrap().iter().any(|o| o.festival_id == "dashain"));

        let next = dashain.next_festival(&parva).unwrap();
        assert!(next.start_date > dashain);
    }
}
