use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::bs::BsMonth;
use crate::error::ParvaError;
use crate::panchanga::Rashi;
use crate::time::Instant;

/// The Sun's ingress into a sidereal sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SankrantiEvent {
    /// Sign being entered.
    pub rashi: Rashi,
    pub instant: Instant,
    /// BS month this ingress opens.
    pub bs_month: BsMonth,
    /// Civil date of the ingress at the reference location.
    pub civil_date: NaiveDate,
}

impl fmt::Display for SankrantiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Sankranti at {}", self.rashi, self.instant.format("%Y-%m-%d %H:%M UTC"))
    }
}

/// One Amavasya-to-Amavasya window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LunarMonth {
    /// Amavasya opening the month.
    pub start: Instant,
    /// Next Amavasya (exclusive).
    pub end: Instant,
    pub purnima: Instant,
    /// Sidereal sign of the Sun at the Purnima, 1 (Mesha) ..= 12 (Meena).
    pub solar_sign_at_purnima: u8,
    /// Number of sankrantis inside `[start, end)`.
    pub sankranti_count: u8,
    /// Base month name.
    pub month: BsMonth,
    /// Display label, `Adhik <name>` for intercalary months.
    pub name: String,
    pub is_adhik: bool,
}

impl LunarMonth {
    pub fn contains(&self, instant: Instant) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn length_days(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 86_400.0
    }
}

impl fmt::Display for LunarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} to {})",
            self.name,
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Consecutive lunar months covering one Gregorian year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LunarYear {
    pub gregorian_year: i32,
    pub months: SmallVec<[LunarMonth; 14]>,
}

impl LunarYear {
    pub fn has_adhik(&self) -> bool {
        self.months.iter().any(|m| m.is_adhik)
    }

    pub fn adhik_month(&self) -> Option<&LunarMonth> {
        self.months.iter().find(|m| m.is_adhik)
    }

    pub fn month_containing(&self, instant: Instant) -> Option<&LunarMonth> {
        self.months.iter().find(|m| m.contains(instant))
    }

    /// Months with base name `month` admitted by `policy`, in order.
    pub fn months_named(&self, month: BsMonth, policy: AdhikPolicy) -> impl Iterator<Item = &LunarMonth> {
        self.months
            .iter()
            .filter(move |m| m.month == month && policy.admits(m.is_adhik))
    }
}

/// Treatment of intercalary months when a rule names a lunar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdhikPolicy {
    /// Only the regular (nija) month.
    #[default]
    Skip,
    /// Either month; the earliest qualifying date wins.
    #[serde(alias = "both")]
    Include,
    /// Only the intercalary month.
    #[serde(alias = "use_adhik")]
    Only,
}

impl AdhikPolicy {
    pub fn admits(&self, is_adhik: bool) -> bool {
        match self {
            AdhikPolicy::Skip => !is_adhik,
            AdhikPolicy::Include => true,
            AdhikPolicy::Only => is_adhik,
        }
    }
}

impl FromStr for AdhikPolicy {
    type Err = ParvaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "skip" => Ok(AdhikPolicy::Skip),
            "include" | "both" => Ok(AdhikPolicy::Include),
            "only" | "use_adhik" => Ok(AdhikPolicy::Only),
            other => Err(ParvaError::invalid_input(format!("unknown adhik policy '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn month(start_day: u32, end_day: u32, name: BsMonth, adhik: bool) -> LunarMonth {
        LunarMonth {
            start: Utc.with_ymd_and_hms(2026, 5, start_day, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 5, end_day, 0, 0, 0).unwrap(),
            purnima: Utc.with_ymd_and_hms(2026, 5, start_day + 1, 0, 0, 0).unwrap(),
            solar_sign_at_purnima: 2,
            sankranti_count: if adhik { 0 } else { 1 },
            month: name,
            name: if adhik { format!("Adhik {}", name) } else { name.to_string() },
            is_adhik: adhik,
        }
    }

    #[test]
    fn test_policy_admits() {
        assert!(AdhikPolicy::Skip.admits(false));
        assert!(!AdhikPolicy::Skip.admits(true));
        assert!(AdhikPolicy::Include.admits(true));
        assert!(!AdhikPolicy::Only.admits(false));
        assert_eq!("use_adhik".parse::<AdhikPolicy>().unwrap(), AdhikPolicy::Only);
        assert_eq!("both".parse::<AdhikPolicy>().unwrap(), AdhikPolicy::Include);
    }

    #[test]
    fn test_months_named_respects_policy() {
        let year = LunarYear {
            gregorian_year: 2026,
            months: smallvec::smallvec![
                month(1, 10, BsMonth::Jestha, true),
                month(10, 20, BsMonth::Jestha, false),
            ],
        };
        assert!(year.has_adhik());
        let nija: Vec<_> = year.months_named(BsMonth::Jestha, AdhikPolicy::Skip).collect();
        assert_eq!(nija.len(), 1);
        assert!(!nija[0].is_adhik);
        assert_eq!(year.months_named(BsMonth::Jestha, AdhikPolicy::Include).count(), 2);
        assert_eq!(year.adhik_month().map(|m| m.name.as_str()), Some("Adhik Jestha"));
    }

    #[test]
    fn test_policy_serde_aliases() {
        let p: AdhikPolicy = serde_json::from_str("\"use_adhik\"").unwrap();
        assert_eq!(p, AdhikPolicy::Only);
        assert_eq!(serde_json::to_string(&AdhikPolicy::Include).unwrap(), "\"include\"");
    }
}
