//! Bikram Sambat dates and conversion confidence.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParvaError;

/// The twelve solar months of the Bikram Sambat year.
///
/// Lunar months reuse these names, so `Shrawan` is both the solar month and
/// the lunar month in which the Sun enters Simha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BsMonth {
    Baishakh,
    Jestha,
    Ashadh,
    Shrawan,
    Bhadra,
    Ashwin,
    Kartik,
    Mangsir,
    Poush,
    Magh,
    Falgun,
    Chaitra,
}

impl BsMonth {
    pub const ALL: [BsMonth; 12] = [
        BsMonth::Baishakh, BsMonth::Jestha, BsMonth::Ashadh, BsMonth::Shrawan,
        BsMonth::Bhadra, BsMonth::Ashwin, BsMonth::Kartik, BsMonth::Mangsir,
        BsMonth::Poush, BsMonth::Magh, BsMonth::Falgun, BsMonth::Chaitra,
    ];

    /// 1 for Baishakh through 12 for Chaitra.
    pub fn number(&self) -> u8 {
        *self as u8 + 1
    }

    pub fn from_number(month: u8) -> Result<Self, ParvaError> {
        if !(1..=12).contains(&month) {
            return Err(ParvaError::invalid_input(format!("BS month {} outside 1..=12", month)));
        }
        Ok(Self::ALL[(month - 1) as usize])
    }

    pub fn name(&self) -> &'static str {
        match self {
            BsMonth::Baishakh => "Baishakh",
            BsMonth::Jestha => "Jestha",
            BsMonth::Ashadh => "Ashadh",
            BsMonth::Shrawan => "Shrawan",
            BsMonth::Bhadra => "Bhadra",
            BsMonth::Ashwin => "Ashwin",
            BsMonth::Kartik => "Kartik",
            BsMonth::Mangsir => "Mangsir",
            BsMonth::Poush => "Poush",
            BsMonth::Magh => "Magh",
            BsMonth::Falgun => "Falgun",
            BsMonth::Chaitra => "Chaitra",
        }
    }

    pub fn nepali_name(&self) -> &'static str {
        match self {
            BsMonth::Baishakh => "बैशाख",
            BsMonth::Jestha => "जेठ",
            BsMonth::Ashadh => "असार",
            BsMonth::Shrawan => "साउन",
            BsMonth::Bhadra => "भदौ",
            BsMonth::Ashwin => "असोज",
            BsMonth::Kartik => "कात्तिक",
            BsMonth::Mangsir => "मंसिर",
            BsMonth::Poush => "पुस",
            BsMonth::Magh => "माघ",
            BsMonth::Falgun => "फागुन",
            BsMonth::Chaitra => "चैत",
        }
    }

    /// Month `n` places later, wrapping Chaitra to Baishakh.
    pub fn offset(&self, n: i32) -> Self {
        Self::ALL[(i32::from(*self as u8) + n).rem_euclid(12) as usize]
    }
}

impl fmt::Display for BsMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for BsMonth {
    type Err = ParvaError;

    /// Accepts the canonical names, common transliterations and Sanskrit
    /// lunar month names, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let month = match s.trim().to_ascii_lowercase().as_str() {
            "baishakh" | "baisakh" | "vaishakh" | "vaishakha" => BsMonth::Baishakh,
            "jestha" | "jeth" | "jyeshtha" | "jyaistha" => BsMonth::Jestha,
            "ashadh" | "asar" | "ashadha" | "asadha" => BsMonth::Ashadh,
            "shrawan" | "shravan" | "shravana" | "saun" => BsMonth::Shrawan,
            "bhadra" | "bhadau" | "bhadrapada" => BsMonth::Bhadra,
            "ashwin" | "asoj" | "ashvin" | "ashwina" => BsMonth::Ashwin,
            "kartik" | "kartika" | "kattik" => BsMonth::Kartik,
            "mangsir" | "margashirsha" | "marga" => BsMonth::Mangsir,
            "poush" | "push" | "pausha" => BsMonth::Poush,
            "magh" | "magha" => BsMonth::Magh,
            "falgun" | "phalgun" | "phalguna" | "fagun" => BsMonth::Falgun,
            "chaitra" | "chait" | "chaitr" => BsMonth::Chaitra,
            _ => return Err(ParvaError::invalid_input(format!("unknown month name '{}'", s))),
        };
        Ok(month)
    }
}

/// A Bikram Sambat calendar date.
///
/// Ordering is chronological. Validity against month lengths is checked by
/// the converter, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BsDate {
    pub year: i32,
    /// 1..=12.
    pub month: u8,
    /// 1..=32.
    pub day: u8,
}

impl BsDate {
    pub fn new(year: i32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Rejects months outside 1..=12 and days outside 1..=32.
    pub fn try_new(year: i32, month: u8, day: u8) -> Result<Self, ParvaError> {
        BsMonth::from_number(month)?;
        if !(1..=32).contains(&day) {
            return Err(ParvaError::invalid_input(format!("BS day {} outside 1..=32", day)));
        }
        Ok(Self { year, month, day })
    }

    pub fn bs_month(&self) -> Result<BsMonth, ParvaError> {
        BsMonth::from_number(self.month)
    }

    /// `3 Falgun 2082`.
    pub fn format_long(&self) -> String {
        match self.bs_month() {
            Ok(m) => format!("{} {} {}", self.day, m.name(), self.year),
            Err(_) => self.to_string(),
        }
    }

    /// `३ फागुन २०८२`.
    pub fn format_nepali(&self) -> String {
        match self.bs_month() {
            Ok(m) => format!(
                "{} {} {}",
                to_devanagari_digits(&self.day.to_string()),
                m.nepali_name(),
                to_devanagari_digits(&self.year.to_string())
            ),
            Err(_) => to_devanagari_digits(&self.to_string()),
        }
    }
}

impl fmt::Display for BsDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for BsDate {
    type Err = ParvaError;

    /// Parses `YYYY-MM-DD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParvaError::invalid_input(format!("malformed BS date '{}'", s));
        let mut parts = s.trim().splitn(3, '-');
        let year = parts.next().and_then(|p| p.parse::<i32>().ok()).ok_or_else(bad)?;
        let month = parts.next().and_then(|p| p.parse::<u8>().ok()).ok_or_else(bad)?;
        let day = parts.next().and_then(|p| p.parse::<u8>().ok()).ok_or_else(bad)?;
        Self::try_new(year, month, day)
    }
}

fn to_devanagari_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => char::from_u32(0x0966 + d).unwrap_or(c),
            None => c,
        })
        .collect()
}

/// Where a conversion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ConversionConfidence {
    /// Read from the authoritative table; exact.
    Official,
    /// Extrapolated from sankranti instants.
    Estimated { error_bound_days: u8 },
}

impl ConversionConfidence {
    pub fn is_official(&self) -> bool {
        matches!(self, ConversionConfidence::Official)
    }

    pub fn error_bound_days(&self) -> u8 {
        match self {
            ConversionConfidence::Official => 0,
            ConversionConfidence::Estimated { error_bound_days } => *error_bound_days,
        }
    }
}

impl fmt::Display for ConversionConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionConfidence::Official => write!(f, "official"),
            ConversionConfidence::Estimated { error_bound_days } => {
                write!(f, "estimated (+/- {} day)", error_bound_days)
            }
        }
    }
}
