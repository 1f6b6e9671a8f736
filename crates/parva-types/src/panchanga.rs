//! The five limbs of the panchanga plus the zodiac signs.

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::bs::BsMonth;
use crate::error::ParvaError;
use crate::position::normalize_degrees;
use crate::time::{GeoCoordinate, Instant};

/// Sun-Moon elongation covered by one tithi.
pub const TITHI_SPAN_DEG: f64 = 12.0;
/// Sidereal arc of one nakshatra or yoga (360 / 27).
pub const NAKSHATRA_SPAN_DEG: f64 = 360.0 / 27.0;
/// Elongation covered by one karana.
pub const KARANA_SPAN_DEG: f64 = 6.0;
/// Sidereal arc of one rashi.
pub const RASHI_SPAN_DEG: f64 = 30.0;

const TITHI_NAMES: [&str; 14] = [
    "Pratipada", "Dwitiya", "Tritiya", "Chaturthi", "Panchami", "Shashthi", "Saptami",
    "Ashtami", "Navami", "Dashami", "Ekadashi", "Dwadashi", "Trayodashi", "Chaturdashi",
];

const NAKSHATRA_NAMES: [&str; 27] = [
    "Ashwini", "Bharani", "Krittika", "Rohini", "Mrigashira", "Ardra", "Punarvasu",
    "Pushya", "Ashlesha", "Magha", "Purva Phalguni", "Uttara Phalguni", "Hasta",
    "Chitra", "Swati", "Vishakha", "Anuradha", "Jyeshtha", "Mula", "Purva Ashadha",
    "Uttara Ashadha", "Shravana", "Dhanishta", "Shatabhisha", "Purva Bhadrapada",
    "Uttara Bhadrapada", "Revati",
];

const YOGA_NAMES: [&str; 27] = [
    "Vishkumbha", "Priti", "Ayushman", "Saubhagya", "Shobhana", "Atiganda", "Sukarma",
    "Dhriti", "Shula", "Ganda", "Vriddhi", "Dhruva", "Vyaghata", "Harshana", "Vajra",
    "Siddhi", "Vyatipata", "Variyana", "Parigha", "Shiva", "Siddha", "Sadhya", "Shubha",
    "Shukla", "Brahma", "Indra", "Vaidhriti",
];

const MOVABLE_KARANAS: [&str; 7] = ["Bava", "Balava", "Kaulava", "Taitila", "Garija", "Vanija", "Vishti"];

/// Waxing or waning half of a lunar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Paksha {
    Shukla,
    Krishna,
}

impl fmt::Display for Paksha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Paksha::Shukla => "Shukla",
            Paksha::Krishna => "Krishna",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Paksha {
    type Err = ParvaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shukla" | "sukla" | "waxing" => Ok(Paksha::Shukla),
            "krishna" | "krsna" | "waning" => Ok(Paksha::Krishna),
            other => Err(ParvaError::invalid_input(format!("unknown paksha '{}'", other))),
        }
    }
}

/// Lunar day: one 12 degree step of Sun-Moon elongation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tithi {
    /// 1..=30 across the whole month.
    pub absolute_number: u8,
    /// 1..=15 within the paksha.
    pub display_number: u8,
    pub paksha: Paksha,
    /// Fraction of the tithi already elapsed, 0..1.
    pub progress: f64,
}

impl Tithi {
    /// Tithi for a Sun-Moon elongation in degrees.
    pub fn from_elongation(elongation: f64) -> Self {
        let e = normalize_degrees(elongation);
        let absolute = ((e / TITHI_SPAN_DEG).floor() as u8 + 1).min(30);
        let mut tithi = Self::from_absolute_unchecked(absolute);
        tithi.progress = (e % TITHI_SPAN_DEG) / TITHI_SPAN_DEG;
        tithi
    }

    /// Tithi from its 1..=30 number, at its start.
    pub fn from_absolute(absolute: u8) -> Result<Self, ParvaError> {
        if !(1..=30).contains(&absolute) {
            return Err(ParvaError::invalid_input(format!("tithi {} outside 1..=30", absolute)));
        }
        Ok(Self::from_absolute_unchecked(absolute))
    }

    /// Tithi from a paksha and a 1..=15 number.
    pub fn from_paksha(paksha: Paksha, display: u8) -> Result<Self, ParvaError> {
        if !(1..=15).contains(&display) {
            return Err(ParvaError::invalid_input(format!("paksha tithi {} outside 1..=15", display)));
        }
        let absolute = match paksha {
            Paksha::Shukla => display,
            Paksha::Krishna => display + 15,
        };
        Ok(Self::from_absolute_unchecked(absolute))
    }

    fn from_absolute_unchecked(absolute: u8) -> Self {
        let display = match absolute % 15 {
            0 => 15,
            d => d,
        };
        let paksha = if absolute <= 15 { Paksha::Shukla } else { Paksha::Krishna };
        Self { absolute_number: absolute, display_number: display, paksha, progress: 0.0 }
    }

    pub fn name(&self) -> &'static str {
        match (self.display_number, self.paksha) {
            (15, Paksha::Shukla) => "Purnima",
            (15, Paksha::Krishna) => "Amavasya",
            (d, _) => TITHI_NAMES[(d - 1) as usize],
        }
    }

    /// Elongation at which this tithi begins.
    pub fn start_elongation(&self) -> f64 {
        f64::from(self.absolute_number - 1) * TITHI_SPAN_DEG
    }

    /// The tithi that follows, wrapping Amavasya to Shukla Pratipada.
    pub fn next(&self) -> Self {
        Self::from_absolute_unchecked(self.absolute_number % 30 + 1)
    }

    /// Same lunar day, ignoring progress.
    pub fn same_as(&self, other: &Tithi) -> bool {
        self.absolute_number == other.absolute_number
    }
}

impl fmt::Display for Tithi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.paksha, self.name())
    }
}

/// Lunar mansion of the sidereal Moon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Nakshatra {
    /// 1..=27.
    pub number: u8,
    /// Quarter 1..=4.
    pub pada: u8,
    pub progress: f64,
}

impl Nakshatra {
    pub fn from_longitude(sidereal_moon: f64) -> Self {
        let lon = normalize_degrees(sidereal_moon);
        let index = ((lon / NAKSHATRA_SPAN_DEG).floor() as u8).min(26);
        let within = lon - f64::from(index) * NAKSHATRA_SPAN_DEG;
        let pada = ((within / (NAKSHATRA_SPAN_DEG / 4.0)).floor() as u8 + 1).clamp(1, 4);
        Self { number: index + 1, pada, progress: within / NAKSHATRA_SPAN_DEG }
    }

    pub fn name(&self) -> &'static str {
        NAKSHATRA_NAMES[(self.number - 1) as usize]
    }
}

impl fmt::Display for Nakshatra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (pada {})", self.name(), self.pada)
    }
}

/// Yoga from the combined sidereal Sun and Moon longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Yoga {
    /// 1..=27.
    pub number: u8,
    pub progress: f64,
}

impl Yoga {
    pub fn from_longitude_sum(sum: f64) -> Self {
        let lon = normalize_degrees(sum);
        let index = ((lon / NAKSHATRA_SPAN_DEG).floor() as u8).min(26);
        let within = lon - f64::from(index) * NAKSHATRA_SPAN_DEG;
        Self { number: index + 1, progress: within / NAKSHATRA_SPAN_DEG }
    }

    pub fn name(&self) -> &'static str {
        YOGA_NAMES[(self.number - 1) as usize]
    }
}

impl fmt::Display for Yoga {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Half-tithi.
///
/// Numbered 1..=60 through the lunar month. The first and last three are the
/// fixed karanas; the other 56 cycle through the seven movable ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Karana {
    pub number: u8,
    pub progress: f64,
}

impl Karana {
    pub fn from_elongation(elongation: f64) -> Self {
        let e = normalize_degrees(elongation);
        let index = ((e / KARANA_SPAN_DEG).floor() as u8).min(59);
        Self { number: index + 1, progress: (e % KARANA_SPAN_DEG) / KARANA_SPAN_DEG }
    }

    pub fn name(&self) -> &'static str {
        match self.number - 1 {
            0 => "Kimstughna",
            57 => "Shakuni",
            58 => "Chatushpada",
            59 => "Naga",
            i => MOVABLE_KARANAS[((i - 1) % 7) as usize],
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self.number, 1 | 58..=60)
    }
}

impl fmt::Display for Karana {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vaara {
    Ravivara,
    Somavara,
    Mangalavara,
    Budhavara,
    Guruvara,
    Shukravara,
    Shanivara,
}

impl Vaara {
    pub fn from_weekday(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => Vaara::Ravivara,
            Weekday::Mon => Vaara::Somavara,
            Weekday::Tue => Vaara::Mangalavara,
            Weekday::Wed => Vaara::Budhavara,
            Weekday::Thu => Vaara::Guruvara,
            Weekday::Fri => Vaara::Shukravara,
            Weekday::Sat => Vaara::Shanivara,
        }
    }

    /// Sunday = 0.
    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn nepali_name(&self) -> &'static str {
        match self {
            Vaara::Ravivara => "आइतबार",
            Vaara::Somavara => "सोमबार",
            Vaara::Mangalavara => "मंगलबार",
            Vaara::Budhavara => "बुधबार",
            Vaara::Guruvara => "बिहिबार",
            Vaara::Shukravara => "शुक्रबार",
            Vaara::Shanivara => "शनिबार",
        }
    }
}

impl fmt::Display for Vaara {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Vaara::Ravivara => "Ravivara (Sunday)",
            Vaara::Somavara => "Somavara (Monday)",
            Vaara::Mangalavara => "Mangalavara (Tuesday)",
            Vaara::Budhavara => "Budhavara (Wednesday)",
            Vaara::Guruvara => "Guruvara (Thursday)",
            Vaara::Shukravara => "Shukravara (Friday)",
            Vaara::Shanivara => "Shanivara (Saturday)",
        };
        write!(f, "{}", s)
    }
}

/// Sidereal zodiac sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rashi {
    Mesha,
    Vrishabha,
    Mithuna,
    Karka,
    Simha,
    Kanya,
    Tula,
    Vrishchika,
    Dhanu,
    Makara,
    Kumbha,
    Meena,
}

impl Rashi {
    pub const ALL: [Rashi; 12] = [
        Rashi::Mesha, Rashi::Vrishabha, Rashi::Mithuna, Rashi::Karka, Rashi::Simha, Rashi::Kanya,
        Rashi::Tula, Rashi::Vrishchika, Rashi::Dhanu, Rashi::Makara, Rashi::Kumbha, Rashi::Meena,
    ];

    /// 0 for Mesha through 11 for Meena.
    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn from_index(index: u8) -> Self {
        Self::ALL[(index % 12) as usize]
    }

    pub fn from_longitude(sidereal: f64) -> Self {
        Self::from_index((normalize_degrees(sidereal) / RASHI_SPAN_DEG).floor() as u8)
    }

    /// Sidereal longitude where the sign begins.
    pub fn start_longitude(&self) -> f64 {
        f64::from(self.index()) * RASHI_SPAN_DEG
    }

    /// BS month that begins with the Sun's ingress into this sign.
    pub fn bs_month(&self) -> BsMonth {
        BsMonth::ALL[self.index() as usize]
    }

    pub fn next(&self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rashi::Mesha => "Mesha",
            Rashi::Vrishabha => "Vrishabha",
            Rashi::Mithuna => "Mithuna",
            Rashi::Karka => "Karka",
            Rashi::Simha => "Simha",
            Rashi::Kanya => "Kanya",
            Rashi::Tula => "Tula",
            Rashi::Vrishchika => "Vrishchika",
            Rashi::Dhanu => "Dhanu",
            Rashi::Makara => "Makara",
            Rashi::Kumbha => "Kumbha",
            Rashi::Meena => "Meena",
        }
    }

    pub fn western_name(&self) -> &'static str {
        match self {
            Rashi::Mesha => "Aries",
            Rashi::Vrishabha => "Taurus",
            Rashi::Mithuna => "Gemini",
            Rashi::Karka => "Cancer",
            Rashi::Simha => "Leo",
            Rashi::Kanya => "Virgo",
            Rashi::Tula => "Libra",
            Rashi::Vrishchika => "Scorpio",
            Rashi::Dhanu => "Sagittarius",
            Rashi::Makara => "Capricorn",
            Rashi::Kumbha => "Aquarius",
            Rashi::Meena => "Pisces",
        }
    }
}

impl fmt::Display for Rashi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Rashi {
    type Err = ParvaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let found = match key.as_str() {
            "mesh" | "mesha" => Some(Rashi::Mesha),
            "vrish" | "vrishabha" | "brisha" => Some(Rashi::Vrishabha),
            "mithun" | "mithuna" => Some(Rashi::Mithuna),
            "karkat" | "karka" | "karkata" => Some(Rashi::Karka),
            "simha" | "singha" => Some(Rashi::Simha),
            "kanya" => Some(Rashi::Kanya),
            "tula" => Some(Rashi::Tula),
            "vrishchik" | "vrishchika" | "brishchik" => Some(Rashi::Vrishchika),
            "dhanu" | "dhanus" => Some(Rashi::Dhanu),
            "makar" | "makara" => Some(Rashi::Makara),
            "kumbh" | "kumbha" => Some(Rashi::Kumbha),
            "meen" | "meena" => Some(Rashi::Meena),
            _ => None,
        };
        found
            .or_else(|| Rashi::ALL.into_iter().find(|r| r.western_name().eq_ignore_ascii_case(&key)))
            .ok_or_else(|| ParvaError::invalid_input(format!("unknown rashi '{}'", s)))
    }
}

/// Tithi prevailing at a location's sunrise, with its edge conditions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UdayaTithi {
    pub date: NaiveDate,
    pub sunrise: Instant,
    pub next_sunrise: Instant,
    pub tithi: Tithi,
    /// End of the sunrise tithi.
    pub ends_at: Instant,
    /// The same tithi also prevails at the next sunrise.
    pub is_vriddhi: bool,
    /// A tithi that begins and ends before the next sunrise.
    pub skipped: Option<Tithi>,
}

/// Daily almanac for one civil date and location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panchanga {
    pub date: NaiveDate,
    pub location: GeoCoordinate,
    pub vaara: Vaara,
    pub tithi: UdayaTithi,
    pub nakshatra: Nakshatra,
    pub nakshatra_ends_at: Instant,
    pub yoga: Yoga,
    pub yoga_ends_at: Instant,
    pub karana: Karana,
    pub karana_ends_at: Instant,
    pub sun_rashi: Rashi,
    pub moon_rashi: Rashi,
}
