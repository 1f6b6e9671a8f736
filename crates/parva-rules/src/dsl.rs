//! Festival rule DSL.
//!
//! Catalog rows arrive as a `rule_type` plus a loosely typed payload. They are
//! normalized once, at load time, into the closed [`FestivalRule`] union; a
//! row missing what its type needs becomes [`RuleBody::Provisional`] and is
//! reported as not executable instead of guessed at.

use chrono::NaiveDate;
use parva_types::{AdhikPolicy, BsDate, BsMonth, MethodTag, Paksha, ParvaError, Rashi, Tithi, normalize_degrees};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Declared shape of a raw row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Lunar,
    Solar,
    Relative,
    Transit,
    Override,
}

/// One catalog row as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRuleRecord {
    pub festival_id: String,
    pub name_en: String,
    #[serde(default)]
    pub name_ne: Option<String>,
    pub rule_type: RuleType,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub rule: Map<String, Value>,
}

fn default_category() -> String {
    "hindu".to_string()
}

/// Which lunar month a tithi rule lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "calendar", content = "month", rename_all = "snake_case")]
pub enum MonthRef {
    /// Amavasya-to-Amavasya month by name.
    Lunar(BsMonth),
    /// The solar BS month; the tithi is taken from its days.
    Bs(BsMonth),
}

/// Solar events usable as a festival day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolarEvent {
    MeshSankranti,
    MakaraSankranti,
    /// First day of the BS month opened by a sankranti.
    MonthStart(BsMonth),
}

/// Target of a solar transit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitTarget {
    Rashi(Rashi),
    /// Sidereal longitude in degrees.
    Longitude(f64),
}

/// Authoritative dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideRule {
    /// Gregorian year to start date.
    Dates(BTreeMap<i32, NaiveDate>),
    /// One BS date.
    BsFixed(BsDate),
}

/// Executable rule. Exactly one shape per festival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FestivalRule {
    Lunar { month: MonthRef, tithi: Tithi, adhik_policy: AdhikPolicy },
    Solar(SolarRule),
    Transit { target: TransitTarget },
    Relative { anchor: String, offset_days: i32 },
    Override(OverrideRule),
}

/// Solar rule payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolarRule {
    Event(SolarEvent),
    FixedDay { month: BsMonth, day: u8 },
}

impl FestivalRule {
    /// Execution template the rule dispatches to.
    pub fn template(&self) -> MethodTag {
        match self {
            FestivalRule::Lunar { month: MonthRef::Lunar(_), .. } => MethodTag::LunarTithiWindow,
            FestivalRule::Lunar { month: MonthRef::Bs(_), .. } => MethodTag::LunarBsMonth,
            FestivalRule::Solar(SolarRule::Event(SolarEvent::MeshSankranti)) => MethodTag::MeshSankranti,
            FestivalRule::Solar(SolarRule::Event(SolarEvent::MakaraSankranti)) => MethodTag::MakaraSankranti,
            FestivalRule::Solar(SolarRule::Event(SolarEvent::MonthStart(_))) => MethodTag::SolarMonthStart,
            FestivalRule::Solar(SolarRule::FixedDay { .. }) => MethodTag::SolarBsFixed,
            FestivalRule::Transit { .. } => MethodTag::SolarTransit,
            FestivalRule::Relative { .. } => MethodTag::RelativeOffset,
            FestivalRule::Override(OverrideRule::Dates(_)) => MethodTag::Override,
            FestivalRule::Override(OverrideRule::BsFixed(_)) => MethodTag::OverrideBsFixed,
        }
    }
}

/// Normalized rule or the reason there is none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleBody {
    Executable(FestivalRule),
    Provisional { reason: String },
}

/// A catalog entry after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FestivalDefinition {
    pub id: String,
    pub name_en: String,
    pub name_ne: Option<String>,
    pub category: String,
    pub source: Option<String>,
    /// At least 1.
    pub duration_days: u16,
    pub body: RuleBody,
}

impl FestivalDefinition {
    /// Normalizes a raw row.
    ///
    /// # Errors
    /// `InvalidInput` for a malformed festival id; a bad payload is not an
    /// error but a provisional body.
    pub fn from_raw(raw: RawRuleRecord) -> Result<Self, ParvaError> {
        validate_id(&raw.festival_id)?;
        let duration_days = int_field(&raw.rule, "duration_days")
            .map_or(1, |d| d.clamp(1, i64::from(u16::MAX)) as u16);
        let body = match normalize(raw.rule_type, &raw.rule) {
            Ok(rule) => RuleBody::Executable(rule),
            Err(reason) => RuleBody::Provisional { reason },
        };
        Ok(Self {
            id: raw.festival_id,
            name_en: raw.name_en,
            name_ne: raw.name_ne,
            category: raw.category,
            source: raw.source,
            duration_days,
            body,
        })
    }

    pub fn rule(&self) -> Option<&FestivalRule> {
        match &self.body {
            RuleBody::Executable(rule) => Some(rule),
            RuleBody::Provisional { .. } => None,
        }
    }

    pub fn is_executable(&self) -> bool {
        self.rule().is_some()
    }
}

/// Lowercase letters, digits and hyphens.
pub fn validate_id(id: &str) -> Result<(), ParvaError> {
    let ok = !id.is_empty() && id.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if ok {
        Ok(())
    } else {
        Err(ParvaError::invalid_input(format!("festival id '{}' must match [a-z0-9-]+", id)))
    }
}

fn normalize(rule_type: RuleType, payload: &Map<String, Value>) -> Result<FestivalRule, String> {
    match rule_type {
        RuleType::Lunar => normalize_lunar(payload),
        RuleType::Solar => normalize_solar(payload),
        RuleType::Relative => normalize_relative(payload),
        RuleType::Transit => normalize_transit(payload),
        RuleType::Override => normalize_override(payload),
    }
}

fn normalize_lunar(payload: &Map<String, Value>) -> Result<FestivalRule, String> {
    let number = int_field(payload, "tithi").ok_or("lunar rule has no tithi")?;
    let paksha = str_field(payload, "paksha").ok_or("lunar rule has no paksha")?;
    let paksha = Paksha::from_str(paksha).map_err(|e| e.to_string())?;
    let tithi = match number {
        1..=15 => Tithi::from_paksha(paksha, number as u8),
        // Absolute numbering; must agree with the paksha.
        16..=30 if paksha == Paksha::Krishna => Tithi::from_absolute(number as u8),
        _ => return Err(format!("tithi {} does not fit paksha {}", number, paksha)),
    }
    .map_err(|e| e.to_string())?;

    let month = if let Some(name) = str_field(payload, "lunar_month") {
        MonthRef::Lunar(BsMonth::from_str(name).map_err(|e| e.to_string())?)
    } else if let Some(n) = int_field(payload, "bs_month") {
        MonthRef::Bs(bs_month(n)?)
    } else {
        return Err("lunar rule names neither lunar_month nor bs_month".to_string());
    };

    let adhik_policy = match str_field(payload, "adhik_policy") {
        Some(p) => AdhikPolicy::from_str(p).map_err(|e| e.to_string())?,
        None => AdhikPolicy::default(),
    };
    Ok(FestivalRule::Lunar { month, tithi, adhik_policy })
}

fn normalize_solar(payload: &Map<String, Value>) -> Result<FestivalRule, String> {
    let month = int_field(payload, "bs_month").map(bs_month).transpose()?;
    if let Some(event) = str_field(payload, "event") {
        let event = match event.trim().to_ascii_lowercase().as_str() {
            "mesh_sankranti" | "new_year" | "bs_new_year" => SolarEvent::MeshSankranti,
            "makara_sankranti" | "maghe_sankranti" => SolarEvent::MakaraSankranti,
            "sankranti" => SolarEvent::MonthStart(month.ok_or("sankranti event needs bs_month")?),
            other => return Err(format!("unknown solar event '{}'", other)),
        };
        return Ok(FestivalRule::Solar(SolarRule::Event(event)));
    }
    match (month, int_field(payload, "solar_day")) {
        (Some(month), Some(day @ 1..=32)) => Ok(FestivalRule::Solar(SolarRule::FixedDay { month, day: day as u8 })),
        (Some(_), Some(day)) => Err(format!("solar_day {} outside 1..=32", day)),
        _ => Err("solar rule needs an event or bs_month and solar_day".to_string()),
    }
}

fn normalize_relative(payload: &Map<String, Value>) -> Result<FestivalRule, String> {
    let anchor = str_field(payload, "relative_to")
        .or_else(|| str_field(payload, "anchor_festival_id"))
        .ok_or("relative rule has no anchor")?;
    let offset_days = int_field(payload, "offset_days").ok_or("relative rule has no offset_days")?;
    let offset_days = i32::try_from(offset_days).map_err(|_| format!("offset {} too large", offset_days))?;
    Ok(FestivalRule::Relative { anchor: anchor.to_string(), offset_days })
}

fn normalize_transit(payload: &Map<String, Value>) -> Result<FestivalRule, String> {
    if let Some(body) = str_field(payload, "body") {
        if !body.eq_ignore_ascii_case("sun") {
            return Err(format!("transit of '{}' is not supported", body));
        }
    }
    if let Some(rashi) = str_field(payload, "target_rashi") {
        return Ok(FestivalRule::Transit { target: TransitTarget::Rashi(rashi.parse().map_err(|e: ParvaError| e.to_string())?) });
    }
    if let Some(lon) = payload.get("target_longitude").and_then(Value::as_f64) {
        if !lon.is_finite() {
            return Err("target_longitude is not finite".to_string());
        }
        return Ok(FestivalRule::Transit { target: TransitTarget::Longitude(normalize_degrees(lon)) });
    }
    if let Some(event) = str_field(payload, "event") {
        // "<rashi>_sankranti"
        let sign = event.trim().to_ascii_lowercase();
        let sign = sign.strip_suffix("_sankranti").unwrap_or(&sign);
        let rashi = Rashi::from_str(sign).map_err(|e| e.to_string())?;
        return Ok(FestivalRule::Transit { target: TransitTarget::Rashi(rashi) });
    }
    Err("transit rule has no target".to_string())
}

fn normalize_override(payload: &Map<String, Value>) -> Result<FestivalRule, String> {
    if let Some(dates) = payload.get("dates").and_then(Value::as_object) {
        if !dates.is_empty() {
            let mut table = BTreeMap::new();
            for (year, date) in dates {
                let year: i32 = year.trim().parse().map_err(|_| format!("override year '{}' is not a number", year))?;
                let date = date
                    .as_str()
                    .and_then(|d| d.parse::<NaiveDate>().ok())
                    .ok_or_else(|| format!("override date for {} is not an ISO date", year))?;
                table.insert(year, date);
            }
            return Ok(FestivalRule::Override(OverrideRule::Dates(table)));
        }
    }
    match (int_field(payload, "bs_year"), int_field(payload, "bs_month"), int_field(payload, "bs_day")) {
        (Some(y), Some(m), Some(d)) => {
            let year = i32::try_from(y).map_err(|_| format!("BS year {} out of range", y))?;
            let month = u8::try_from(m).map_err(|_| format!("BS month {} out of range", m))?;
            let day = u8::try_from(d).map_err(|_| format!("BS day {} out of range", d))?;
            let date = BsDate::try_new(year, month, day).map_err(|e| e.to_string())?;
            Ok(FestivalRule::Override(OverrideRule::BsFixed(date)))
        }
        _ => Err("override rule has neither dates nor a BS date".to_string()),
    }
}

fn bs_month(n: i64) -> Result<BsMonth, String> {
    u8::try_from(n)
        .map_err(|_| format!("bs_month {} outside 1..=12", n))
        .and_then(|m| BsMonth::from_number(m).map_err(|e| e.to_string()))
}

fn str_field<'a>(payload: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    payload.get(key)?.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Integer or numeric string.
fn int_field(payload: &Map<String, Value>, key: &str) -> Option<i64> {
    match payload.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
