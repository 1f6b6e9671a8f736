use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which execution template produced an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodTag {
    /// Authoritative per-year date.
    Override,
    /// Authoritative BS date.
    OverrideBsFixed,
    /// Udaya tithi inside a named lunar month.
    LunarTithiWindow,
    /// Udaya tithi inside a BS solar month.
    LunarBsMonth,
    MeshSankranti,
    MakaraSankranti,
    /// First day of a BS month.
    SolarMonthStart,
    /// Fixed day of a BS month.
    SolarBsFixed,
    /// Sun reaching a sign or longitude.
    SolarTransit,
    /// Offset from another festival.
    RelativeOffset,
}

impl MethodTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodTag::Override => "override",
            MethodTag::OverrideBsFixed => "override_bs_fixed",
            MethodTag::LunarTithiWindow => "lunar_tithi_window",
            MethodTag::LunarBsMonth => "lunar_bs_month",
            MethodTag::MeshSankranti => "mesh_sankranti",
            MethodTag::MakaraSankranti => "makara_sankranti",
            MethodTag::SolarMonthStart => "solar_month_start",
            MethodTag::SolarBsFixed => "solar_bs_fixed",
            MethodTag::SolarTransit => "solar_transit",
            MethodTag::RelativeOffset => "relative_offset",
        }
    }
}

impl fmt::Display for MethodTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How far a resolved date can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum OccurrenceConfidence {
    /// Override table or official BS table.
    Official,
    /// Derived from astronomy at the reference location.
    Computed,
    /// Depends on the extrapolated BS model.
    Estimated { error_bound_days: u8 },
}

impl OccurrenceConfidence {
    /// The weaker of two confidences, for derived dates.
    pub fn weakest(self, other: Self) -> Self {
        use OccurrenceConfidence::*;
        match (self, other) {
            (Estimated { error_bound_days: a }, Estimated { error_bound_days: b }) => {
                Estimated { error_bound_days: a.max(b) }
            }
            (e @ Estimated { .. }, _) | (_, e @ Estimated { .. }) => e,
            (Computed, _) | (_, Computed) => Computed,
            (Official, Official) => Official,
        }
    }
}

/// A festival date resolved for one Gregorian year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedOccurrence {
    pub festival_id: String,
    pub year: i32,
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    pub method: MethodTag,
    pub confidence: OccurrenceConfidence,
}

impl ResolvedOccurrence {
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

impl fmt::Display for ResolvedOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_date == self.end_date {
            write!(f, "{} {}: {} [{}]", self.festival_id, self.year, self.start_date, self.method)
        } else {
            write!(
                f,
                "{} {}: {} to {} [{}]",
                self.festival_id, self.year, self.start_date, self.end_date, self.method
            )
        }
    }
}
