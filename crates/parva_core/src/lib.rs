//! Core of parva: the [`Parva`] engine, its configuration and helpers.
//!
//! Lower crates are re-exported as modules for callers that want the free
//! functions with explicit collaborators.

pub mod config;
pub mod engine;
pub mod extension;
pub mod iter;

pub use config::{EngineConfig, EngineConfigBuilder, MAX_TOLERANCE_SECONDS};
pub use engine::Parva;
pub use extension::ParvaDateExt;
pub use iter::PanchangaRange;

pub use parva_astronomy as astronomy;
pub use parva_calendar as calendar;
pub use parva_rules as rules;
pub use parva_types as types;

pub use parva_astronomy::{AnalyticEphemeris, Ayanamsa, BoundarySolver, PositionProvider, TithiDay};
pub use parva_calendar::BsCalendarTable;
pub use parva_rules::{FestivalDefinition, FestivalRule, OverrideTable, RuleCatalog, RuleExecutionError};
pub use parva_types::{
    AdhikPolicy, AngularPosition, Body, BsDate, BsMonth, ConversionConfidence, ErrorKind, GeoCoordinate, Instant, Karana, LunarMonth,
    LunarYear, MethodTag, Nakshatra, OccurrenceConfidence, Paksha, Panchanga, ParvaError, Rashi, ResolvedOccurrence,
    SankrantiEvent, Tithi, UdayaTithi, Vaara, Yoga,
};

pub mod prelude {
    pub use crate::extension::ParvaDateExt;
    pub use crate::{
        AdhikPolicy, BsDate, BsMonth, ConversionConfidence, EngineConfig, EngineConfigBuilder, ErrorKind,
        GeoCoordinate, MethodTag, OccurrenceConfidence, Paksha, Panchanga, Parva, ParvaError, ResolvedOccurrence,
        RuleExecutionError, Tithi,
    };
}
