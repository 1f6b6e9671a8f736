//! Festival rules for parva.
//!
//! [`RuleCatalog`] holds normalized [`FestivalDefinition`]s, [`OverrideTable`]
//! holds published dates, and [`RuleEngine`] turns both into
//! [`ResolvedOccurrence`](parva_types::ResolvedOccurrence)s.

pub mod catalog;
pub mod dsl;
pub mod engine;
pub mod error;

pub use catalog::{OverrideTable, RuleCatalog, slug};
pub use dsl::{
    FestivalDefinition, FestivalRule, MonthRef, OverrideRule, RawRuleRecord, RuleBody, RuleType, SolarEvent, SolarRule,
    TransitTarget,
};
pub use engine::{DEFAULT_LUNAR_LOOKBACK_DAYS, RuleEngine};
pub use error::RuleExecutionError;
