//! Rule catalog and override table snapshots.

use chrono::NaiveDate;
use parva_types::ParvaError;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::dsl::{FestivalDefinition, RawRuleRecord, RuleBody, validate_id};

const BUNDLED_CATALOG: &str = include_str!("../data/festival_rules.json");
const BUNDLED_OVERRIDES: &str = include_str!("../data/overrides.json");

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    version: u32,
    festivals: Vec<RawRuleRecord>,
    #[serde(default)]
    aliases: BTreeMap<String, String>,
}

/// Lowercases and turns `_` and spaces into `-`.
pub fn slug(id: &str) -> String {
    id.trim()
        .chars()
        .map(|c| match c {
            '_' | ' ' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Immutable set of normalized festival rules.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    version: u32,
    festivals: BTreeMap<String, FestivalDefinition>,
    aliases: BTreeMap<String, String>,
}

impl RuleCatalog {
    /// The catalog compiled into the crate.
    pub fn bundled() -> Result<Self, ParvaError> {
        Self::from_json_str(BUNDLED_CATALOG)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ParvaError> {
        let raw: RawCatalog =
            serde_json::from_str(json).map_err(|e| ParvaError::invalid_input(format!("rule catalog: {}", e)))?;

        let mut festivals = BTreeMap::new();
        for record in raw.festivals {
            let def = FestivalDefinition::from_raw(record)?;
            if let RuleBody::Provisional { reason } = &def.body {
                warn!(festival_id = %def.id, %reason, "provisional rule");
            }
            if festivals.insert(def.id.clone(), def).is_some() {
                return Err(ParvaError::invalid_input("duplicate festival id in rule catalog"));
            }
        }

        let mut aliases = BTreeMap::new();
        for (alias, target) in raw.aliases {
            let (alias, target) = (slug(&alias), slug(&target));
            validate_id(&alias)?;
            if !festivals.contains_key(&target) {
                return Err(ParvaError::invalid_input(format!("alias '{}' points at unknown '{}'", alias, target)));
            }
            aliases.insert(alias, target);
        }

        debug!(version = raw.version, festivals = festivals.len(), aliases = aliases.len(), "rule catalog loaded");
        Ok(Self { version: raw.version, festivals, aliases })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Canonical id for a user-supplied name or alias.
    pub fn canonical_id(&self, id: &str) -> String {
        let key = slug(id);
        self.aliases.get(&key).cloned().unwrap_or(key)
    }

    pub fn get(&self, id: &str) -> Option<&FestivalDefinition> {
        self.festivals.get(&self.canonical_id(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FestivalDefinition> {
        self.festivals.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.festivals.keys().map(String::as_str)
    }

    pub fn executable(&self) -> impl Iterator<Item = &FestivalDefinition> {
        self.iter().filter(|d| d.is_executable())
    }

    pub fn provisional(&self) -> impl Iterator<Item = &FestivalDefinition> {
        self.iter().filter(|d| !d.is_executable())
    }

    pub fn len(&self) -> usize {
        self.festivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.festivals.is_empty()
    }
}

/// Authoritative dates published for specific years, keyed by canonical
/// festival id. Consulted before any rule runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideTable {
    entries: BTreeMap<String, BTreeMap<i32, NaiveDate>>,
}

impl OverrideTable {
    pub fn bundled() -> Result<Self, ParvaError> {
        Self::from_json_str(BUNDLED_OVERRIDES)
    }

    /// Parses `{"dashain": {"2025": "2025-10-02"}}`.
    pub fn from_json_str(json: &str) -> Result<Self, ParvaError> {
        let raw: BTreeMap<String, BTreeMap<i32, NaiveDate>> =
            serde_json::from_str(json).map_err(|e| ParvaError::invalid_input(format!("override table: {}", e)))?;
        let mut entries = BTreeMap::new();
        for (id, dates) in raw {
            let id = slug(&id);
            validate_id(&id)?;
            entries.insert(id, dates);
        }
        Ok(Self { entries })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Adds or replaces one entry.
    pub fn insert(&mut self, festival_id: &str, year: i32, date: NaiveDate) {
        self.entries.entry(slug(festival_id)).or_default().insert(year, date);
    }

    /// Start date for a canonical id and Gregorian year.
    pub fn lookup(&self, festival_id: &str, year: i32) -> Option<NaiveDate> {
        self.entries.get(festival_id)?.get(&year).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
