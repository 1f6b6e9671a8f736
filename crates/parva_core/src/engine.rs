//! The `Parva` engine.

use chrono::{FixedOffset, NaiveDate};
use parva_astronomy::{AnalyticEphemeris, PositionProvider, Sky, TithiDay, sankranti, tithi};
use parva_calendar::{BsCalendarTable, BsConverter, lunar};
use parva_rules::{FestivalDefinition, OverrideTable, RuleCatalog, RuleEngine, RuleExecutionError};
use parva_types::{
    BsDate, ConversionConfidence, GeoCoordinate, Instant, LunarMonth, LunarYear, Panchanga, ParvaError, Rashi,
    ResolvedOccurrence, SankrantiEvent, Tithi, UdayaTithi,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::config::EngineConfig;
use crate::iter::PanchangaRange;

/// Panchanga, calendar and festival engine.
///
/// Holds immutable snapshots behind `Arc`, so clones are cheap and one
/// instance can be shared across threads. Every call is a pure function of
/// the snapshots and the arguments.
#[derive(Debug, Clone)]
pub struct Parva {
    provider: Arc<dyn PositionProvider>,
    table: Arc<BsCalendarTable>,
    catalog: Arc<RuleCatalog>,
    overrides: Arc<OverrideTable>,
    config: EngineConfig,
    civil: FixedOffset,
}

impl Parva {
    /// Engine over the bundled snapshots and the analytic ephemeris.
    pub fn new() -> Result<Self, ParvaError> {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, ParvaError> {
        Self::from_parts(
            Arc::new(AnalyticEphemeris::default()),
            Arc::new(BsCalendarTable::bundled()?),
            Arc::new(RuleCatalog::bundled()?),
            Arc::new(OverrideTable::bundled()?),
            config,
        )
    }

    /// Engine over caller-supplied snapshots.
    pub fn from_parts(
        provider: Arc<dyn PositionProvider>,
        table: Arc<BsCalendarTable>,
        catalog: Arc<RuleCatalog>,
        overrides: Arc<OverrideTable>,
        config: EngineConfig,
    ) -> Result<Self, ParvaError> {
        config.validate()?;
        let civil = config.civil_offset()?;
        debug!(
            bs_years = %format!("{}..={}", table.first_year(), table.last_year()),
            festivals = catalog.len(),
            overrides = overrides.len(),
            "engine ready"
        );
        Ok(Self { provider, table, catalog, overrides, config, civil })
    }

    /// Same snapshots, different configuration.
    pub fn reconfigure(&self, config: EngineConfig) -> Result<Self, ParvaError> {
        Self::from_parts(self.provider.clone(), self.table.clone(), self.catalog.clone(), self.overrides.clone(), config)
    }

    /// Same snapshots with a replaced override table.
    pub fn with_overrides(&self, overrides: OverrideTable) -> Self {
        Self { overrides: Arc::new(overrides), ..self.clone() }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn table(&self) -> &BsCalendarTable {
        &self.table
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    pub fn festival(&self, festival_id: &str) -> Option<&FestivalDefinition> {
        self.catalog.get(festival_id)
    }

    pub fn sky(&self) -> Sky<'_> {
        Sky::new(self.provider.as_ref(), self.config.solver)
    }

    fn converter(&self) -> Result<BsConverter<'_>, ParvaError> {
        Ok(BsConverter::new(&self.table, self.sky())?
            .with_reference(self.config.reference, self.civil)
            .with_estimated_span(self.config.estimated_span_years))
    }

    fn rules(&self) -> Result<RuleEngine<'_>, ParvaError> {
        Ok(RuleEngine::new(&self.catalog, &self.overrides, self.converter()?, self.sky())?
            .with_reference(self.config.reference, self.civil)
            .with_lunar_lookback(self.config.lunar_lookback_days))
    }

    // Bikram Sambat

    pub fn convert_gregorian_to_bs(&self, date: NaiveDate) -> Result<(BsDate, ConversionConfidence), ParvaError> {
        self.converter()?.gregorian_to_bs(date)
    }

    /// # Errors
    /// `InvalidBsDate` when the day exceeds the month's length.
    pub fn convert_bs_to_gregorian(&self, bs: BsDate) -> Result<NaiveDate, ParvaError> {
        self.converter()?.bs_to_gregorian(bs)
    }

    pub fn convert_bs_to_gregorian_with_confidence(
        &self,
        bs: BsDate,
    ) -> Result<(NaiveDate, ConversionConfidence), ParvaError> {
        self.converter()?.bs_to_gregorian_with_confidence(bs)
    }

    pub fn days_in_month(&self, year: i32, month: u8) -> Result<u8, ParvaError> {
        self.converter()?.days_in_month(year, month)
    }

    /// Gregorian date of 1 Baishakh of a BS year.
    pub fn year_start(&self, year: i32) -> Result<NaiveDate, ParvaError> {
        self.converter()?.year_start(year)
    }

    // Panchanga

    /// The five limbs at sunrise on `date` at the given coordinates.
    ///
    /// # Errors
    /// `InvalidInput` for out-of-range coordinates, before any computation.
    pub fn compute_panchanga(&self, date: NaiveDate, latitude: f64, longitude: f64) -> Result<Panchanga, ParvaError> {
        self.panchanga_at(date, GeoCoordinate::try_new(latitude, longitude)?)
    }

    pub fn panchanga_at(&self, date: NaiveDate, coord: GeoCoordinate) -> Result<Panchanga, ParvaError> {
        coord.validate()?;
        parva_astronomy::compute_panchanga(&self.sky(), date, coord)
    }

    /// Daily panchangas for `start..=end`, computed as the iterator advances.
    pub fn panchanga_range(&self, start: NaiveDate, end: NaiveDate, coord: GeoCoordinate) -> PanchangaRange<'_> {
        PanchangaRange::new(self, start, end, coord)
    }

    pub fn udaya_tithi(&self, date: NaiveDate, coord: GeoCoordinate) -> Result<UdayaTithi, ParvaError> {
        coord.validate()?;
        tithi::udaya_tithi(&self.sky(), date, coord)
    }

    pub fn tithi_at(&self, at: Instant) -> Result<Tithi, ParvaError> {
        tithi::tithi_at(&self.sky(), at)
    }

    /// Start of the next occurrence of `tithi` after `after`.
    pub fn find_next_tithi(&self, tithi: Tithi, after: Instant, within_days: u32) -> Result<Instant, ParvaError> {
        tithi::find_next_tithi(&self.sky(), tithi, after, within_days)
    }

    /// Next occurrence of `tithi` after `after`, dated by the sunrise rule at
    /// the reference location.
    pub fn next_tithi_day(&self, tithi: Tithi, after: Instant) -> Result<Option<TithiDay>, ParvaError> {
        let until = after + chrono::Duration::days(32);
        tithi::tithi_in_window(&self.sky(), tithi, after, until, self.config.reference, self.civil)
    }

    // Solar and lunar structure

    pub fn sankrantis_in_year(&self, year: i32) -> Result<[SankrantiEvent; 12], ParvaError> {
        sankranti::sankrantis_in_year(&self.sky(), year)
    }

    pub fn find_sankranti(&self, rashi: Rashi, after: Instant) -> Result<SankrantiEvent, ParvaError> {
        sankranti::find_sankranti(&self.sky(), rashi, after)
    }

    pub fn lunar_year(&self, year: i32) -> Result<LunarYear, ParvaError> {
        lunar::lunar_year(&self.sky(), year)
    }

    pub fn lunar_month_at(&self, at: Instant) -> Result<LunarMonth, ParvaError> {
        lunar::lunar_month_at(&self.sky(), at)
    }

    pub fn adhik_months(&self, start_year: i32, end_year: i32) -> Result<Vec<LunarMonth>, ParvaError> {
        lunar::adhik_months(&self.sky(), start_year, end_year)
    }

    // Festivals

    #[instrument(skip(self), level = "debug")]
    pub fn resolve_festival(&self, festival_id: &str, year: i32) -> Result<ResolvedOccurrence, RuleExecutionError> {
        self.rules()?.resolve(festival_id, year)
    }

    pub fn festivals_on(&self, date: NaiveDate) -> Result<Vec<ResolvedOccurrence>, RuleExecutionError> {
        self.rules()?.festivals_on(date)
    }

    pub fn upcoming_festivals(&self, from: NaiveDate, days: u32) -> Result<Vec<ResolvedOccurrence>, RuleExecutionError> {
        self.rules()?.upcoming_festivals(from, days)
    }

    pub fn next_occurrence(&self, festival_id: &str, after: NaiveDate) -> Result<ResolvedOccurrence, RuleExecutionError> {
        self.rules()?.next_occurrence(festival_id, after)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use parva_types::{ErrorKind, MethodTag};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bs_surface() {
        let parva = Parva::new().unwrap();
        let (bs, confidence) = parva.convert_gregorian_to_bs(date(2026, 2, 15)).unwrap();
        assert_eq!(bs, BsDate::new(2082, 11, 3));
        assert_eq!(confidence, ConversionConfidence::Official);
        assert_eq!(parva.convert_bs_to_gregorian(bs).unwrap(), date(2026, 2, 15));
        assert_eq!(parva.year_start(2083).unwrap(), date(2026, 4, 14));
        assert_eq!(parva.days_in_month(2082, 11).unwrap(), 30);
    }

    #[test]
    fn test_panchanga_rejects_bad_coordinates() {
        let parva = Parva::new().unwrap();
        let err = parva.compute_panchanga(date(2026, 2, 15), 95.0, 85.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let ok = parva.compute_panchanga(date(2026, 2, 15), 27.7172, 85.3240).unwrap();
        assert_eq!(ok.date, date(2026, 2, 15));
    }

    #[test]
    fn test_next_tithi_day() {
        let parva = Parva::new().unwrap();
        let purnima = Tithi::from_absolute(15).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let day = parva.next_tithi_day(purnima, after).unwrap().unwrap();
        assert_eq!(day.date, date(2025, 3, 14));
        assert!(day.starts_at > after);
    }

    #[test]
    fn test_festival_surface() {
        let parva = Parva::new().unwrap();
        let occ = parva.resolve_festival("dashain", 2025).unwrap();
        assert_eq!(occ.method, MethodTag::Override);
        assert!(parva.festival("diwali").is_some());

        // Dropping the override leaves the computed date.
        let computed = parva.with_overrides(OverrideTable::empty()).resolve_festival("dashain", 2025).unwrap();
        assert_eq!(computed.method, MethodTag::LunarTithiWindow);
        assert!((computed.start_date - occ.start_date).num_days().abs() <= 1);
    }

    #[test]
    fn test_reconfigure_validates() {
        let parva = Parva::new().unwrap();
        let bad = EngineConfig::default().scan_step_days(-1.0);
        assert!(parva.reconfigure(bad).is_err());
        let pokhara = parva.reconfigure(EngineConfig::default().reference(GeoCoordinate::new(28.2096, 83.9856))).unwrap();
        assert_eq!(pokhara.config().reference.lat, 28.2096);
    }
}
