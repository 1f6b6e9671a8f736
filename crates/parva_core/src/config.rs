//! Engine configuration.

use chrono::FixedOffset;
use parva_astronomy::BoundarySolver;
use parva_calendar::DEFAULT_ESTIMATED_SPAN_YEARS;
use parva_rules::DEFAULT_LUNAR_LOOKBACK_DAYS;
use parva_types::{GeoCoordinate, NEPAL_UTC_OFFSET_MINUTES, ParvaError, time::civil_offset};
use serde::{Deserialize, Serialize};

/// Upper bound on the boundary solver's final bracket.
pub const MAX_TOLERANCE_SECONDS: f64 = 60.0;

/// Settings shared by every calculation of one engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Where sunrise, and therefore the civil day of a tithi, is observed.
    pub reference: GeoCoordinate,
    /// Civil UTC offset at the reference location.
    pub utc_offset_minutes: i32,
    pub solver: BoundarySolver,
    /// Days before 1 January searched for lunar months.
    pub lunar_lookback_days: u16,
    /// Years the estimated BS model reaches past the official table.
    pub estimated_span_years: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reference: GeoCoordinate::KATHMANDU,
            utc_offset_minutes: NEPAL_UTC_OFFSET_MINUTES,
            solver: BoundarySolver::default(),
            lunar_lookback_days: DEFAULT_LUNAR_LOOKBACK_DAYS,
            estimated_span_years: DEFAULT_ESTIMATED_SPAN_YEARS,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reference(mut self, reference: GeoCoordinate) -> Self {
        self.reference = reference;
        self
    }

    pub fn utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    pub fn scan_step_days(mut self, days: f64) -> Self {
        self.solver.scan_step_days = days;
        self
    }

    /// Clamped to `MAX_TOLERANCE_SECONDS`.
    pub fn tolerance_seconds(mut self, seconds: f64) -> Self {
        self.solver.tolerance_seconds = seconds.min(MAX_TOLERANCE_SECONDS);
        self
    }

    pub fn max_iterations(mut self, iterations: u32) -> Self {
        self.solver.max_iterations = iterations;
        self
    }

    pub fn lunar_lookback_days(mut self, days: u16) -> Self {
        self.lunar_lookback_days = days;
        self
    }

    pub fn estimated_span_years(mut self, years: u16) -> Self {
        self.estimated_span_years = years;
        self
    }

    /// Civil offset as a chrono zone.
    pub fn civil_offset(&self) -> Result<FixedOffset, ParvaError> {
        civil_offset(self.utc_offset_minutes)
    }

    /// Checks every field; setters do not.
    pub fn validate(&self) -> Result<(), ParvaError> {
        self.reference.validate()?;
        self.civil_offset()?;
        let solver = &self.solver;
        if !(solver.scan_step_days.is_finite() && solver.scan_step_days > 0.0) {
            return Err(ParvaError::invalid_input(format!("scan step {} days must be positive", solver.scan_step_days)));
        }
        if !(solver.tolerance_seconds > 0.0 && solver.tolerance_seconds <= MAX_TOLERANCE_SECONDS) {
            return Err(ParvaError::invalid_input(format!(
                "tolerance {} s outside (0, {}]",
                solver.tolerance_seconds, MAX_TOLERANCE_SECONDS
            )));
        }
        if solver.max_iterations == 0 {
            return Err(ParvaError::invalid_input("max_iterations must be at least 1"));
        }
        if self.lunar_lookback_days == 0 {
            return Err(ParvaError::invalid_input("lunar lookback must be at least 1 day"));
        }
        Ok(())
    }
}

/// Builder with validation for `EngineConfig`.
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    latitude: Option<f64>,
    longitude: Option<f64>,
    utc_offset_minutes: Option<i32>,
    scan_step_days: Option<f64>,
    tolerance_seconds: Option<f64>,
    max_iterations: Option<u32>,
    lunar_lookback_days: Option<u16>,
    estimated_span_years: Option<u16>,
}

impl EngineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = Some(minutes);
        self
    }

    pub fn scan_step_days(mut self, days: f64) -> Self {
        self.scan_step_days = Some(days);
        self
    }

    pub fn tolerance_seconds(mut self, seconds: f64) -> Self {
        self.tolerance_seconds = Some(seconds);
        self
    }

    pub fn max_iterations(mut self, iterations: u32) -> Self {
        self.max_iterations = Some(iterations);
        self
    }

    pub fn lunar_lookback_days(mut self, days: u16) -> Self {
        self.lunar_lookback_days = Some(days);
        self
    }

    pub fn estimated_span_years(mut self, years: u16) -> Self {
        self.estimated_span_years = Some(years);
        self
    }

    /// Builds and validates.
    pub fn build(self) -> Result<EngineConfig, ParvaError> {
        let defaults = EngineConfig::default();
        let reference = match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => GeoCoordinate::try_new(lat, lng)?,
            _ => defaults.reference,
        };
        let solver = BoundarySolver {
            scan_step_days: self.scan_step_days.unwrap_or(defaults.solver.scan_step_days),
            tolerance_seconds: self.tolerance_seconds.unwrap_or(defaults.solver.tolerance_seconds),
            max_iterations: self.max_iterations.unwrap_or(defaults.solver.max_iterations),
        };
        let config = EngineConfig {
            reference,
            utc_offset_minutes: self.utc_offset_minutes.unwrap_or(defaults.utc_offset_minutes),
            solver,
            lunar_lookback_days: self.lunar_lookback_days.unwrap_or(defaults.lunar_lookback_days),
            estimated_span_years: self.estimated_span_years.unwrap_or(defaults.estimated_span_years),
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parva_types::ErrorKind;

    #[test]
    fn test_default_is_kathmandu() {
        let config = EngineConfig::default();
        assert_eq!(config.reference, GeoCoordinate::KATHMANDU);
        assert_eq!(config.utc_offset_minutes, 345);
        assert_eq!(config.civil_offset().unwrap().local_minus_utc(), 345 * 60);
        config.validate().unwrap();
    }

    #[test]
    fn test_builder_validates() {
        let err = EngineConfigBuilder::new().location(91.0, 0.0).build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(EngineConfigBuilder::new().scan_step_days(0.0).build().is_err());
        assert!(EngineConfigBuilder::new().tolerance_seconds(61.0).build().is_err());
        assert!(EngineConfigBuilder::new().utc_offset_minutes(24 * 60).build().is_err());

        let config = EngineConfigBuilder::new()
            .location(28.2096, 83.9856)
            .utc_offset_minutes(345)
            .tolerance_seconds(0.5)
            .build()
            .unwrap();
        assert_eq!(config.solver.tolerance_seconds, 0.5);
        assert_eq!(config.reference.lat, 28.2096);
    }

    #[test]
    fn test_builder_carries_every_field() {
        let config = EngineConfigBuilder::new()
            .scan_step_days(0.5)
            .max_iterations(40)
            .lunar_lookback_days(45)
            .estimated_span_years(80)
            .build()
            .unwrap();
        assert_eq!(config.solver.scan_step_days, 0.5);
        assert_eq!(config.solver.max_iterations, 40);
        assert_eq!(config.lunar_lookback_days, 45);
        assert_eq!(config.estimated_span_years, 80);
        assert_eq!(config.reference, GeoCoordinate::KATHMANDU);
        assert!(EngineConfigBuilder::new().lunar_lookback_days(0).build().is_err());
    }

    #[test]
    fn test_setters_chain_and_clamp() {
        let config = EngineConfig::new().tolerance_seconds(600.0).estimated_span_years(50);
        assert_eq!(config.solver.tolerance_seconds, MAX_TOLERANCE_SECONDS);
        assert_eq!(config.estimated_span_years, 50);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"utc_offset_minutes": 330}"#).unwrap();
        assert_eq!(config.utc_offset_minutes, 330);
        assert_eq!(config.reference, GeoCoordinate::KATHMANDU);
    }
}
