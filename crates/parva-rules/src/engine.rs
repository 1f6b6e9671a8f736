//! Rule execution.
//!
//! Each executable rule maps to one template. An override for the requested
//! year always wins; otherwise the rule runs against the calendars and the
//! position provider. Nothing is ever guessed: a rule that cannot run is
//! `NotExecutable`, a rule that ran without finding a date is
//! `NoOccurrenceInYear`.

use chrono::{Datelike, Days, Duration, FixedOffset, NaiveDate};
use parva_astronomy::{Direction, Sky, sankranti, tithi_in_window};
use parva_calendar::{BsConverter, months_between};
use parva_types::{
    AdhikPolicy, BsDate, BsMonth, ConversionConfidence, GeoCoordinate, Instant, MethodTag, NEPAL_UTC_OFFSET_MINUTES,
    OccurrenceConfidence, ParvaError, ResolvedOccurrence, SankrantiEvent, Tithi,
    time::{civil_date, civil_offset, utc_midnight},
};
use tracing::{debug, instrument, trace};

use crate::catalog::{OverrideTable, RuleCatalog};
use crate::dsl::{FestivalDefinition, FestivalRule, MonthRef, OverrideRule, RuleBody, SolarEvent, SolarRule, TransitTarget};
use crate::error::RuleExecutionError;

type RuleResult<T> = Result<T, RuleExecutionError>;

/// Lunar months opening this long before 1 January can still hold dates in
/// the year.
pub const DEFAULT_LUNAR_LOOKBACK_DAYS: u16 = 31;
/// Tithis close to a BS month start may begin before it.
const BS_MONTH_LOOKBACK_DAYS: i64 = 2;
/// Years `next_occurrence` searches past the starting year.
const NEXT_OCCURRENCE_HORIZON_YEARS: i32 = 4;
const SIGN_SCAN_DAYS: u32 = 370;

fn from_conversion(confidence: ConversionConfidence) -> OccurrenceConfidence {
    match confidence {
        ConversionConfidence::Official => OccurrenceConfidence::Official,
        ConversionConfidence::Estimated { error_bound_days } => OccurrenceConfidence::Estimated { error_bound_days },
    }
}

/// BS years whose `month` may fall in Gregorian `year`, most likely first.
///
/// Magh through Chaitra straddle the Gregorian new year.
fn bs_year_candidates(year: i32, month: BsMonth) -> [i32; 3] {
    let base = if month.number() >= 10 { year + 56 } else { year + 57 };
    [base, base - 1, base + 1]
}

fn jan_first(year: i32) -> Result<NaiveDate, ParvaError> {
    NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| ParvaError::invalid_input(format!("year {} not representable", year)))
}

/// One computed start date and how it was obtained.
struct Hit {
    date: NaiveDate,
    method: MethodTag,
    confidence: OccurrenceConfidence,
}

/// Evaluates catalog rules for Gregorian years.
#[derive(Debug, Clone, Copy)]
pub struct RuleEngine<'a> {
    catalog: &'a RuleCatalog,
    overrides: &'a OverrideTable,
    converter: BsConverter<'a>,
    sky: Sky<'a>,
    reference: GeoCoordinate,
    civil: FixedOffset,
    lunar_lookback_days: u16,
}

impl<'a> RuleEngine<'a> {
    /// Engine observing from Kathmandu in Nepal Standard Time.
    pub fn new(
        catalog: &'a RuleCatalog,
        overrides: &'a OverrideTable,
        converter: BsConverter<'a>,
        sky: Sky<'a>,
    ) -> Result<Self, ParvaError> {
        Ok(Self {
            catalog,
            overrides,
            converter,
            sky,
            reference: GeoCoordinate::KATHMANDU,
            civil: civil_offset(NEPAL_UTC_OFFSET_MINUTES)?,
            lunar_lookback_days: DEFAULT_LUNAR_LOOKBACK_DAYS,
        })
    }

    /// Moves the sunrise reference and civil day for every template.
    pub fn with_reference(mut self, reference: GeoCoordinate, civil: FixedOffset) -> Self {
        self.reference = reference;
        self.civil = civil;
        self.converter = self.converter.with_reference(reference, civil);
        self
    }

    /// How far before 1 January lunar rules look for a month opening.
    pub fn with_lunar_lookback(mut self, days: u16) -> Self {
        self.lunar_lookback_days = days;
        self
    }

    pub fn catalog(&self) -> &'a RuleCatalog {
        self.catalog
    }

    /// Start and end of a festival in Gregorian `year`.
    ///
    /// # Errors
    /// `UnknownFestival` for an id missing from the catalog (after alias
    /// resolution), `NotExecutable` for provisional rules and dependency
    /// cycles, `NoOccurrenceInYear` when the rule ran but found nothing.
    #[instrument(skip(self), level = "debug")]
    pub fn resolve(&self, festival_id: &str, year: i32) -> RuleResult<ResolvedOccurrence> {
        let mut visiting = Vec::new();
        self.resolve_inner(festival_id, year, &mut visiting)
    }

    fn resolve_inner(&self, festival_id: &str, year: i32, visiting: &mut Vec<String>) -> RuleResult<ResolvedOccurrence> {
        let id = self.catalog.canonical_id(festival_id);
        let def = self
            .catalog
            .get(&id)
            .ok_or_else(|| RuleExecutionError::UnknownFestival(festival_id.to_string()))?;

        if let Some(date) = self.overrides.lookup(&def.id, year) {
            debug!(festival_id = %def.id, year, %date, "override");
            return finish(def, year, Hit { date, method: MethodTag::Override, confidence: OccurrenceConfidence::Official });
        }

        let rule = match &def.body {
            RuleBody::Executable(rule) => rule,
            RuleBody::Provisional { reason } => return Err(RuleExecutionError::not_executable(&def.id, reason.clone())),
        };

        if visiting.contains(&def.id) {
            let chain = visiting.join(" -> ");
            return Err(RuleExecutionError::not_executable(&def.id, format!("relative rule cycle: {} -> {}", chain, def.id)));
        }
        visiting.push(def.id.clone());
        let hit = self.execute(def, rule, year, visiting);
        visiting.pop();

        let hit = hit?;
        trace!(festival_id = %def.id, year, date = %hit.date, method = %hit.method, "resolved");
        finish(def, year, hit)
    }

    fn execute(&self, def: &FestivalDefinition, rule: &FestivalRule, year: i32, visiting: &mut Vec<String>) -> RuleResult<Hit> {
        let id = def.id.as_str();
        let method = rule.template();
        match rule {
            FestivalRule::Lunar { month: MonthRef::Lunar(month), tithi, adhik_policy } => {
                let date = self.lunar_tithi_window(id, *month, *tithi, *adhik_policy, year)?;
                Ok(Hit { date, method, confidence: OccurrenceConfidence::Computed })
            }
            FestivalRule::Lunar { month: MonthRef::Bs(month), tithi, .. } => {
                let (date, confidence) = self.lunar_bs_month(id, *month, *tithi, year)?;
                Ok(Hit { date, method, confidence: OccurrenceConfidence::Computed.weakest(confidence) })
            }
            FestivalRule::Solar(SolarRule::Event(SolarEvent::MeshSankranti)) => {
                let (date, confidence) =
                    self.sankranti_day(year + 57, BsMonth::Baishakh, || sankranti::mesh_sankranti(&self.sky, year))?;
                Ok(Hit { date, method, confidence })
            }
            FestivalRule::Solar(SolarRule::Event(SolarEvent::MakaraSankranti)) => {
                let (date, confidence) =
                    self.sankranti_day(year + 56, BsMonth::Magh, || sankranti::makara_sankranti(&self.sky, year))?;
                Ok(Hit { date, method, confidence })
            }
            FestivalRule::Solar(SolarRule::Event(SolarEvent::MonthStart(month))) => {
                let (date, confidence) = self.solar_day(id, *month, 1, year)?;
                Ok(Hit { date, method, confidence })
            }
            FestivalRule::Solar(SolarRule::FixedDay { month, day }) => {
                let (date, confidence) = self.solar_day(id, *month, *day, year)?;
                Ok(Hit { date, method, confidence })
            }
            FestivalRule::Transit { target } => {
                let date = self.solar_transit(id, *target, year)?;
                Ok(Hit { date, method, confidence: OccurrenceConfidence::Computed })
            }
            FestivalRule::Relative { anchor, offset_days } => self.relative(id, anchor, *offset_days, year, visiting),
            FestivalRule::Override(OverrideRule::Dates(dates)) => {
                let date = *dates.get(&year).ok_or_else(|| RuleExecutionError::no_occurrence(id, year))?;
                Ok(Hit { date, method, confidence: OccurrenceConfidence::Official })
            }
            FestivalRule::Override(OverrideRule::BsFixed(bs)) => {
                let (date, confidence) = self.converter.bs_to_gregorian_with_confidence(*bs)?;
                if date.year() != year {
                    return Err(RuleExecutionError::no_occurrence(id, year));
                }
                Ok(Hit { date, method, confidence: from_conversion(confidence) })
            }
        }
    }

    /// Udaya day of `tithi` inside the lunar months named `month`, earliest
    /// qualifying date in `year`.
    fn lunar_tithi_window(
        &self,
        id: &str,
        month: BsMonth,
        tithi: Tithi,
        policy: AdhikPolicy,
        year: i32,
    ) -> RuleResult<NaiveDate> {
        let from = utc_midnight(jan_first(year)?) - Duration::days(i64::from(self.lunar_lookback_days));
        let to = utc_midnight(jan_first(year + 1)?);
        let months = match months_between(&self.sky, from, to) {
            Ok(months) => months,
            Err(e @ ParvaError::UndefinedLunarMonth { .. }) => {
                return Err(RuleExecutionError::not_executable(id, e.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut best: Option<NaiveDate> = None;
        for m in months.iter().filter(|m| m.month == month && policy.admits(m.is_adhik)) {
            let Some(day) = tithi_in_window(&self.sky, tithi, m.start, m.end, self.reference, self.civil)? else {
                trace!(month = %m.name, %tithi, "tithi not in month");
                continue;
            };
            if day.date.year() == year {
                best = Some(best.map_or(day.date, |b| b.min(day.date)));
            }
        }
        best.ok_or_else(|| RuleExecutionError::no_occurrence(id, year))
    }

    /// Udaya day of `tithi` among the days of the solar BS `month`.
    fn lunar_bs_month(
        &self,
        id: &str,
        month: BsMonth,
        tithi: Tithi,
        year: i32,
    ) -> RuleResult<(NaiveDate, OccurrenceConfidence)> {
        for bs_year in bs_year_candidates(year, month) {
            let (first, confidence) = self.converter.month_start(bs_year, month.number())?;
            let length = self.converter.days_in_month(bs_year, month.number())?;
            let last = first + Duration::days(i64::from(length) - 1);
            if first.year() > year || last.year() < year {
                continue;
            }

            let window_end = self.civil_midnight(last + Duration::days(1));
            let mut cursor = self.civil_midnight(first) - Duration::days(BS_MONTH_LOOKBACK_DAYS);
            while let Some(day) = tithi_in_window(&self.sky, tithi, cursor, window_end, self.reference, self.civil)? {
                if day.date >= first && day.date <= last && day.date.year() == year {
                    return Ok((day.date, from_conversion(confidence)));
                }
                cursor = day.ends_at;
            }
        }
        Err(RuleExecutionError::no_occurrence(id, year))
    }

    /// Civil day of a festival sankranti opening BS `month` of `bs_year`.
    ///
    /// Table years read the published month start. Other years date the
    /// detected sankranti with the sunrise rule.
    fn sankranti_day<F>(&self, bs_year: i32, month: BsMonth, detect: F) -> RuleResult<(NaiveDate, OccurrenceConfidence)>
    where
        F: FnOnce() -> Result<SankrantiEvent, ParvaError>,
    {
        if self.converter.table().covers_year(bs_year) {
            let (date, confidence) = self.converter.month_start(bs_year, month.number())?;
            return Ok((date, from_conversion(confidence)));
        }
        self.converter.check_year_span(bs_year)?;
        let event = detect()?;
        let date = self.converter.sankranti_month_start(&event)?;
        trace!(%month, instant = %event.instant, %date, "sankranti outside table");
        Ok((date, from_conversion(self.converter.confidence_for_year(bs_year))))
    }

    /// Gregorian date of `day` of the BS `month` falling in `year`.
    fn solar_day(&self, id: &str, month: BsMonth, day: u8, year: i32) -> RuleResult<(NaiveDate, OccurrenceConfidence)> {
        for bs_year in bs_year_candidates(year, month) {
            match self.converter.bs_to_gregorian_with_confidence(BsDate::new(bs_year, month.number(), day)) {
                Ok((date, confidence)) if date.year() == year => return Ok((date, from_conversion(confidence))),
                Ok(_) => {}
                // This year's month is shorter; another candidate may still fit.
                Err(ParvaError::InvalidBsDate { .. }) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Err(RuleExecutionError::no_occurrence(id, year))
    }

    fn solar_transit(&self, id: &str, target: TransitTarget, year: i32) -> RuleResult<NaiveDate> {
        let from = self.civil_midnight(jan_first(year)?);
        let instant = match target {
            TransitTarget::Rashi(rashi) => sankranti::find_sankranti(&self.sky, rashi, from)?.instant,
            TransitTarget::Longitude(longitude) => self.sky.coarse_solver().find_angle(
                |t| self.sky.sun_sidereal(t),
                from,
                longitude,
                Direction::Forward,
                SIGN_SCAN_DAYS,
            )?,
        };
        let date = civil_date(instant, self.civil);
        if date.year() != year {
            return Err(RuleExecutionError::no_occurrence(id, year));
        }
        Ok(date)
    }

    /// Anchor's start plus an offset. The result belongs to the anchor's
    /// year even if the offset crosses into a neighbour.
    fn relative(&self, id: &str, anchor: &str, offset_days: i32, year: i32, visiting: &mut Vec<String>) -> RuleResult<Hit> {
        let anchor_id = self.catalog.canonical_id(anchor);
        if self.catalog.get(&anchor_id).is_none() {
            return Err(RuleExecutionError::not_executable(id, format!("anchor '{}' is not in the catalog", anchor)));
        }
        let base = match self.resolve_inner(&anchor_id, year, visiting) {
            Ok(occ) => occ,
            Err(RuleExecutionError::NoOccurrenceInYear { .. }) => return Err(RuleExecutionError::no_occurrence(id, year)),
            Err(RuleExecutionError::NotExecutable { reason, .. }) => {
                return Err(RuleExecutionError::not_executable(id, format!("anchor '{}': {}", anchor_id, reason)));
            }
            Err(e) => return Err(e),
        };
        let date = base
            .start_date
            .checked_add_signed(Duration::days(i64::from(offset_days)))
            .ok_or_else(|| ParvaError::invalid_input(format!("offset {} from {} overflows", offset_days, base.start_date)))?;
        Ok(Hit { date, method: MethodTag::RelativeOffset, confidence: base.confidence })
    }

    /// Every festival in progress on `date`, ordered by id.
    #[instrument(skip(self), level = "debug")]
    pub fn festivals_on(&self, date: NaiveDate) -> RuleResult<Vec<ResolvedOccurrence>> {
        let mut found = Vec::new();
        for def in self.catalog.executable() {
            // Multi-day festivals that started last year still count.
            for year in [date.year(), date.year() - 1] {
                match self.resolve(&def.id, year) {
                    Ok(occ) if occ.contains(date) => {
                        found.push(occ);
                        break;
                    }
                    Ok(_) => {}
                    Err(e) if e.is_expected() => {}
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(found)
    }

    /// Festivals starting in `[from, from + days)`, by date then id.
    #[instrument(skip(self), level = "debug")]
    pub fn upcoming_festivals(&self, from: NaiveDate, days: u32) -> RuleResult<Vec<ResolvedOccurrence>> {
        let until = from
            .checked_add_days(Days::new(u64::from(days)))
            .ok_or_else(|| ParvaError::invalid_input(format!("{} days after {} overflows", days, from)))?;
        let mut found = Vec::new();
        for def in self.catalog.executable() {
            for year in (from.year() - 1)..=until.year() {
                match self.resolve(&def.id, year) {
                    Ok(occ) if occ.start_date >= from && occ.start_date < until => {
                        if !found.contains(&occ) {
                            found.push(occ);
                        }
                    }
                    Ok(_) => {}
                    Err(e) if e.is_expected() => {}
                    Err(e) => return Err(e),
                }
            }
        }
        found.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.festival_id.cmp(&b.festival_id)));
        Ok(found)
    }

    /// First occurrence starting strictly after `after`.
    ///
    /// # Errors
    /// `NoOccurrenceInYear` naming the last year searched when nothing turns
    /// up within the horizon.
    #[instrument(skip(self), level = "debug")]
    pub fn next_occurrence(&self, festival_id: &str, after: NaiveDate) -> RuleResult<ResolvedOccurrence> {
        let first = after.year();
        let last = first + NEXT_OCCURRENCE_HORIZON_YEARS;
        for year in first..=last {
            match self.resolve(festival_id, year) {
                Ok(occ) if occ.start_date > after => return Ok(occ),
                Ok(_) | Err(RuleExecutionError::NoOccurrenceInYear { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Err(RuleExecutionError::no_occurrence(self.catalog.canonical_id(festival_id), last))
    }

    fn civil_midnight(&self, date: NaiveDate) -> Instant {
        utc_midnight(date) - Duration::seconds(i64::from(self.civil.local_minus_utc()))
    }
}

fn finish(def: &FestivalDefinition, year: i32, hit: Hit) -> RuleResult<ResolvedOccurrence> {
    let end_date = hit
        .date
        .checked_add_days(Days::new(u64::from(def.duration_days.max(1)) - 1))
        .ok_or_else(|| ParvaError::invalid_input(format!("{} lasts past the calendar", def.id)))?;
    Ok(ResolvedOccurrence {
        festival_id: def.id.clone(),
        year,
        start_date: hit.date,
        end_date,
        method: hit.method,
        confidence: hit.confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use parva_astronomy::{AnalyticEphemeris, BoundarySolver, PositionProvider};
    use parva_calendar::{BsCalendarTable, build_month};
    use parva_types::{Body, ErrorKind, normalize_degrees};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn with_catalog(catalog: &RuleCatalog, f: impl FnOnce(&RuleEngine<'_>)) {
        let eph = AnalyticEphemeris::default();
        let table = BsCalendarTable::bundled().unwrap();
        let overrides = OverrideTable::bundled().unwrap();
        let sky = Sky::new(&eph, BoundarySolver::default());
        let converter = BsConverter::new(&table, sky).unwrap();
        let engine = RuleEngine::new(catalog, &overrides, converter, sky).unwrap();
        f(&engine);
    }

    fn with_engine(f: impl FnOnce(&RuleEngine<'_>)) {
        let catalog = RuleCatalog::bundled().unwrap();
        with_catalog(&catalog, f);
    }

    #[test]
    fn test_override_wins() {
        with_engine(|engine| {
            let occ = engine.resolve("dashain", 2025).unwrap();
            assert_eq!(occ.start_date, date(2025, 10, 2));
            assert_eq!(occ.method, MethodTag::Override);
            assert_eq!(occ.confidence, OccurrenceConfidence::Official);
            // Aliases reach the same entry.
            assert_eq!(engine.resolve("Vijaya_Dashami", 2025).unwrap(), occ);
        });
    }

    #[test]
    fn test_relative_inherits_anchor() {
        with_engine(|engine| {
            let fulpati = engine.resolve("fulpati", 2025).unwrap();
            assert_eq!(fulpati.start_date, date(2025, 9, 29));
            assert_eq!(fulpati.method, MethodTag::RelativeOffset);
            assert_eq!(fulpati.confidence, OccurrenceConfidence::Official);

            let tihar = engine.resolve("tihar", 2025).unwrap();
            assert_eq!(tihar.start_date, date(2025, 10, 19));
            assert_eq!(tihar.end_date, date(2025, 10, 23));
            assert_eq!(tihar.duration_days(), 5);
        });
    }

    #[test]
    fn test_lunar_window() {
        with_engine(|engine| {
            let ghatasthapana = engine.resolve("ghatasthapana", 2025).unwrap();
            assert_eq!(ghatasthapana.start_date, date(2025, 9, 22));
            assert_eq!(ghatasthapana.method, MethodTag::LunarTithiWindow);
            assert_eq!(ghatasthapana.confidence, OccurrenceConfidence::Computed);

            let buddha = engine.resolve("buddha-jayanti", 2025).unwrap();
            assert_eq!(buddha.start_date, date(2025, 5, 12));
        });
    }

    #[test]
    fn test_months_after_adhik_keep_observed_dates() {
        with_engine(|engine| {
            // 2023 carries Adhik Shrawan; the festivals of the regular
            // Shrawan and of Bhadra land on their observed days.
            let janai = engine.resolve("janai-purnima", 2023).unwrap();
            assert!(janai.start_date >= date(2023, 8, 30) && janai.start_date <= date(2023, 8, 31));
            let janmashtami = engine.resolve("krishna-janmashtami", 2023).unwrap();
            assert!(janmashtami.start_date >= date(2023, 9, 6) && janmashtami.start_date <= date(2023, 9, 7));
            let teej = engine.resolve("teej", 2023).unwrap();
            assert!(teej.start_date >= date(2023, 9, 17) && teej.start_date <= date(2023, 9, 18));
        });
    }

    #[test]
    fn test_adhik_only_policy() {
        with_engine(|engine| {
            let occ = engine.resolve("adhik-jestha-purnima", 2026).unwrap();
            assert!(occ.start_date >= date(2026, 5, 25) && occ.start_date <= date(2026, 6, 2));
            let err = engine.resolve("adhik-jestha-purnima", 2025).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NoOccurrenceInYear);
        });
    }

    #[test]
    fn test_lunar_bs_month() {
        with_engine(|engine| {
            let occ = engine.resolve("ghode-jatra", 2025).unwrap();
            assert_eq!(occ.method, MethodTag::LunarBsMonth);
            assert!(occ.start_date >= date(2025, 3, 28) && occ.start_date <= date(2025, 3, 30));
            assert_eq!(occ.confidence, OccurrenceConfidence::Computed);
        });
    }

    #[test]
    fn test_solar_templates() {
        with_engine(|engine| {
            let new_year = engine.resolve("bs-new-year", 2026).unwrap();
            assert_eq!(new_year.start_date, date(2026, 4, 14));
            assert_eq!(new_year.method, MethodTag::MeshSankranti);
            assert_eq!(new_year.confidence, OccurrenceConfidence::Official);

            assert_eq!(engine.resolve("maghe-sankranti", 2026).unwrap().start_date, date(2026, 1, 15));
            assert_eq!(engine.resolve("shrawan-sankranti", 2025).unwrap().start_date, date(2025, 7, 17));
            assert_eq!(engine.resolve("constitution-day", 2025).unwrap().start_date, date(2025, 9, 20));
            assert_eq!(engine.resolve("prithvi-jayanti", 2026).unwrap().start_date, date(2026, 1, 11));
        });
    }

    #[test]
    fn test_solar_outside_table_is_estimated() {
        with_engine(|engine| {
            let occ = engine.resolve("bs-new-year", 2045).unwrap();
            assert!(matches!(occ.confidence, OccurrenceConfidence::Estimated { .. }));
            assert_eq!(occ.start_date.month(), 4);

            // Dated from the detected ingress, in step with the BS model.
            let mesh = sankranti::mesh_sankranti(&engine.sky, 2045).unwrap();
            assert_eq!(occ.start_date, engine.converter.sankranti_month_start(&mesh).unwrap());
            assert_eq!(occ.start_date, engine.converter.year_start(2102).unwrap());

            let maghe = engine.resolve("maghe-sankranti", 2045).unwrap();
            assert_eq!(maghe.method, MethodTag::MakaraSankranti);
            let makara = sankranti::makara_sankranti(&engine.sky, 2045).unwrap();
            assert_eq!(maghe.start_date, engine.converter.sankranti_month_start(&makara).unwrap());
            assert_eq!(maghe.start_date, engine.converter.month_start(2101, 10).unwrap().0);
        });
    }

    #[test]
    fn test_transit() {
        with_engine(|engine| {
            let occ = engine.resolve("karkat-sankranti", 2025).unwrap();
            assert_eq!(occ.method, MethodTag::SolarTransit);
            assert!(occ.start_date >= date(2025, 7, 15) && occ.start_date <= date(2025, 7, 17));
        });
    }

    #[test]
    fn test_rule_overrides() {
        with_engine(|engine| {
            assert_eq!(engine.resolve("indra-jatra", 2025).unwrap().start_date, date(2025, 9, 6));
            assert_eq!(engine.resolve("indra-jatra", 2026).unwrap_err().kind(), ErrorKind::NoOccurrenceInYear);

            let election = engine.resolve("election-day-2082", 2026).unwrap();
            assert_eq!(election.start_date, date(2026, 3, 5));
            assert_eq!(election.method, MethodTag::OverrideBsFixed);
        });
    }

    #[test]
    fn test_failure_kinds() {
        with_engine(|engine| {
            let err = engine.resolve("gai-jatra", 2025).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::RuleNotExecutable);
            let err = engine.resolve("no-such-festival", 2025).unwrap_err();
            assert_eq!(err, RuleExecutionError::UnknownFestival("no-such-festival".into()));
            assert_eq!(err.kind(), ErrorKind::InvalidInput);
        });
    }

    /// Moon that falls back through conjunction a few days after each new
    /// moon, leaving a window with no full moon in it.
    #[derive(Debug)]
    struct Stutter;

    impl Stutter {
        const SYNODIC_DAYS: f64 = 29.530588;

        fn days(at: Instant) -> f64 {
            (at - Utc.with_ymd_and_hms(2000, 1, 6, 18, 14, 0).unwrap()).num_seconds() as f64 / 86_400.0
        }

        /// Rises to 15, falls to -15, then climbs to 360 over one lunation.
        fn elongation(at: Instant) -> f64 {
            let phase = (Self::days(at) / Self::SYNODIC_DAYS).rem_euclid(1.0);
            if phase < 0.1 {
                150.0 * phase
            } else if phase < 0.2 {
                15.0 - 300.0 * (phase - 0.1)
            } else {
                -15.0 + 375.0 / 0.8 * (phase - 0.2)
            }
        }
    }

    impl PositionProvider for Stutter {
        fn tropical_longitude(&self, body: Body, at: Instant) -> Result<f64, ParvaError> {
            let sun = 280.0 + 0.9856 * Self::days(at);
            Ok(normalize_degrees(match body {
                Body::Sun => sun,
                Body::Moon => sun + Self::elongation(at),
            }))
        }

        fn ayanamsa(&self, _at: Instant) -> Result<f64, ParvaError> {
            Ok(0.0)
        }

        fn sunrise(&self, date: NaiveDate, _coord: GeoCoordinate) -> Result<Instant, ParvaError> {
            Ok(Utc.from_utc_datetime(&date.and_hms_opt(0, 15, 0).unwrap()))
        }
    }

    #[test]
    fn test_month_without_purnima_not_executable() {
        let provider = Stutter;
        let sky = Sky::new(&provider, BoundarySolver::default());

        // Conjunction at the 2025-01-29 cycle start, and the spurious one
        // about 4.4 days later.
        let start = Utc.with_ymd_and_hms(2025, 1, 29, 12, 0, 0).unwrap();
        let spurious = start + Duration::days(4);
        let err = build_month(&sky, start, spurious).unwrap_err();
        assert!(matches!(err, ParvaError::UndefinedLunarMonth { .. }));

        let catalog = RuleCatalog::bundled().unwrap();
        let table = BsCalendarTable::bundled().unwrap();
        let overrides = OverrideTable::empty();
        let engine = RuleEngine::new(&catalog, &overrides, BsConverter::new(&table, sky).unwrap(), sky).unwrap();
        let err = engine.resolve("janai-purnima", 2025).unwrap_err();
        assert!(matches!(err, RuleExecutionError::NotExecutable { ref festival_id, .. } if festival_id == "janai-purnima"));
        assert_eq!(err.kind(), ErrorKind::RuleNotExecutable);
        assert!(err.is_expected());
    }

    #[test]
    fn test_relative_cycle_not_executable() {
        let json = r#"{"festivals": [
            {"festival_id": "a", "name_en": "A", "rule_type": "relative", "rule": {"relative_to": "b", "offset_days": 1}},
            {"festival_id": "b", "name_en": "B", "rule_type": "relative", "rule": {"relative_to": "a", "offset_days": 1}},
            {"festival_id": "c", "name_en": "C", "rule_type": "relative", "rule": {"relative_to": "missing", "offset_days": 1}}
        ]}"#;
        let catalog = RuleCatalog::from_json_str(json).unwrap();
        with_catalog(&catalog, |engine| {
            let err = engine.resolve("a", 2025).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::RuleNotExecutable);
            assert!(err.to_string().contains("cycle"));
            assert_eq!(engine.resolve("c", 2025).unwrap_err().kind(), ErrorKind::RuleNotExecutable);
        });
    }

    #[test]
    fn test_queries() {
        with_engine(|engine| {
            let on = engine.festivals_on(date(2025, 10, 21)).unwrap();
            let ids: Vec<_> = on.iter().map(|o| o.festival_id.as_str()).collect();
            assert!(ids.contains(&"laxmi-puja"));
            assert!(ids.contains(&"tihar"));

            let upcoming = engine.upcoming_festivals(date(2025, 9, 20), 20).unwrap();
            let ids: Vec<_> = upcoming.iter().map(|o| o.festival_id.as_str()).collect();
            let pos = |id: &str| ids.iter().position(|i| *i == id).unwrap();
            assert!(pos("ghatasthapana") < pos("fulpati"));
            assert!(pos("fulpati") < pos("dashain"));
            assert!(upcoming.windows(2).all(|w| w[0].start_date <= w[1].start_date));

            let next = engine.next_occurrence("dashain", date(2025, 10, 2)).unwrap();
            assert!(next.start_date > date(2025, 10, 2));
            assert_eq!(next.year, 2026);
        });
    }

    #[test]
    fn test_candidates_cover_year_boundary() {
        assert_eq!(bs_year_candidates(2026, BsMonth::Poush), [2083, 2082, 2084]);
        assert_eq!(bs_year_candidates(2026, BsMonth::Magh), [2082, 2081, 2083]);
    }
}
