//! Day-of-year normalization.
//!
//! Each adjusted temperature is rescaled against the lowest and highest
//! adjusted temperature ever seen on the same day of the year, across every
//! year in the dataset. The range of a day is only known once the whole
//! dataset has been seen, so this is an explicit two-pass stage:
//!
//! 1. [`DayOfYearNormalizer::compute_stats`] builds [`DayOfYearStats`]
//! 2. [`DayOfYearNormalizer::normalize`] maps every observation into `[0, 1]`
//!
//! Pass 2 takes the finished statistics by reference; there is no way to
//! normalize against a partial table.
use std::ops::RangeInclusive;

use tracing::{info, warn};

use crate::error::CalculationError;
use crate::time::day_of_year;
use crate::types::{AdjustedObservation, NormalizedObservation};

/// Largest day-of-year index.
pub const MAX_DAY_OF_YEAR: u32 = 366;

/// Value assigned when a day's range is degenerate (`max == min`).
pub const DEGENERATE_FALLBACK: f64 = 0.5;

/// Observed range of adjusted temperatures on one day of the year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayRange {
    /// Lowest adjusted temperature, °C
    pub min: f64,
    /// Highest adjusted temperature, °C
    pub max: f64,
    /// Number of observations
    pub count: usize,
}

impl DayRange {
    fn new(value: f64) -> Self {
        Self {
            min: value,
            max: value,
            count: 1,
        }
    }

    fn include(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.count += 1;
    }

    /// Whether `max == min`, in which case [`normalize`](Self::normalize) returns `0.5`.
    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }

    /// `clamp((value - min) / (max - min), 0, 1)`, or `0.5` for a degenerate range.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            DEGENERATE_FALLBACK
        } else {
            ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        }
    }
}

/// Per-day-of-year temperature ranges, indexed `1..=366`.
#[derive(Debug, Clone, PartialEq)]
pub struct DayOfYearStats {
    days: Vec<Option<DayRange>>,
}

impl Default for DayOfYearStats {
    fn default() -> Self {
        Self {
            days: vec![None; MAX_DAY_OF_YEAR as usize + 1],
        }
    }
}

impl DayOfYearStats {
    /// Range for day-of-year `doy`, if any observation fell on it.
    pub fn get(&self, doy: u32) -> Option<&DayRange> {
        self.days.get(doy as usize).and_then(Option::as_ref)
    }

    /// Number of days with at least one observation.
    pub fn observed_days(&self) -> usize {
        self.days.iter().filter(|d| d.is_some()).count()
    }

    /// `(doy, range)` for every observed day, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &DayRange)> {
        self.days
            .iter()
            .enumerate()
            .filter_map(|(doy, range)| range.as_ref().map(|r| (doy as u32, r)))
    }

    fn include(&mut self, doy: u32, value: f64) {
        if let Some(slot) = self.days.get_mut(doy as usize) {
            match slot {
                Some(range) => range.include(value),
                None => *slot = Some(DayRange::new(value)),
            }
        }
    }
}

/// Result of pass 2.
#[derive(Debug, Clone, Default)]
pub struct NormalizationOutput {
    /// Normalized observations in input order
    pub records: Vec<NormalizedObservation>,
    /// Observations dropped because their day of year was out of bounds
    pub skipped: usize,
}

/// Two-pass day-of-year normalizer.
#[derive(Debug, Clone)]
pub struct DayOfYearNormalizer {
    bounds: RangeInclusive<u32>,
}

impl Default for DayOfYearNormalizer {
    fn default() -> Self {
        Self {
            bounds: 1..=MAX_DAY_OF_YEAR,
        }
    }
}

impl DayOfYearNormalizer {
    /// Restricts normalization to day-of-year indices in `[min_doy, max_doy]`.
    ///
    /// # Errors
    ///
    /// [`CalculationError::InvalidParameter`] unless `1 <= min_doy <= max_doy <= 366`.
    pub fn with_bounds(min_doy: u32, max_doy: u32) -> Result<Self, CalculationError> {
        if !(1..=MAX_DAY_OF_YEAR).contains(&min_doy) {
            return Err(CalculationError::InvalidParameter {
                name: "min_day_of_year",
                value: f64::from(min_doy),
            });
        }
        if !(min_doy..=MAX_DAY_OF_YEAR).contains(&max_doy) {
            return Err(CalculationError::InvalidParameter {
                name: "max_day_of_year",
                value: f64::from(max_doy),
            });
        }
        Ok(Self {
            bounds: min_doy..=max_doy,
        })
    }

    fn admitted_day(&self, observation: &AdjustedObservation) -> Option<u32> {
        let raw = &observation.raw;
        day_of_year(raw.year, raw.month, raw.day)
            .ok()
            .filter(|doy| self.bounds.contains(doy))
    }

    /// Pass 1: min, max and count of adjusted temperature per day of year.
    ///
    /// Observations whose day of year is invalid or outside the bounds are
    /// skipped.
    pub fn compute_stats(&self, observations: &[AdjustedObservation]) -> DayOfYearStats {
        let mut stats = DayOfYearStats::default();
        for observation in observations {
            if let Some(doy) = self.admitted_day(observation) {
                stats.include(doy, observation.adjusted_temp_c);
            }
        }
        info!(observed_days = stats.observed_days(), "computed day-of-year ranges");
        stats
    }

    /// Pass 2: rescale every observation against its day's range.
    ///
    /// Observations with no range in `stats` are skipped and counted.
    pub fn normalize(&self, stats: &DayOfYearStats, observations: &[AdjustedObservation]) -> NormalizationOutput {
        let mut output = NormalizationOutput {
            records: Vec::with_capacity(observations.len()),
            skipped: 0,
        };
        for observation in observations {
            let Some((doy, range)) = self
                .admitted_day(observation)
                .and_then(|doy| stats.get(doy).map(|range| (doy, range)))
            else {
                output.skipped += 1;
                continue;
            };
            output.records.push(NormalizedObservation {
                adjusted: *observation,
                day_of_year: doy,
                normalized: range.normalize(observation.adjusted_temp_c),
            });
        }
        if output.skipped > 0 {
            warn!(skipped = output.skipped, "observations without a day-of-year range");
        }
        output
    }

    /// Runs both passes over the full dataset.
    pub fn run(&self, observations: &[AdjustedObservation]) -> (DayOfYearStats, NormalizationOutput) {
        let stats = self.compute_stats(observations);
        let output = self.normalize(&stats, observations);
        (stats, output)
    }
}
