//! Monthly aggregation of normalized values.
//!
//! Normalized observations are averaged per `(year, month)`. The result is
//! exposed two ways: twelve calendar-month series for seasonal comparison,
//! and one chronological timeline that feeds the periodicity analysis.
//! Months without observations never appear in either.
use std::collections::BTreeMap;

use tracing::info;

use crate::math::LinearTrend;
use crate::time::fractional_year_of_month;
use crate::types::NormalizedObservation;

/// Three-letter month names, index 0 is January.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Running sum of the normalized values of one `(year, month)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MonthlyMean {
    /// Sum of normalized values
    pub sum: f64,
    /// Number of values
    pub count: usize,
}

impl MonthlyMean {
    /// Adds one value.
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// `sum / count`, `None` when empty.
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// One month of the aggregated series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyPoint {
    /// Calendar year
    pub year: i32,
    /// Month, 1..=12
    pub month: u32,
    /// `year + (month - 1) / 12`
    pub fractional_year: f64,
    /// Mean normalized value of the month
    pub mean: f64,
}

/// Chronological monthly series, ascending by fractional year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySeries {
    points: Vec<MonthlyPoint>,
}

impl MonthlySeries {
    /// Builds a series from points in any order.
    pub fn from_points(mut points: Vec<MonthlyPoint>) -> Self {
        points.sort_by(|a, b| a.fractional_year.total_cmp(&b.fractional_year));
        Self { points }
    }

    /// Points in chronological order.
    pub fn points(&self) -> &[MonthlyPoint] {
        &self.points
    }

    /// Number of months present.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no month is present.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Least-squares trend of the monthly means over fractional year.
    pub fn linear_trend(&self) -> Option<LinearTrend> {
        let xy: Vec<(f64, f64)> = self.points.iter().map(|p| (p.fractional_year, p.mean)).collect();
        LinearTrend::fit(&xy)
    }
}

/// Year-by-year means of one calendar month.
///
/// Only [`MonthlyAggregator::by_calendar_month`] builds these, so the month is
/// always in `1..=12`.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarMonthSeries {
    month: u32,
    /// `(year, mean)` ascending by year
    pub points: Vec<(i32, f64)>,
}

impl CalendarMonthSeries {
    /// Month, 1..=12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Three-letter month name.
    pub fn name(&self) -> &'static str {
        MONTH_NAMES
            .get((self.month as usize).wrapping_sub(1))
            .copied()
            .unwrap_or("???")
    }
}

/// Accumulates normalized observations into `(year, month)` means.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyAggregator {
    months: BTreeMap<(i32, u32), MonthlyMean>,
}

impl MonthlyAggregator {
    /// Aggregates a batch of normalized observations.
    pub fn from_observations(observations: &[NormalizedObservation]) -> Self {
        let mut aggregator = Self::default();
        aggregator.extend(observations);
        info!(months = aggregator.months.len(), "aggregated monthly means");
        aggregator
    }

    /// Adds one observation.
    pub fn add(&mut self, observation: &NormalizedObservation) {
        self.add_value(observation.year(), observation.month(), observation.normalized);
    }

    /// Adds a value to `(year, month)` directly.
    pub fn add_value(&mut self, year: i32, month: u32, value: f64) {
        self.months.entry((year, month)).or_default().add(value);
    }

    /// Adds every observation of a batch.
    pub fn extend<'a>(&mut self, observations: impl IntoIterator<Item = &'a NormalizedObservation>) {
        for observation in observations {
            self.add(observation);
        }
    }

    /// Number of `(year, month)` entries with data.
    pub fn len(&self) -> usize {
        self.months.values().filter(|m| m.count > 0).count()
    }

    /// Whether no month has data.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mean of `(year, month)`, if observed.
    pub fn mean(&self, year: i32, month: u32) -> Option<f64> {
        self.months.get(&(year, month)).and_then(MonthlyMean::mean)
    }

    /// `((year, month), mean)` for every observed month in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = ((i32, u32), f64)> + '_ {
        self.months
            .iter()
            .filter_map(|(&key, acc)| acc.mean().map(|mean| (key, mean)))
    }

    /// First and last year with data.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        let mut years = self.iter().map(|((year, _), _)| year);
        let first = years.next()?;
        let last = years.last().unwrap_or(first);
        Some((first, last))
    }

    /// Twelve series, one per calendar month, each with x = year and y = mean.
    ///
    /// Months that were never observed yield an empty series.
    pub fn by_calendar_month(&self) -> Vec<CalendarMonthSeries> {
        let mut series: Vec<CalendarMonthSeries> = (1..=12)
            .map(|month| CalendarMonthSeries {
                month,
                points: Vec::new(),
            })
            .collect();
        for ((year, month), mean) in self.iter() {
            if let Some(s) = series.get_mut((month as usize).wrapping_sub(1)) {
                s.points.push((year, mean));
            }
        }
        series
    }

    /// All observed months in succession across years.
    pub fn timeline(&self) -> MonthlySeries {
        MonthlySeries::from_points(
            self.iter()
                .map(|((year, month), mean)| MonthlyPoint {
                    year,
                    month,
                    fractional_year: fractional_year_of_month(year, month),
                    mean,
                })
                .collect(),
        )
    }
}
