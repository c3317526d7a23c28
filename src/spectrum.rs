//! Frequency analysis of the monthly series.
//!
//! The monthly means are laid on a uniform grid covering every month from
//! January of the first year to December of the last. Missing months are
//! zero-filled, the grid's own mean is subtracted, and the one-sided power
//! spectrum of its DFT is folded into a periodogram over period in years.
//!
//! Zero-filling conflates "no data" with a real value, so gap-heavy series
//! leak data-availability patterns into the spectrum. Consumers usually read
//! the periodogram only over 2–20 years for that reason.
use chrono::{Datelike, NaiveDate};
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use tracing::info;

use crate::config::PeriodogramConfig;
use crate::error::CalculationError;
use crate::math::mean;
use crate::monthly::{MonthlyAggregator, MonthlySeries};

/// Samples per year of the monthly grid.
pub const SAMPLES_PER_YEAR: f64 = 12.0;

/// Period window consumers typically inspect, in years.
pub const MULTI_YEAR_WINDOW: (f64, f64) = (2.0, 20.0);

/// Longest span of years a grid may cover: the whole calendar range chrono
/// represents, which is also the range ingestion admits.
fn max_grid_years() -> i64 {
    i64::from(NaiveDate::MAX.year()) - i64::from(NaiveDate::MIN.year()) + 1
}

/// Every month between the first and last observed year, gaps zero-filled.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformMonthlyGrid {
    start_year: i32,
    values: Vec<f64>,
    observed: Vec<bool>,
}

impl UniformMonthlyGrid {
    /// Grid index of `(year, month)` relative to `start_year`.
    pub fn index_of(start_year: i32, year: i32, month: u32) -> Option<usize> {
        let years = usize::try_from(year.checked_sub(start_year)?).ok()?;
        (1..=12).contains(&month).then(|| years * 12 + (month - 1) as usize)
    }

    fn from_months(months: Vec<((i32, u32), f64)>) -> Result<Option<Self>, CalculationError> {
        let (Some(first), Some(last)) = (
            months.iter().map(|((year, _), _)| *year).min(),
            months.iter().map(|((year, _), _)| *year).max(),
        ) else {
            return Ok(None);
        };
        let span = i64::from(last) - i64::from(first) + 1;
        let len = (span <= max_grid_years())
            .then(|| usize::try_from(span).ok()?.checked_mul(12))
            .flatten()
            .ok_or(CalculationError::InvalidInput {
                field: "year_span",
                value: span as f64,
            })?;

        let mut values = vec![0.0; len];
        let mut observed = vec![false; len];
        for ((year, month), value) in months {
            if let Some(idx) = Self::index_of(first, year, month) {
                values[idx] = value;
                observed[idx] = true;
            }
        }
        Ok(Some(Self {
            start_year: first,
            values,
            observed,
        }))
    }

    /// Builds the grid from aggregated monthly means. `None` if there are none.
    ///
    /// # Errors
    ///
    /// [`CalculationError::InvalidInput`] (`year_span`) if the years span more
    /// than the calendar range accepted by [`day_of_year`](crate::time::day_of_year).
    pub fn from_aggregator(aggregator: &MonthlyAggregator) -> Result<Option<Self>, CalculationError> {
        Self::from_months(aggregator.iter().collect())
    }

    /// Builds the grid from a monthly series. `None` if it is empty.
    ///
    /// # Errors
    ///
    /// As [`from_aggregator`](Self::from_aggregator).
    pub fn from_series(series: &MonthlySeries) -> Result<Option<Self>, CalculationError> {
        Self::from_months(series.points().iter().map(|p| ((p.year, p.month), p.mean)).collect())
    }

    /// First year covered.
    pub fn start_year(&self) -> i32 {
        self.start_year
    }

    /// Grid values, zero at gaps.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of months on the grid, `12 · (last - first + 1)`.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false for a constructed grid.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether index `idx` holds a zero-filled gap.
    pub fn is_gap(&self, idx: usize) -> bool {
        !self.observed.get(idx).copied().unwrap_or(false)
    }

    /// Number of zero-filled months.
    pub fn gap_count(&self) -> usize {
        self.observed.iter().filter(|o| !**o).count()
    }

    /// Mean over the whole grid, gaps included.
    pub fn mean(&self) -> f64 {
        mean(&self.values).unwrap_or(0.0)
    }

    /// Grid values minus the grid mean.
    pub fn detrended(&self) -> Vec<f64> {
        let m = self.mean();
        self.values.iter().map(|v| v - m).collect()
    }
}

/// One bin of the one-sided power spectrum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumBin {
    /// Frequency in cycles per year
    pub frequency: f64,
    /// `re² + im²` of the DFT coefficient
    pub power: f64,
}

/// One-sided power spectrum of a monthly series, `N / 2` bins over `[0, 6)` cycles per year.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencySpectrum {
    bins: Vec<SpectrumBin>,
    sample_count: usize,
}

impl FrequencySpectrum {
    /// Computes the power spectrum of a real series sampled monthly.
    ///
    /// Bin `i` has frequency `i · 12 / N` cycles per year and power
    /// `|X_i|²` of the unnormalized forward DFT.
    pub fn compute(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self {
                bins: Vec::new(),
                sample_count: 0,
            };
        }
        let mut buffer: Vec<Complex<f64>> = samples.iter().map(|&x| Complex::new(x, 0.0)).collect();
        FftPlanner::new().plan_fft_forward(n).process(&mut buffer);

        let bins = buffer
            .iter()
            .take(n / 2)
            .enumerate()
            .map(|(i, c)| SpectrumBin {
                frequency: i as f64 * SAMPLES_PER_YEAR / n as f64,
                power: c.norm_sqr(),
            })
            .collect();
        Self { bins, sample_count: n }
    }

    /// Bins in ascending frequency.
    pub fn bins(&self) -> &[SpectrumBin] {
        &self.bins
    }

    /// Length `N` of the transformed series.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Nyquist frequency in cycles per year.
    pub fn nyquist(&self) -> f64 {
        SAMPLES_PER_YEAR / 2.0
    }

    /// Strongest non-zero-frequency bin.
    pub fn peak(&self) -> Option<SpectrumBin> {
        self.bins
            .iter()
            .skip(1)
            .copied()
            .max_by(|a, b| a.power.total_cmp(&b.power))
    }
}

/// Spectral power accumulated into uniform period buckets.
#[derive(Debug, Clone, PartialEq)]
pub struct Periodogram {
    min_period: f64,
    max_period: f64,
    power: Vec<f64>,
}

impl Periodogram {
    /// Empty periodogram over `[min_period, max_period]` years.
    ///
    /// # Errors
    ///
    /// [`CalculationError::InvalidParameter`] for a non-positive, non-finite
    /// or empty range, or zero buckets.
    pub fn new(config: PeriodogramConfig) -> Result<Self, CalculationError> {
        config.validate()?;
        Ok(Self {
            min_period: config.min_period_years,
            max_period: config.max_period_years,
            power: vec![0.0; config.buckets],
        })
    }

    /// Folds a spectrum through `T = 1 / f`, skipping the zero-frequency bin.
    ///
    /// # Errors
    ///
    /// As [`Periodogram::new`].
    pub fn from_spectrum(spectrum: &FrequencySpectrum, config: PeriodogramConfig) -> Result<Self, CalculationError> {
        let mut periodogram = Self::new(config)?;
        for bin in spectrum.bins().iter().skip(1) {
            if bin.frequency > 0.0 {
                periodogram.accumulate(1.0 / bin.frequency, bin.power);
            }
        }
        Ok(periodogram)
    }

    fn bucket_width(&self) -> f64 {
        (self.max_period - self.min_period) / self.power.len() as f64
    }

    /// Bucket holding `period`, or `None` outside `[min_period, max_period]`.
    ///
    /// A period equal to the upper bound lands in the last bucket.
    pub fn bucket_of(&self, period: f64) -> Option<usize> {
        if !(self.min_period..=self.max_period).contains(&period) {
            return None;
        }
        let idx = ((period - self.min_period) / self.bucket_width()) as usize;
        Some(idx.min(self.power.len() - 1))
    }

    /// Adds `power` to the bucket of `period`. Returns false if the period is out of range.
    pub fn accumulate(&mut self, period: f64, power: f64) -> bool {
        match self.bucket_of(period) {
            Some(idx) => {
                self.power[idx] += power;
                true
            }
            None => false,
        }
    }

    /// Number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.power.len()
    }

    /// Period range `(min, max)` in years.
    pub fn range(&self) -> (f64, f64) {
        (self.min_period, self.max_period)
    }

    /// Centre of bucket `idx` in years.
    pub fn bucket_center(&self, idx: usize) -> f64 {
        self.min_period + (idx as f64 + 0.5) * self.bucket_width()
    }

    /// Lower and upper edge of bucket `idx` in years.
    pub fn bucket_edges(&self, idx: usize) -> (f64, f64) {
        let w = self.bucket_width();
        let lo = self.min_period + idx as f64 * w;
        (lo, lo + w)
    }

    /// Accumulated power per bucket.
    pub fn powers(&self) -> &[f64] {
        &self.power
    }

    /// Sum of all accumulated power.
    pub fn total_power(&self) -> f64 {
        self.power.iter().sum()
    }

    /// `(bucket centre, power)` for every bucket.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.power
            .iter()
            .enumerate()
            .map(|(idx, &p)| (self.bucket_center(idx), p))
    }

    /// Bucket centre with the most power among centres in `[min, max]` years.
    ///
    /// `None` if no bucket in the window holds any power.
    pub fn dominant_period(&self, min: f64, max: f64) -> Option<(f64, f64)> {
        self.bins()
            .filter(|&(period, power)| (min..=max).contains(&period) && power > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}

/// Everything the periodicity analysis produces.
#[derive(Debug, Clone)]
pub struct PeriodicityReport {
    /// Zero-filled monthly grid
    pub grid: UniformMonthlyGrid,
    /// Grid minus its mean, the DFT input
    pub detrended: Vec<f64>,
    /// One-sided power spectrum
    pub spectrum: FrequencySpectrum,
    /// Power by period
    pub periodogram: Periodogram,
}

/// Grid → detrend → DFT → periodogram.
#[derive(Debug, Clone, Default)]
pub struct PeriodicityAnalyzer {
    config: PeriodogramConfig,
}

impl PeriodicityAnalyzer {
    /// Analyzer with a custom periodogram range.
    ///
    /// # Errors
    ///
    /// [`CalculationError::InvalidParameter`] for an invalid range.
    pub fn new(config: PeriodogramConfig) -> Result<Self, CalculationError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Runs the analysis on aggregated monthly means. `None` if there is no data.
    ///
    /// # Errors
    ///
    /// As [`UniformMonthlyGrid::from_aggregator`] and [`Periodogram::new`].
    pub fn analyze(&self, aggregator: &MonthlyAggregator) -> Result<Option<PeriodicityReport>, CalculationError> {
        match UniformMonthlyGrid::from_aggregator(aggregator)? {
            Some(grid) => self.analyze_grid(grid).map(Some),
            None => Ok(None),
        }
    }

    /// Runs the analysis on a prepared grid.
    ///
    /// # Errors
    ///
    /// As [`Periodogram::new`].
    pub fn analyze_grid(&self, grid: UniformMonthlyGrid) -> Result<PeriodicityReport, CalculationError> {
        let detrended = grid.detrended();
        let spectrum = FrequencySpectrum::compute(&detrended);
        let periodogram = Periodogram::from_spectrum(&spectrum, self.config)?;

        let (lo, hi) = MULTI_YEAR_WINDOW;
        let dominant = periodogram.dominant_period(lo, hi).map(|(period, _)| period);
        info!(
            grid_len = grid.len(),
            gaps = grid.gap_count(),
            bins = spectrum.bins().len(),
            dominant_period_years = ?dominant,
            "computed periodogram"
        );
        Ok(PeriodicityReport {
            grid,
            detrended,
            spectrum,
            periodogram,
        })
    }
}
