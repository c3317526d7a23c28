//! # Solar Climate
//!
//! Removes the solar-loading bias from historical ground-temperature
//! observations and looks for multi-year cycles in what is left.
//!
//! The pipeline has four stages:
//!
//! 1. **Correction**: for every observation, the top-of-atmosphere (TOA)
//!    horizontal irradiance at that instant is compared with its mean at the
//!    same UTC hour over the whole year, and `beta` °C per W/m² of the
//!    difference is subtracted from the temperature ([`solar`], [`correction`],
//!    [`ingest`]).
//! 2. **Day-of-year normalization**: adjusted temperatures are rescaled to
//!    `[0, 1]` against the range seen on the same calendar day across all
//!    years ([`normalize`]).
//! 3. **Monthly aggregation**: normalized values are averaged per
//!    `(year, month)` ([`monthly`]).
//! 4. **Periodicity**: the monthly series is gridded, detrended and
//!    transformed, and its power spectrum folded into a periodogram over
//!    period in years ([`spectrum`]).
//!
//! ## Basic Usage
//!
//! ```
//! use solar_climate::{AnalysisConfig, IngestionPipeline};
//! use solar_climate::analysis::analyze_observations;
//!
//! let config = AnalysisConfig::default();
//! let mut pipeline = IngestionPipeline::new(config.correction).unwrap();
//! for year in 1950..1956 {
//!     for month in 1..=12 {
//!         let temp = 5.0 + f64::from(month) + 0.1 * f64::from(year - 1950);
//!         pipeline.push_line(&format!("{year};{month:02};15;12;{temp};57.7607;12.9468"));
//!     }
//! }
//! pipeline.push_line("not;a;record");
//!
//! let ingested = pipeline.finish();
//! assert_eq!(ingested.stats.bad_lines, 1);
//! assert_eq!(ingested.stats.produced_records, 72);
//!
//! let report = analyze_observations(ingested.records, &config).unwrap();
//! assert_eq!(report.periodicity.grid.len(), 72);
//! assert_eq!(report.periodicity.periodogram.bucket_count(), 500);
//! ```

pub mod analysis;
pub mod config;
pub mod correction;
mod error;
pub mod export;
pub mod ingest;
mod math;
pub mod monthly;
pub mod normalize;
pub mod solar;
pub mod spectrum;
pub mod time;
mod types;


pub use config::{AnalysisConfig, CorrectionConfig, PeriodogramConfig};
pub use correction::{adjust, TemperatureCorrector};
pub use error::{CalculationError, ParseError, PipelineError};
pub use ingest::{parse_line, IngestOutput, IngestStats, IngestionPipeline};
pub use math::LinearTrend;
pub use monthly::{MonthlyAggregator, MonthlyMean, MonthlySeries};
pub use normalize::{DayOfYearNormalizer, DayOfYearStats};
pub use solar::{mean_toa_horizontal_irradiance_same_hour, toa_horizontal_irradiance, Site, SOLAR_CONSTANT};
pub use spectrum::{FrequencySpectrum, PeriodicityAnalyzer, Periodogram, UniformMonthlyGrid};
pub use types::{AdjustedObservation, NormalizedObservation, RawObservation};
