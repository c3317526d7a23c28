use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the geometry, correction and configuration layers.
///
/// All of these are local to a single record except when they come out of
/// configuration validation, in which case the caller gets them wrapped in
/// [`PipelineError::Parameter`].
///
/// # Variants
///
/// - `InvalidDate`: month or day outside the calendar of the given year
/// - `InvalidInput`: hour in `[0, 24)`, latitude in `[-90, 90]` or longitude in `[-180, 180]` violated
/// - `InvalidParameter`: a tuning parameter (e.g. `beta`) outside its admissible range
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum CalculationError {
    /// Calendar-impossible year/month/day combination
    #[error("invalid calendar date {year:04}-{month:02}-{day:02}")]
    InvalidDate {
        /// Year as given
        year: i32,
        /// Month as given
        month: u32,
        /// Day as given
        day: u32,
    },

    /// Physical input outside its valid range
    #[error("{field} out of range: {value}")]
    InvalidInput {
        /// Which input was rejected (`hour_utc`, `latitude_deg`, `longitude_deg`)
        field: &'static str,
        /// Offending value
        value: f64,
    },

    /// Configuration parameter outside its admissible range
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name as it appears in the configuration
        name: &'static str,
        /// Offending value
        value: f64,
    },
}

/// A malformed input line.
///
/// The ingestion pipeline recovers from these by counting and skipping the
/// line; they never abort a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line does not have exactly seven `;`-separated fields
    #[error("expected 7 fields, found {found}")]
    FieldCount {
        /// Number of fields actually present
        found: usize,
    },

    /// A field could not be parsed as a number
    #[error("field {field} is not numeric: {value:?}")]
    InvalidField {
        /// Field name
        field: &'static str,
        /// Raw text of the field
        value: String,
    },
}

/// Fatal failures surfaced to the caller of the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// An input source could not be opened or read
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Path of the source
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`AnalysisConfig`](crate::AnalysisConfig)
    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A configuration parameter failed validation
    #[error(transparent)]
    Parameter(#[from] CalculationError),

    /// Writing an output table failed
    #[error("failed to write table: {0}")]
    Csv(#[from] csv::Error),

    /// No configured input source was given to [`analysis::run`](crate::analysis::run)
    #[error("no input source configured")]
    MissingInput,

    /// Nothing survived to monthly aggregation, so there is no series to analyze
    #[error("no monthly data to analyze")]
    NoMonthlyData,
}
