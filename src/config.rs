//! Pipeline configuration.
//!
//! Every field has a documented default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! input = "datasets/clean"
//! min_day_of_year = 1
//! max_day_of_year = 366
//!
//! [correction]
//! beta = 0.003
//! max_abs_correction_c = 20.0
//!
//! [periodogram]
//! min_period_years = 0.5
//! max_period_years = 50.0
//! buckets = 500
//! ```
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CalculationError, PipelineError};

/// Default temperature response to irradiance, °C per W/m².
pub const DEFAULT_BETA: f64 = 0.003;

/// Default cap on the absolute correction, °C.
pub const DEFAULT_MAX_ABS_CORRECTION_C: f64 = 20.0;

/// Parameters of the irradiance-based temperature correction.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// Temperature response to irradiance in °C per W/m²; must lie in `(0, 1)`
    pub beta: f64,
    /// Cap on `|correction|` in °C; must be `> 0`, `inf` disables the cap
    pub max_abs_correction_c: f64,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            beta: DEFAULT_BETA,
            max_abs_correction_c: DEFAULT_MAX_ABS_CORRECTION_C,
        }
    }
}

impl CorrectionConfig {
    /// Checks `beta` and the correction cap.
    ///
    /// # Errors
    ///
    /// [`CalculationError::InvalidParameter`] naming the first bad field.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<(), CalculationError> {
        if !(self.beta > 0.0 && self.beta < 1.0) {
            return Err(CalculationError::InvalidParameter {
                name: "beta",
                value: self.beta,
            });
        }
        if !(self.max_abs_correction_c > 0.0) {
            return Err(CalculationError::InvalidParameter {
                name: "max_abs_correction_c",
                value: self.max_abs_correction_c,
            });
        }
        Ok(())
    }
}

/// Period range and resolution of the periodogram.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PeriodogramConfig {
    /// Shortest period accumulated, in years
    pub min_period_years: f64,
    /// Longest period accumulated, in years
    pub max_period_years: f64,
    /// Number of uniform buckets between the two
    pub buckets: usize,
}

impl Default for PeriodogramConfig {
    fn default() -> Self {
        Self {
            min_period_years: 0.5,
            max_period_years: 50.0,
            buckets: 500,
        }
    }
}

impl PeriodogramConfig {
    /// Checks that the period range is finite, positive and non-empty.
    ///
    /// # Errors
    ///
    /// [`CalculationError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> Result<(), CalculationError> {
        if !(self.min_period_years.is_finite() && self.min_period_years > 0.0) {
            return Err(CalculationError::InvalidParameter {
                name: "min_period_years",
                value: self.min_period_years,
            });
        }
        if !(self.max_period_years.is_finite() && self.max_period_years > self.min_period_years) {
            return Err(CalculationError::InvalidParameter {
                name: "max_period_years",
                value: self.max_period_years,
            });
        }
        if self.buckets == 0 {
            return Err(CalculationError::InvalidParameter {
                name: "buckets",
                value: 0.0,
            });
        }
        Ok(())
    }
}

/// Top-level configuration of a full analysis run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Input file, or directory of `.csv`/`.txt` files
    pub input: Option<PathBuf>,
    /// Temperature correction parameters
    pub correction: CorrectionConfig,
    /// Lowest day-of-year index admitted to normalization
    pub min_day_of_year: u32,
    /// Highest day-of-year index admitted to normalization
    pub max_day_of_year: u32,
    /// Periodogram range and resolution
    pub periodogram: PeriodogramConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: None,
            correction: CorrectionConfig::default(),
            min_day_of_year: 1,
            max_day_of_year: 366,
            periodogram: PeriodogramConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Config`] for malformed TOML, [`PipelineError::Parameter`]
    /// for a value that fails [`validate`](Self::validate).
    pub fn from_toml_str(text: &str) -> Result<Self, PipelineError> {
        let config: AnalysisConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Validates every parameter.
    ///
    /// # Errors
    ///
    /// [`CalculationError::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> Result<(), CalculationError> {
        self.correction.validate()?;
        if !(1..=366).contains(&self.min_day_of_year) {
            return Err(CalculationError::InvalidParameter {
                name: "min_day_of_year",
                value: f64::from(self.min_day_of_year),
            });
        }
        if !(self.min_day_of_year..=366).contains(&self.max_day_of_year) {
            return Err(CalculationError::InvalidParameter {
                name: "max_day_of_year",
                value: f64::from(self.max_day_of_year),
            });
        }
        self.periodogram.validate()
    }
}
