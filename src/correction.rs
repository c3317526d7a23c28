//! Irradiance-based temperature correction.
//!
//! An observation taken while the sun is higher than usual for that clock
//! hour is biased warm by solar loading of the instrument. The correction
//! compares the instantaneous TOA irradiance with the year-long mean at the
//! same UTC hour and removes `beta` °C per W/m² of the difference:
//!
//! `correction = clamp(beta · (G0h - G0h_mean), -cap, cap)`
//!
//! `adjusted = temperature - correction`
use std::collections::HashMap;

use crate::config::CorrectionConfig;
use crate::error::CalculationError;
use crate::solar::Site;
use crate::types::{AdjustedObservation, RawObservation};

/// Key of a same-hour mean: year, hour and the exact bits of the coordinates.
type BaselineKey = (i32, u32, u64, u64);

/// Applies the irradiance correction to observations.
///
/// The same-hour mean irradiance costs a full year of evaluations, and a
/// station produces thousands of records at the same few hours, so the
/// corrector memoizes it per `(year, hour, latitude, longitude)`. Cached
/// values are the ones a direct computation returns.
#[derive(Debug, Clone)]
pub struct TemperatureCorrector {
    config: CorrectionConfig,
    baselines: HashMap<BaselineKey, f64>,
}

impl TemperatureCorrector {
    /// Creates a corrector after validating `beta` and the cap.
    ///
    /// # Errors
    ///
    /// [`CalculationError::InvalidParameter`] if `beta ∉ (0, 1)` or the cap is not positive.
    pub fn new(config: CorrectionConfig) -> Result<Self, CalculationError> {
        config.validate()?;
        Ok(Self {
            config,
            baselines: HashMap::new(),
        })
    }

    /// The configuration this corrector applies.
    pub fn config(&self) -> CorrectionConfig {
        self.config
    }

    /// Number of distinct same-hour baselines computed so far.
    pub fn cached_baselines(&self) -> usize {
        self.baselines.len()
    }

    /// Correction in °C for an irradiance and its same-hour mean, capped at
    /// `±max_abs_correction_c`.
    pub fn correction(&self, toa_irradiance_wm2: f64, toa_irradiance_mean_wm2: f64) -> f64 {
        let cap = self.config.max_abs_correction_c;
        (self.config.beta * (toa_irradiance_wm2 - toa_irradiance_mean_wm2)).clamp(-cap, cap)
    }

    /// Corrects one observation.
    ///
    /// # Errors
    ///
    /// [`CalculationError::InvalidInput`] for out-of-range hour or coordinates,
    /// [`CalculationError::InvalidDate`] for an impossible date. Both are local
    /// to this observation.
    pub fn adjust(&mut self, observation: &RawObservation) -> Result<AdjustedObservation, CalculationError> {
        let site = Site::new(observation.latitude_deg, observation.longitude_deg)?;
        let hour = f64::from(observation.hour_utc);
        let g0h = site.toa_horizontal_irradiance(observation.year, observation.month, observation.day, hour)?;

        let key = (
            observation.year,
            observation.hour_utc,
            observation.latitude_deg.to_bits(),
            observation.longitude_deg.to_bits(),
        );
        let g0h_mean = match self.baselines.get(&key) {
            Some(&mean) => mean,
            None => {
                let mean = site.mean_toa_horizontal_irradiance_same_hour(observation.year, hour)?;
                self.baselines.insert(key, mean);
                mean
            }
        };

        let correction_c = self.correction(g0h, g0h_mean);
        Ok(AdjustedObservation {
            raw: *observation,
            toa_irradiance_wm2: g0h,
            toa_irradiance_mean_wm2: g0h_mean,
            correction_c,
            adjusted_temp_c: observation.temperature_c - correction_c,
        })
    }
}

/// Corrects a single observation without keeping a baseline cache.
///
/// # Arguments
///
/// * `observation` - The raw record
/// * `beta` - °C per W/m², in `(0, 1)`; 0.003 is the usual value
/// * `max_abs_correction_c` - Cap on the absolute correction, 20 °C by default
///
/// # Errors
///
/// [`CalculationError::InvalidParameter`] for a bad `beta` or cap, otherwise as
/// [`TemperatureCorrector::adjust`].
///
/// # Example
///
/// ```
/// use solar_climate::{adjust, RawObservation};
///
/// let obs: RawObservation = "1958;06;21;12;17.0;57.7607;12.9468".parse().unwrap();
/// let adjusted = adjust(&obs, 0.003, 20.0).unwrap();
/// assert!(adjusted.correction_c > 0.0);
/// assert_eq!(adjusted.adjusted_temp_c, obs.temperature_c - adjusted.correction_c);
/// ```
pub fn adjust(
    observation: &RawObservation,
    beta: f64,
    max_abs_correction_c: f64,
) -> Result<AdjustedObservation, CalculationError> {
    TemperatureCorrector::new(CorrectionConfig {
        beta,
        max_abs_correction_c,
    })?
    .adjust(observation)
}
