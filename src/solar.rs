//! Top-of-atmosphere (TOA) irradiance on a horizontal surface.
//!
//! The model is deliberately low order: declination, equation of time and
//! Earth-Sun distance all come from single-term approximations driven by the
//! day of year. It is accurate to a few W/m² and is not an ephemeris.
//!
//! ```
//! use solar_climate::solar::{toa_horizontal_irradiance, SOLAR_CONSTANT};
//!
//! // Midsummer noon in Gothenburg
//! let g0h = toa_horizontal_irradiance(1958, 6, 21, 12.0, 12.9468, 57.7607).unwrap();
//! assert!(g0h > 1000.0 && g0h < SOLAR_CONSTANT);
//! ```
use core::f64::consts::PI;

use crate::error::CalculationError;
use crate::time::{day_of_year, days_in_year, hour_angle_rad, local_solar_time};

/// Solar constant `I_sc` in W/m².
pub const SOLAR_CONSTANT: f64 = 1367.0;

/// Maximum tilt of the Earth's axis used by the declination model, in degrees.
const AXIAL_TILT_DEG: f64 = 23.45;

/// Amplitude of the annual Earth-Sun distance correction.
const ECCENTRICITY_AMPLITUDE: f64 = 0.033;

/// Solar declination in radians: `23.45° · sin(2π(284 + J) / 365)`.
pub fn solar_declination_rad(day_of_year: u32) -> f64 {
    AXIAL_TILT_DEG.to_radians() * (2.0 * PI * (284.0 + f64::from(day_of_year)) / 365.0).sin()
}

/// Earth-Sun eccentricity correction factor `E0 = 1 + 0.033 cos(2πJ / 365)`.
pub fn eccentricity_correction(day_of_year: u32) -> f64 {
    1.0 + ECCENTRICITY_AMPLITUDE * (2.0 * PI * f64::from(day_of_year) / 365.0).cos()
}

/// Cosine of the solar zenith angle.
///
/// `cos θz = sin φ sin δ + cos φ cos δ cos H`
///
/// # Arguments
///
/// * `lat_rad` - Latitude φ in radians
/// * `decl_rad` - Solar declination δ in radians
/// * `hour_angle_rad` - Hour angle H in radians (0 at solar noon)
pub fn cos_zenith(lat_rad: f64, decl_rad: f64, hour_angle_rad: f64) -> f64 {
    lat_rad.sin() * decl_rad.sin() + lat_rad.cos() * decl_rad.cos() * hour_angle_rad.cos()
}

/// A validated observation site.
///
/// Holds the latitude in radians and the longitude in degrees, which is the
/// form the irradiance formulas consume them in. Construction fails for
/// coordinates outside the physical range, so every method on a `Site` only
/// has to check the hour.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Site {
    latitude_deg: f64,
    longitude_deg: f64,
    lat_radians: f64,
}

impl Site {
    /// Creates a site from geographic coordinates in degrees.
    ///
    /// # Arguments
    ///
    /// * `latitude_deg` - Latitude in degrees (positive North), `[-90, 90]`
    /// * `longitude_deg` - Longitude in degrees (positive East), `[-180, 180]`
    ///
    /// # Errors
    ///
    /// Returns [`CalculationError::InvalidInput`] if either coordinate is out of
    /// range or not finite.
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Result<Self, CalculationError> {
        if !(-90.0..=90.0).contains(&latitude_deg) {
            return Err(CalculationError::InvalidInput {
                field: "latitude_deg",
                value: latitude_deg,
            });
        }
        if !(-180.0..=180.0).contains(&longitude_deg) {
            return Err(CalculationError::InvalidInput {
                field: "longitude_deg",
                value: longitude_deg,
            });
        }
        Ok(Self {
            latitude_deg,
            longitude_deg,
            lat_radians: latitude_deg.to_radians(),
        })
    }

    /// Latitude in degrees.
    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    /// Longitude in degrees.
    pub fn longitude_deg(&self) -> f64 {
        self.longitude_deg
    }

    /// Instantaneous TOA horizontal irradiance in W/m² for a calendar date and UTC hour.
    ///
    /// Returns exactly `0.0` when the sun is at or below the horizon.
    ///
    /// # Errors
    ///
    /// [`CalculationError::InvalidInput`] for an hour outside `[0, 24)`,
    /// [`CalculationError::InvalidDate`] for a date that does not exist.
    pub fn toa_horizontal_irradiance(
        &self,
        year: i32,
        month: u32,
        day: u32,
        hour_utc: f64,
    ) -> Result<f64, CalculationError> {
        check_hour(hour_utc)?;
        let doy = day_of_year(year, month, day)?;
        Ok(self.irradiance_on_day(doy, hour_utc))
    }

    /// Mean TOA horizontal irradiance at the same UTC hour over every day of `year`.
    ///
    /// Averages [`toa_horizontal_irradiance`](Self::toa_horizontal_irradiance)
    /// over all 365 (366) days, night-time zeros included. This is the
    /// "expected" irradiance for that clock hour at this site.
    ///
    /// # Errors
    ///
    /// [`CalculationError::InvalidInput`] for an hour outside `[0, 24)`.
    pub fn mean_toa_horizontal_irradiance_same_hour(&self, year: i32, hour_utc: f64) -> Result<f64, CalculationError> {
        check_hour(hour_utc)?;
        let days = days_in_year(year);
        let sum: f64 = (1..=days).map(|doy| self.irradiance_on_day(doy, hour_utc)).sum();
        Ok(sum / f64::from(days))
    }

    /// Shared kernel for the instantaneous and the same-hour mean irradiance,
    /// so both always agree for a given day.
    fn irradiance_on_day(&self, doy: u32, hour_utc: f64) -> f64 {
        let lst = local_solar_time(hour_utc, self.longitude_deg, doy);
        let h = hour_angle_rad(lst);
        let mu0 = cos_zenith(self.lat_radians, solar_declination_rad(doy), h);
        if mu0 > 0.0 {
            SOLAR_CONSTANT * eccentricity_correction(doy) * mu0
        } else {
            0.0
        }
    }
}

fn check_hour(hour_utc: f64) -> Result<(), CalculationError> {
    if (0.0..24.0).contains(&hour_utc) {
        Ok(())
    } else {
        Err(CalculationError::InvalidInput {
            field: "hour_utc",
            value: hour_utc,
        })
    }
}

/// Instantaneous TOA horizontal irradiance in W/m².
///
/// Local solar time is derived from the UTC hour, the longitude and the
/// equation of time; the hour angle is `15° · (lst - 12)` and the result is
/// `I_sc · E0 · max(cos θz, 0)`.
///
/// # Arguments
///
/// * `year`, `month`, `day` - Calendar date (UTC)
/// * `hour_utc` - Hour of day in `[0, 24)`
/// * `longitude_deg` - Longitude in degrees, East positive
/// * `latitude_deg` - Latitude in degrees, North positive
///
/// # Errors
///
/// [`CalculationError::InvalidInput`] for out-of-range hour, latitude or
/// longitude; [`CalculationError::InvalidDate`] for an impossible date.
pub fn toa_horizontal_irradiance(
    year: i32,
    month: u32,
    day: u32,
    hour_utc: f64,
    longitude_deg: f64,
    latitude_deg: f64,
) -> Result<f64, CalculationError> {
    Site::new(latitude_deg, longitude_deg)?.toa_horizontal_irradiance(year, month, day, hour_utc)
}

/// Mean TOA horizontal irradiance at the same UTC hour across every day of `year`.
///
/// See [`Site::mean_toa_horizontal_irradiance_same_hour`].
///
/// # Errors
///
/// [`CalculationError::InvalidInput`] for out-of-range hour, latitude or longitude.
pub fn mean_toa_horizontal_irradiance_same_hour(
    year: i32,
    hour_utc: f64,
    longitude_deg: f64,
    latitude_deg: f64,
) -> Result<f64, CalculationError> {
    Site::new(latitude_deg, longitude_deg)?.mean_toa_horizontal_irradiance_same_hour(year, hour_utc)
}
