use crate::time::fractional_year_of_day;

/// One raw ground-temperature observation, as parsed from an input line.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RawObservation {
    /// Calendar year
    pub year: i32,
    /// Month, 1..=12
    pub month: u32,
    /// Day of month, 1..=31
    pub day: u32,
    /// Hour of observation in UTC, 0..=23
    pub hour_utc: u32,
    /// Measured temperature in °C
    pub temperature_c: f64,
    /// Station latitude in degrees, North positive
    pub latitude_deg: f64,
    /// Station longitude in degrees, East positive
    pub longitude_deg: f64,
}

/// A raw observation with the solar-irradiance correction applied.
///
/// Invariant: `adjusted_temp_c == raw.temperature_c - correction_c` and
/// `|correction_c|` never exceeds the cap the corrector was configured with.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AdjustedObservation {
    /// The observation the correction was computed for
    pub raw: RawObservation,
    /// Instantaneous TOA horizontal irradiance `G0h` in W/m²
    pub toa_irradiance_wm2: f64,
    /// Mean TOA horizontal irradiance at the same UTC hour over the year, in W/m²
    pub toa_irradiance_mean_wm2: f64,
    /// Correction subtracted from the raw temperature, in °C
    pub correction_c: f64,
    /// Bias-corrected temperature in °C
    pub adjusted_temp_c: f64,
}

impl AdjustedObservation {
    /// `year + (month - 1) / 12 + (day - 1) / 365`, the time axis for plotting
    /// adjusted temperatures one observation at a time.
    pub fn fractional_year(&self) -> f64 {
        fractional_year_of_day(self.raw.year, self.raw.month, self.raw.day)
    }
}

/// An adjusted observation rescaled against its day-of-year range.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NormalizedObservation {
    /// The adjusted observation this value was derived from
    pub adjusted: AdjustedObservation,
    /// Day-of-year index the range was taken from
    pub day_of_year: u32,
    /// Position of the adjusted temperature in the day's `[min, max]`, in `[0, 1]`.
    /// `0.5` when the day's range is degenerate.
    pub normalized: f64,
}

impl NormalizedObservation {
    /// Calendar year of the underlying observation.
    pub fn year(&self) -> i32 {
        self.adjusted.raw.year
    }

    /// Calendar month of the underlying observation.
    pub fn month(&self) -> u32 {
        self.adjusted.raw.month
    }
}
