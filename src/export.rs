//! Semicolon-delimited CSV tables of the pipeline's artifacts.
//!
//! Every writer emits a header row and takes any [`std::io::Write`], so the
//! caller decides whether rows go to a file, a buffer or stdout.
use std::io::Write;

use serde::Serialize;

use crate::error::PipelineError;
use crate::monthly::{CalendarMonthSeries, MonthlySeries};
use crate::spectrum::{FrequencySpectrum, Periodogram};
use crate::time::fractional_year_of_month;
use crate::types::AdjustedObservation;

#[derive(Serialize)]
struct AdjustedRow {
    year: i32,
    month: u32,
    day: u32,
    hour_utc: u32,
    #[serde(rename = "temp_raw_C")]
    temp_raw_c: f64,
    lat_deg: f64,
    lon_deg: f64,
    #[serde(rename = "G0h_Wm2")]
    g0h_wm2: f64,
    #[serde(rename = "G0h_mean_Wm2")]
    g0h_mean_wm2: f64,
    #[serde(rename = "correction_C")]
    correction_c: f64,
    #[serde(rename = "temp_adj_C")]
    temp_adj_c: f64,
}

impl From<&AdjustedObservation> for AdjustedRow {
    fn from(obs: &AdjustedObservation) -> Self {
        Self {
            year: obs.raw.year,
            month: obs.raw.month,
            day: obs.raw.day,
            hour_utc: obs.raw.hour_utc,
            temp_raw_c: obs.raw.temperature_c,
            lat_deg: obs.raw.latitude_deg,
            lon_deg: obs.raw.longitude_deg,
            g0h_wm2: obs.toa_irradiance_wm2,
            g0h_mean_wm2: obs.toa_irradiance_mean_wm2,
            correction_c: obs.correction_c,
            temp_adj_c: obs.adjusted_temp_c,
        }
    }
}

#[derive(Serialize)]
struct MonthlyRow<'a> {
    series: &'a str,
    year: i32,
    month: u32,
    fractional_year: f64,
    mean_normalized: f64,
}

#[derive(Serialize)]
struct SpectrumRow {
    frequency_cycles_per_year: f64,
    power: f64,
}

#[derive(Serialize)]
struct PeriodogramRow {
    period_years: f64,
    power: f64,
}

fn writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(b';').from_writer(out)
}

fn write_rows<W: Write, R: Serialize>(out: W, rows: impl IntoIterator<Item = R>) -> Result<(), PipelineError> {
    let mut wtr = writer(out);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Writes the 11-column adjusted-observation table.
///
/// # Errors
///
/// [`PipelineError::Csv`] if writing fails.
pub fn write_adjusted<W: Write>(out: W, records: &[AdjustedObservation]) -> Result<(), PipelineError> {
    write_rows(out, records.iter().map(AdjustedRow::from))
}

/// Writes the twelve calendar-month series followed by the timeline.
///
/// The `series` column holds the month name, or `timeline` for the combined series.
///
/// # Errors
///
/// [`PipelineError::Csv`] if writing fails.
pub fn write_monthly<W: Write>(
    out: W,
    calendar_months: &[CalendarMonthSeries],
    timeline: &MonthlySeries,
) -> Result<(), PipelineError> {
    let per_month = calendar_months.iter().flat_map(|series| {
        series.points.iter().map(move |&(year, mean)| MonthlyRow {
            series: series.name(),
            year,
            month: series.month(),
            fractional_year: fractional_year_of_month(year, series.month()),
            mean_normalized: mean,
        })
    });
    let combined = timeline.points().iter().map(|p| MonthlyRow {
        series: "timeline",
        year: p.year,
        month: p.month,
        fractional_year: p.fractional_year,
        mean_normalized: p.mean,
    });
    write_rows(out, per_month.chain(combined))
}

/// Writes `(frequency, power)` for every spectrum bin.
///
/// # Errors
///
/// [`PipelineError::Csv`] if writing fails.
pub fn write_spectrum<W: Write>(out: W, spectrum: &FrequencySpectrum) -> Result<(), PipelineError> {
    write_rows(
        out,
        spectrum.bins().iter().map(|bin| SpectrumRow {
            frequency_cycles_per_year: bin.frequency,
            power: bin.power,
        }),
    )
}

/// Writes `(period, power)` for every periodogram bucket, keyed by bucket centre.
///
/// # Errors
///
/// [`PipelineError::Csv`] if writing fails.
pub fn write_periodogram<W: Write>(out: W, periodogram: &Periodogram) -> Result<(), PipelineError> {
    write_rows(
        out,
        periodogram.bins().map(|(period_years, power)| PeriodogramRow { period_years, power }),
    )
}
