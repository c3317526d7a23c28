//! End-to-end orchestration of the pipeline.
//!
//! Data flows strictly downward:
//!
//! raw lines → [`ingest`](crate::ingest) → adjusted observations →
//! [`normalize`](crate::normalize) → normalized observations →
//! [`monthly`](crate::monthly) → monthly series → [`spectrum`](crate::spectrum)
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::error::PipelineError;
use crate::ingest::{ingest_path, IngestStats};
use crate::monthly::{CalendarMonthSeries, MonthlyAggregator, MonthlySeries};
use crate::normalize::{DayOfYearNormalizer, DayOfYearStats};
use crate::spectrum::{PeriodicityAnalyzer, PeriodicityReport};
use crate::types::{AdjustedObservation, NormalizedObservation};

/// Every artifact of one analysis run, with the counts needed to see what was dropped.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// Ingestion counters, default when the caller supplied adjusted records directly
    pub ingest: IngestStats,
    /// Adjusted observations
    pub adjusted: Vec<AdjustedObservation>,
    /// Per-day-of-year ranges from pass 1
    pub day_stats: DayOfYearStats,
    /// Normalized observations from pass 2
    pub normalized: Vec<NormalizedObservation>,
    /// Adjusted observations that could not be normalized
    pub normalization_skipped: usize,
    /// Monthly means
    pub monthly: MonthlyAggregator,
    /// Twelve calendar-month series
    pub calendar_months: Vec<CalendarMonthSeries>,
    /// All months in succession
    pub timeline: MonthlySeries,
    /// Grid, spectrum and periodogram
    pub periodicity: PeriodicityReport,
}

/// Normalizes, aggregates and analyzes an already-adjusted dataset.
///
/// # Errors
///
/// [`PipelineError::Parameter`] for an invalid configuration or monthly data
/// spanning more years than a calendar date can carry,
/// [`PipelineError::NoMonthlyData`] when no observation survives normalization.
pub fn analyze_observations(
    adjusted: Vec<AdjustedObservation>,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, PipelineError> {
    config.validate()?;
    let normalizer = DayOfYearNormalizer::with_bounds(config.min_day_of_year, config.max_day_of_year)?;
    let analyzer = PeriodicityAnalyzer::new(config.periodogram)?;

    // Pass 1 must see the whole dataset before pass 2 starts
    let day_stats = normalizer.compute_stats(&adjusted);
    let normalization = normalizer.normalize(&day_stats, &adjusted);

    let monthly = MonthlyAggregator::from_observations(&normalization.records);
    let Some(periodicity) = analyzer.analyze(&monthly)? else {
        warn!(adjusted = adjusted.len(), "no monthly data after normalization");
        return Err(PipelineError::NoMonthlyData);
    };

    Ok(AnalysisReport {
        ingest: IngestStats::default(),
        calendar_months: monthly.by_calendar_month(),
        timeline: monthly.timeline(),
        adjusted,
        day_stats,
        normalized: normalization.records,
        normalization_skipped: normalization.skipped,
        monthly,
        periodicity,
    })
}

/// Ingests `config.input` and runs the full analysis.
///
/// # Errors
///
/// [`PipelineError::MissingInput`] without an input path,
/// [`PipelineError::Parameter`] for an invalid configuration (before any file is
/// read), [`PipelineError::Io`] for an unreadable source, otherwise as
/// [`analyze_observations`].
pub fn run(config: &AnalysisConfig) -> Result<AnalysisReport, PipelineError> {
    config.validate()?;
    let input = config.input.as_deref().ok_or(PipelineError::MissingInput)?;
    let ingested = ingest_path(input, config.correction)?;
    info!(
        total_lines = ingested.stats.total_lines,
        bad_lines = ingested.stats.bad_lines,
        rejected_records = ingested.stats.rejected_records,
        produced_records = ingested.stats.produced_records,
        "ingestion finished"
    );
    let mut report = analyze_observations(ingested.records, config)?;
    report.ingest = ingested.stats;
    Ok(report)
}
