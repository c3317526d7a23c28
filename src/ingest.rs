//! Line parsing and the ingestion stage.
//!
//! Input is one observation per line, `;`-delimited, no header:
//!
//! `year;month;day;hourUTC;temperatureC;latitudeDeg;longitudeDeg`
//!
//! e.g. `1944;07;09;13;30.6;59.9000;17.5930`. Malformed lines are counted and
//! skipped; records that parse but fail geometry validation are counted
//! separately. Neither aborts the batch.
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::CorrectionConfig;
use crate::correction::TemperatureCorrector;
use crate::error::{CalculationError, ParseError, PipelineError};
use crate::types::{AdjustedObservation, RawObservation};

const FIELD_NAMES: [&str; 7] = [
    "year",
    "month",
    "day",
    "hour_utc",
    "temperature_c",
    "latitude_deg",
    "longitude_deg",
];

/// File extensions picked up when ingesting a directory.
const INPUT_EXTENSIONS: [&str; 2] = ["csv", "txt"];

fn parse_field<T: FromStr>(fields: &[&str; 7], index: usize) -> Result<T, ParseError> {
    fields[index].parse().map_err(|_| ParseError::InvalidField {
        field: FIELD_NAMES[index],
        value: fields[index].to_string(),
    })
}

impl FromStr for RawObservation {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = line.trim().split(';').map(str::trim).collect();
        let fields: [&str; 7] = parts
            .as_slice()
            .try_into()
            .map_err(|_| ParseError::FieldCount { found: parts.len() })?;

        let temperature_c: f64 = parse_field(&fields, 4)?;
        let latitude_deg: f64 = parse_field(&fields, 5)?;
        let longitude_deg: f64 = parse_field(&fields, 6)?;
        // "nan" and "inf" parse as f64 but are not measurements
        for (index, value) in [(4, temperature_c), (5, latitude_deg), (6, longitude_deg)] {
            if !value.is_finite() {
                return Err(ParseError::InvalidField {
                    field: FIELD_NAMES[index],
                    value: fields[index].to_string(),
                });
            }
        }

        Ok(RawObservation {
            year: parse_field(&fields, 0)?,
            month: parse_field(&fields, 1)?,
            day: parse_field(&fields, 2)?,
            hour_utc: parse_field(&fields, 3)?,
            temperature_c,
            latitude_deg,
            longitude_deg,
        })
    }
}

/// Parses one input line.
///
/// # Errors
///
/// [`ParseError::FieldCount`] unless there are exactly seven fields,
/// [`ParseError::InvalidField`] for a non-numeric (or non-finite) field.
pub fn parse_line(line: &str) -> Result<RawObservation, ParseError> {
    line.parse()
}

/// Counters of one ingestion run.
///
/// `total_lines == bad_lines + rejected_records + produced_records`; blank
/// lines are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Non-blank lines seen
    pub total_lines: usize,
    /// Lines that could not be parsed
    pub bad_lines: usize,
    /// Parsed records rejected by date or range validation
    pub rejected_records: usize,
    /// Adjusted observations produced
    pub produced_records: usize,
}

impl AddAssign for IngestStats {
    fn add_assign(&mut self, other: Self) {
        self.total_lines += other.total_lines;
        self.bad_lines += other.bad_lines;
        self.rejected_records += other.rejected_records;
        self.produced_records += other.produced_records;
    }
}

/// Output of the ingestion stage.
#[derive(Debug, Clone, Default)]
pub struct IngestOutput {
    /// Adjusted observations in input order
    pub records: Vec<AdjustedObservation>,
    /// Line counters
    pub stats: IngestStats,
}

impl IngestOutput {
    /// Appends another source's output.
    pub fn merge(&mut self, other: IngestOutput) {
        self.records.extend(other.records);
        self.stats += other.stats;
    }
}

/// Parses raw lines, corrects them and collects the adjusted observations.
///
/// Every record is independent, so separate input sources can be ingested by
/// separate pipelines and merged afterwards; see [`ingest_path`].
#[derive(Debug, Clone)]
pub struct IngestionPipeline {
    corrector: TemperatureCorrector,
    output: IngestOutput,
}

impl IngestionPipeline {
    /// Creates a pipeline with the given correction parameters.
    ///
    /// # Errors
    ///
    /// [`CalculationError::InvalidParameter`] for an invalid `beta` or cap.
    pub fn new(config: CorrectionConfig) -> Result<Self, CalculationError> {
        Ok(Self {
            corrector: TemperatureCorrector::new(config)?,
            output: IngestOutput::default(),
        })
    }

    /// Counters so far.
    pub fn stats(&self) -> IngestStats {
        self.output.stats
    }

    /// Adjusted observations so far.
    pub fn records(&self) -> &[AdjustedObservation] {
        &self.output.records
    }

    /// Processes one line. Returns the adjusted observation if one was produced.
    pub fn push_line(&mut self, line: &str) -> Option<&AdjustedObservation> {
        if line.trim().is_empty() {
            return None;
        }
        self.output.stats.total_lines += 1;
        let line_no = self.output.stats.total_lines;

        let raw = match parse_line(line) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(line = line_no, error = %err, "skipping malformed line");
                self.output.stats.bad_lines += 1;
                return None;
            }
        };
        match self.corrector.adjust(&raw) {
            Ok(adjusted) => {
                self.output.stats.produced_records += 1;
                self.output.records.push(adjusted);
                self.output.records.last()
            }
            Err(err) => {
                debug!(line = line_no, error = %err, "rejecting record");
                self.output.stats.rejected_records += 1;
                None
            }
        }
    }

    /// Processes a sequence of lines in order.
    pub fn extend_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.push_line(line.as_ref());
        }
    }

    /// Processes every line of a reader.
    ///
    /// Lines that are not valid UTF-8 are treated as malformed, not as read
    /// failures.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if reading fails.
    pub fn read_from<R: BufRead>(&mut self, mut reader: R) -> std::io::Result<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }
            let line = String::from_utf8_lossy(&buf);
            self.push_line(&line);
        }
    }

    /// Consumes the pipeline and returns everything it produced.
    pub fn finish(self) -> IngestOutput {
        self.output
    }
}

/// Ingests one reader with a fresh pipeline.
///
/// # Errors
///
/// [`PipelineError::Parameter`] for invalid correction parameters,
/// [`PipelineError::Io`] (tagged with `label`) if reading fails.
pub fn ingest_reader<R: BufRead>(
    reader: R,
    label: &Path,
    config: CorrectionConfig,
) -> Result<IngestOutput, PipelineError> {
    let mut pipeline = IngestionPipeline::new(config)?;
    pipeline.read_from(reader).map_err(|source| PipelineError::Io {
        path: label.to_path_buf(),
        source,
    })?;
    let output = pipeline.finish();
    info!(
        source = %label.display(),
        total_lines = output.stats.total_lines,
        bad_lines = output.stats.bad_lines,
        rejected_records = output.stats.rejected_records,
        produced_records = output.stats.produced_records,
        "ingested source"
    );
    Ok(output)
}

fn ingest_file(path: &Path, config: CorrectionConfig) -> Result<IngestOutput, PipelineError> {
    let file = File::open(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ingest_reader(BufReader::new(file), path, config)
}

/// Lists the input files of a directory in file-name order.
///
/// # Errors
///
/// [`PipelineError::Io`] if the directory cannot be listed.
pub fn input_files(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let io_err = |source| PipelineError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let wanted = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| INPUT_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)));
        if wanted && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Ingests a file, or every `.csv`/`.txt` file of a directory.
///
/// Directory sources are processed in parallel, one pipeline per file, and
/// merged in file-name order so the output does not depend on scheduling.
///
/// # Errors
///
/// [`PipelineError::Parameter`] for invalid correction parameters (checked
/// before any file is opened), [`PipelineError::Io`] for the first source that
/// cannot be read.
pub fn ingest_path(path: &Path, config: CorrectionConfig) -> Result<IngestOutput, PipelineError> {
    config.validate()?;
    if !path.is_dir() {
        return ingest_file(path, config);
    }

    let files = input_files(path)?;
    let outputs = files
        .par_iter()
        .map(|file| ingest_file(file, config))
        .collect::<Result<Vec<_>, _>>()?;

    let mut merged = IngestOutput::default();
    for output in outputs {
        merged.merge(output);
    }
    info!(
        directory = %path.display(),
        sources = files.len(),
        produced_records = merged.stats.produced_records,
        "ingested directory"
    );
    Ok(merged)
}
