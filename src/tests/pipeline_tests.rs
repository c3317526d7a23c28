use std::fs;
use std::io::Write;
use std::path::Path;

use crate::analysis::{analyze_observations, run};
use crate::error::{CalculationError, ParseError, PipelineError};
use crate::export::{write_monthly, write_periodogram, write_spectrum};
use crate::ingest::{ingest_path, ingest_reader, input_files};
use crate::{parse_line, AnalysisConfig, CorrectionConfig, IngestionPipeline};

const GOTHENBURG: &str = "57.7607;12.9468";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Two observations a month, at 06 and 12 UTC, with a slow warming trend.
fn station_lines(years: std::ops::Range<i32>) -> Vec<String> {
    let mut lines = Vec::new();
    for year in years {
        for month in 1..=12u32 {
            for (day, hour) in [(3u32, 6u32), (17, 12)] {
                let seasonal = 8.0 - 10.0 * (f64::from(month) * 0.5236).cos();
                let temp = seasonal + 0.02 * f64::from(year - 1900) + f64::from(day % 5) * 0.1;
                lines.push(format!("{year};{month:02};{day:02};{hour:02};{temp:.1};{GOTHENBURG}"));
            }
        }
    }
    lines
}

fn write_lines(path: &Path, lines: &[String]) {
    let mut file = fs::File::create(path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
}

#[test]
fn parses_well_formed_lines() {
    let obs = parse_line("1944;07;09;13;30.6;59.9000;17.5930").unwrap();
    assert_eq!((obs.year, obs.month, obs.day, obs.hour_utc), (1944, 7, 9, 13));
    assert_eq!(obs.temperature_c, 30.6);
    assert_eq!(obs.latitude_deg, 59.9);
    assert_eq!(obs.longitude_deg, 17.593);

    // Surrounding whitespace and a trailing carriage return are tolerated
    let padded = parse_line(" 1944; 07 ;09;13;30.6;59.9000;17.5930\r\n").unwrap();
    assert_eq!(padded, obs);
}

#[test]
fn rejects_malformed_lines() {
    assert_eq!(parse_line("1944;07;09;13;30.6;59.9"), Err(ParseError::FieldCount { found: 6 }));
    assert_eq!(
        parse_line("1944;07;09;13;30.6;59.9;17.5;1"),
        Err(ParseError::FieldCount { found: 8 })
    );
    assert_eq!(
        parse_line("1944;07;09;13;warm;59.9;17.5"),
        Err(ParseError::InvalidField {
            field: "temperature_c",
            value: "warm".to_string()
        })
    );
    assert!(matches!(
        parse_line("1944;July;09;13;30.6;59.9;17.5"),
        Err(ParseError::InvalidField { field: "month", .. })
    ));
    assert!(matches!(
        parse_line("1944;07;09;13.5;30.6;59.9;17.5"),
        Err(ParseError::InvalidField { field: "hour_utc", .. })
    ));
    assert!(matches!(
        parse_line("1944;07;09;13;NaN;59.9;17.5"),
        Err(ParseError::InvalidField { field: "temperature_c", .. })
    ));
    assert!(matches!(
        parse_line("1944;07;09;13;1.0;inf;17.5"),
        Err(ParseError::InvalidField { field: "latitude_deg", .. })
    ));
}

#[test]
fn pipeline_counts_every_outcome() {
    let mut pipeline = IngestionPipeline::new(CorrectionConfig::default()).unwrap();
    let produced = pipeline.push_line("1958;06;21;12;17.0;57.7607;12.9468").copied();
    assert!(produced.is_some());
    assert!(pipeline.push_line("").is_none());
    assert!(pipeline.push_line("   ").is_none());
    assert!(pipeline.push_line("x").is_none());
    // 1900 is not a leap year
    assert!(pipeline.push_line("1900;02;29;12;1.0;57.7607;12.9468").is_none());
    assert!(pipeline.push_line("1958;06;21;24;17.0;57.7607;12.9468").is_none());
    assert!(pipeline.push_line("1958;06;21;12;17.0;95.0;12.9468").is_none());

    let stats = pipeline.stats();
    assert_eq!(stats.total_lines, 5);
    assert_eq!(stats.bad_lines, 1);
    assert_eq!(stats.rejected_records, 3);
    assert_eq!(stats.produced_records, 1);
    assert_eq!(
        stats.total_lines,
        stats.bad_lines + stats.rejected_records + stats.produced_records
    );

    let output = pipeline.finish();
    assert_eq!(output.records.len(), 1);
    assert_eq!(Some(output.records[0]), produced);
}

#[test]
fn years_beyond_the_calendar_are_rejected() {
    let mut pipeline = IngestionPipeline::new(CorrectionConfig::default()).unwrap();
    pipeline.extend_lines([
        "-2147483648;01;01;12;5.0;57.7607;12.9468",
        "2147483647;01;01;12;5.0;57.7607;12.9468",
        "1950;01;01;12;5.0;57.7607;12.9468",
    ]);
    let stats = pipeline.stats();
    assert_eq!(stats.rejected_records, 2);
    assert_eq!(stats.produced_records, 1);

    let report = analyze_observations(pipeline.finish().records, &AnalysisConfig::default()).unwrap();
    assert_eq!(report.periodicity.grid.len(), 12);
}

#[test]
fn records_keep_input_order() {
    let mut pipeline = IngestionPipeline::new(CorrectionConfig::default()).unwrap();
    pipeline.extend_lines([
        "1960;01;01;12;1.0;57.7607;12.9468",
        "1950;01;01;12;2.0;57.7607;12.9468",
        "1955;01;01;12;3.0;57.7607;12.9468",
    ]);
    let years: Vec<i32> = pipeline.records().iter().map(|r| r.raw.year).collect();
    assert_eq!(years, vec![1960, 1950, 1955]);
}

#[test]
fn non_utf8_lines_are_malformed() {
    let input: &[u8] = b"1958;06;21;12;17.0;57.7607;12.9468\n\xff\xfe;;\n\n1944;07;09;13;30.6;59.9;17.593";
    let output = ingest_reader(input, Path::new("<memory>"), CorrectionConfig::default()).unwrap();
    assert_eq!(output.stats.total_lines, 3);
    assert_eq!(output.stats.bad_lines, 1);
    assert_eq!(output.stats.produced_records, 2);
}

#[test]
fn invalid_correction_parameters_abort_ingestion() {
    let config = CorrectionConfig {
        beta: 1.0,
        ..CorrectionConfig::default()
    };
    assert!(IngestionPipeline::new(config).is_err());
    let err = ingest_reader(&b""[..], Path::new("<memory>"), config).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Parameter(CalculationError::InvalidParameter { name: "beta", .. })
    ));
}

#[test]
fn ingests_directory_in_file_name_order() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_lines(&dir.path().join("b_1951.csv"), &station_lines(1951..1952));
    let mut first = station_lines(1950..1951);
    first.push("garbage".to_string());
    write_lines(&dir.path().join("a_1950.txt"), &first);
    write_lines(&dir.path().join("notes.dat"), &station_lines(1990..1991));
    fs::create_dir(dir.path().join("nested.csv")).unwrap();

    let files = input_files(dir.path()).unwrap();
    let names: Vec<&str> = files.iter().filter_map(|p| p.file_name()?.to_str()).collect();
    assert_eq!(names, vec!["a_1950.txt", "b_1951.csv"]);

    let output = ingest_path(dir.path(), CorrectionConfig::default()).unwrap();
    assert_eq!(output.stats.total_lines, 49);
    assert_eq!(output.stats.bad_lines, 1);
    assert_eq!(output.stats.produced_records, 48);
    assert_eq!(output.records.first().unwrap().raw.year, 1950);
    assert_eq!(output.records.last().unwrap().raw.year, 1951);
    assert!(output.records.windows(2).all(|w| w[0].raw.year <= w[1].raw.year));
}

#[test]
fn unreadable_source_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.csv");
    let err = ingest_path(&missing, CorrectionConfig::default()).unwrap_err();
    match err {
        PipelineError::Io { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn config_defaults_and_overrides() {
    let config = AnalysisConfig::from_toml_str("").unwrap();
    assert_eq!(config, AnalysisConfig::default());
    assert_eq!(config.correction.beta, 0.003);
    assert_eq!(config.correction.max_abs_correction_c, 20.0);
    assert_eq!(config.periodogram.buckets, 500);

    let config = AnalysisConfig::from_toml_str(
        r#"
        input = "data/stations"
        max_day_of_year = 365

        [correction]
        beta = 0.005

        [periodogram]
        max_period_years = 25.0
        "#,
    )
    .unwrap();
    assert_eq!(config.input.as_deref(), Some(Path::new("data/stations")));
    assert_eq!(config.max_day_of_year, 365);
    assert_eq!(config.correction.beta, 0.005);
    assert_eq!(config.correction.max_abs_correction_c, 20.0);
    assert_eq!(config.periodogram.max_period_years, 25.0);
    assert_eq!(config.periodogram.min_period_years, 0.5);

    let uncapped = AnalysisConfig::from_toml_str("[correction]\nmax_abs_correction_c = inf\n").unwrap();
    assert!(uncapped.correction.max_abs_correction_c.is_infinite());
}

#[test]
fn config_errors() {
    assert!(matches!(
        AnalysisConfig::from_toml_str("[correction]\nbeta = 1.5\n"),
        Err(PipelineError::Parameter(CalculationError::InvalidParameter { name: "beta", .. }))
    ));
    assert!(matches!(
        AnalysisConfig::from_toml_str("min_day_of_year = 0\n"),
        Err(PipelineError::Parameter(CalculationError::InvalidParameter {
            name: "min_day_of_year",
            ..
        }))
    ));
    assert!(matches!(
        AnalysisConfig::from_toml_str("[correction]\nbeta = \"high\"\n"),
        Err(PipelineError::Config(_))
    ));
    assert!(matches!(
        AnalysisConfig::from_file(Path::new("/nonexistent/solar-climate.toml")),
        Err(PipelineError::Io { .. })
    ));
}

#[test]
fn config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("analysis.toml");
    fs::write(&path, "[correction]\nbeta = 0.004\n").unwrap();
    let config = AnalysisConfig::from_file(&path).unwrap();
    assert_eq!(config.correction.beta, 0.004);
}

#[test]
fn end_to_end_run() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    for decade in [1900, 1910, 1920] {
        let path = dir.path().join(format!("station_{decade}.csv"));
        write_lines(&path, &station_lines(decade..decade + 10));
    }

    let config = AnalysisConfig {
        input: Some(dir.path().to_path_buf()),
        ..AnalysisConfig::default()
    };
    let report = run(&config).unwrap();

    assert_eq!(report.ingest.produced_records, 720);
    assert_eq!(report.ingest.bad_lines, 0);
    assert_eq!(report.adjusted.len(), 720);
    assert_eq!(report.normalized.len(), 720);
    assert_eq!(report.normalization_skipped, 0);
    assert!(report.normalized.iter().all(|n| (0.0..=1.0).contains(&n.normalized)));

    assert_eq!(report.monthly.len(), 360);
    assert_eq!(report.calendar_months.len(), 12);
    assert!(report.calendar_months.iter().all(|s| s.points.len() == 30));
    assert_eq!(report.timeline.len(), 360);
    assert_eq!(report.periodicity.grid.len(), 360);
    assert_eq!(report.periodicity.grid.gap_count(), 0);
    assert_eq!(report.periodicity.spectrum.bins().len(), 180);

    // The warming trend survives normalization
    let trend = report.timeline.linear_trend().unwrap();
    assert!(trend.slope_per_year > 0.0);
}

#[test]
fn run_requires_an_input() {
    assert!(matches!(run(&AnalysisConfig::default()), Err(PipelineError::MissingInput)));
}

#[test]
fn nothing_to_analyze() {
    assert!(matches!(
        analyze_observations(Vec::new(), &AnalysisConfig::default()),
        Err(PipelineError::NoMonthlyData)
    ));
}

#[test]
fn exported_tables_have_headers() {
    let mut pipeline = IngestionPipeline::new(CorrectionConfig::default()).unwrap();
    pipeline.extend_lines(station_lines(1950..1953));
    let report = analyze_observations(pipeline.finish().records, &AnalysisConfig::default()).unwrap();

    let mut monthly = Vec::new();
    write_monthly(&mut monthly, &report.calendar_months, &report.timeline).unwrap();
    let monthly = String::from_utf8(monthly).unwrap();
    let mut lines = monthly.lines();
    assert_eq!(lines.next(), Some("series;year;month;fractional_year;mean_normalized"));
    assert!(lines.next().unwrap().starts_with("Jan;1950;1;1950.0;"));
    // 12 series of 3 years, then the 36-month timeline
    assert_eq!(monthly.lines().count(), 1 + 36 + 36);
    assert_eq!(monthly.lines().filter(|l| l.starts_with("timeline;")).count(), 36);

    let mut spectrum = Vec::new();
    write_spectrum(&mut spectrum, &report.periodicity.spectrum).unwrap();
    let spectrum = String::from_utf8(spectrum).unwrap();
    assert_eq!(spectrum.lines().next(), Some("frequency_cycles_per_year;power"));
    assert_eq!(spectrum.lines().count(), 1 + 18);

    let mut periodogram = Vec::new();
    write_periodogram(&mut periodogram, &report.periodicity.periodogram).unwrap();
    let periodogram = String::from_utf8(periodogram).unwrap();
    assert_eq!(periodogram.lines().next(), Some("period_years;power"));
    assert_eq!(periodogram.lines().count(), 1 + 500);
}
