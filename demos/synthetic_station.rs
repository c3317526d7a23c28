#![allow(missing_docs, clippy::unwrap_used)]
use solar_climate::analysis::analyze_observations;
use solar_climate::spectrum::MULTI_YEAR_WINDOW;
use solar_climate::{AnalysisConfig, IngestionPipeline};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Gothenburg coordinates
    let latitude = 57.7607;
    let longitude = 12.9468;
    let cycle_years = 11.0; // injected cycle
    let warming_per_century = 0.8; // °C

    println!("Solar Climate Example - synthetic station");
    println!("Location: {:.4}°N, {:.4}°E", latitude, longitude);
    println!("Injected cycle: {:.1} years, trend {:+.1} °C/century", cycle_years, warming_per_century);
    println!("{:=<60}", "");

    let config = AnalysisConfig::default();
    let mut pipeline = IngestionPipeline::new(config.correction)?;
    for year in 1860..1960 {
        for month in 1..=12u32 {
            for day in [1u32, 8, 15, 22] {
                for hour in [6u32, 12, 18] {
                    let t = f64::from(year) + f64::from(month - 1) / 12.0;
                    let seasonal = 7.0 - 9.0 * (2.0 * std::f64::consts::PI * f64::from(month - 1) / 12.0).cos();
                    let cycle = 0.6 * (2.0 * std::f64::consts::PI * t / cycle_years).sin();
                    let trend = warming_per_century * (t - 1860.0) / 100.0;
                    let diurnal = if hour == 12 { 3.0 } else { 0.0 };
                    let temp = seasonal + cycle + trend + diurnal;
                    pipeline.push_line(&format!(
                        "{year};{month:02};{day:02};{hour:02};{temp:.2};{latitude};{longitude}"
                    ));
                }
            }
        }
    }
    // A few lines as they turn up in digitized archives
    pipeline.push_line("1901;13;01;12;4.0;57.7607;12.9468");
    pipeline.push_line("1901;02;01;12;;57.7607;12.9468");

    let ingested = pipeline.finish();
    let stats = ingested.stats;
    println!("\nIngestion:");
    println!("  Lines:     {}", stats.total_lines);
    println!("  Produced:  {}", stats.produced_records);
    println!("  Malformed: {}", stats.bad_lines);
    println!("  Rejected:  {}", stats.rejected_records);

    let report = analyze_observations(ingested.records, &config)?;

    println!("\nMonthly series:");
    println!("  Months:    {}", report.timeline.len());
    println!("  Grid:      {} ({} gaps)", report.periodicity.grid.len(), report.periodicity.grid.gap_count());
    if let Some(trend) = report.timeline.linear_trend() {
        println!(
            "  Trend:     {:+.4} ± {:.4} normalized units/century",
            trend.per_century(),
            100.0 * trend.slope_stderr
        );
    }

    let (lo, hi) = MULTI_YEAR_WINDOW;
    println!("\nPeriodogram ({lo}-{hi} years):");
    match report.periodicity.periodogram.dominant_period(lo, hi) {
        Some((period, power)) => println!("  Dominant period: {:.2} years (power {:.3})", period, power),
        None => println!("  No power in the window"),
    }

    println!("\nJuly means, first five years:");
    let july = &report.calendar_months[6];
    for (year, mean) in july.points.iter().take(5) {
        println!("  {} {}: {:.3}", july.name(), year, mean);
    }

    Ok(())
}
