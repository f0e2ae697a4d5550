//! Appends weather features to every row of a dated, tab-separated table.

use clap::Parser;
use log::info;
use std::path::PathBuf;
use weather_enrich::{
    enriched_path, read_table, reference_dates, write_table, BucketAggregator, EnrichError,
    EnrichmentConfig, GriddedSource, HourRange, WeatherEnricher, DEFAULT_MAX_DISTANCE_KM,
    DEFAULT_SEPARATOR,
};

/// Environment variable naming a JSON enrichment config. The country preset is used when unset.
const CONFIG_ENV: &str = "WEATHER_ENRICH_CONFIG";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Tab-separated table with a `Date` column
    input_file: PathBuf,

    /// Gridded measurement file (.tsv, .csv or .parquet)
    weather_file: PathBuf,

    /// Bucket reduction: by_parameter, mean, min, max, diff or total
    #[arg(long, default_value = "by_parameter")]
    aggregator: String,

    /// Hours of the day to use, e.g. "6-18"
    #[arg(long, default_value = "0-23")]
    hours: String,

    /// Search radius in km when mapping points onto the grid
    #[arg(long, default_value_t = DEFAULT_MAX_DISTANCE_KM)]
    max_distance_km: f64,
}

fn load_config() -> Result<EnrichmentConfig, EnrichError> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            info!("Using enrichment config {:?}", path);
            EnrichmentConfig::from_json_file(&path)
        }
        None => Ok(EnrichmentConfig::country()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = load_config()?;
    let aggregator: BucketAggregator = args.aggregator.parse()?;
    let hours: HourRange = args.hours.parse()?;
    let max_distance_km = args.max_distance_km;

    let input = args.input_file.clone();
    let weather = args.weather_file.clone();
    let (table, source) = tokio::try_join!(
        tokio::task::spawn_blocking(move || -> Result<_, EnrichError> {
            let table = read_table(&input, DEFAULT_SEPARATOR)?;
            let dates = reference_dates(&table)?;
            info!("Read {} rows from {:?}", dates.len(), input);
            Ok(table)
        }),
        tokio::task::spawn_blocking(move || {
            GriddedSource::from_path(&weather)
                .max_distance_km(max_distance_km)
                .aggregator(aggregator)
                .hours(hours)
                .load()
        }),
    )?;
    let (table, source) = (table?, source?);

    let enricher = WeatherEnricher::builder()
        .source(source)
        .config(config)
        .build()?;
    let mut enriched = tokio::task::spawn_blocking(move || enricher.enrich(table)).await??;

    let output = enriched_path(&args.input_file);
    write_table(&mut enriched, &output, DEFAULT_SEPARATOR)?;
    info!(
        "Wrote {} rows and {} columns to {:?}",
        enriched.height(),
        enriched.width(),
        output
    );
    Ok(())
}
