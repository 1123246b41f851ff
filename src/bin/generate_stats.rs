use clap::Parser;
use reading_shelf::config::DEFAULT_CHALLENGE_YEAR;
use reading_shelf::generate::{generate_stats, read_export};
use reading_shelf::storage::read_json;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

/// Builds `reading_stats.json` from a Goodreads library export.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = "goodreads_library_export.csv")]
    input: PathBuf,

    #[arg(long, default_value = "reading_stats.json")]
    output: PathBuf,

    /// JSON object mapping export titles to series names.
    #[arg(long)]
    series_mapping: Option<PathBuf>,

    /// Year counted into `books_2025`.
    #[arg(long, default_value_t = DEFAULT_CHALLENGE_YEAR)]
    year: i32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let args = Args::parse();

    let export = std::fs::File::open(&args.input).inspect_err(|err| {
        error!("cannot open {}: {err}", args.input.display());
    })?;
    let rows = read_export(export)?;

    let series_titles: HashMap<String, String> = match &args.series_mapping {
        Some(path) => read_json(path).await?,
        None => HashMap::new(),
    };

    let records = rows
        .into_iter()
        .map(|row| row.into_record(&series_titles))
        .collect();
    let document = generate_stats(records, args.year);

    tokio::fs::write(&args.output, serde_json::to_vec_pretty(&document)?).await?;
    info!("wrote {}", args.output.display());

    Ok(())
}
