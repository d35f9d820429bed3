use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use expo_scraper::apis::{base::parse_url, extract_rows, strategies_for};
use expo_scraper::config::{Config, LogLevel};
use expo_scraper::constants;
use expo_scraper::logging;
use expo_scraper::normalize::normalize;
use expo_scraper::output::{write_csv, write_records};
use expo_scraper::pipeline::{Orchestrator, RunReport};
use expo_scraper::types::Source;
use expo_scraper::EventRecordAssembler;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "expo_scraper")]
#[command(about = "Japanese exhibition and event listing aggregator")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (defaults to ./expo_scraper.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured log level
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape every enabled source and write the CSV
    Run {
        /// Sources to run (comma-separated). Available: kagaku, bigsight, makuhari
        #[arg(long, value_delimiter = ',')]
        sources: Option<Vec<Source>>,
        /// Output CSV path
        #[arg(long)]
        output: Option<PathBuf>,
        /// Save every fetched page under the debug directory
        #[arg(long)]
        debug_dump: bool,
    },
    /// Extract and assemble rows from a saved listing page
    Parse {
        #[arg(long)]
        source: Source,
        /// Saved HTML (UTF-8), e.g. a debug dump
        #[arg(long)]
        file: PathBuf,
        /// URL relative links are resolved against. Defaults to the listing URL.
        #[arg(long)]
        url: Option<String>,
        /// Write the CSV here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the normalized range for each date text
    Normalize {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// List the known sources
    Sources,
}

fn print_report(report: &RunReport) {
    println!("\n📊 Run results for {}:", report.run_date);
    for source in &report.sources {
        match &source.error {
            Some(error) => println!("   {:<10} ❌ {}", source.source, error),
            None => println!(
                "   {:<10} fetched {:>4}  accepted {:>4}  rejected {:>4}  duplicates {:>4}",
                source.source, source.fetched, source.accepted, source.rejected, source.duplicates
            ),
        }
    }
    println!("   Total records: {}", report.total_records);
    if let Some(file) = &report.output_file {
        println!("   Output file: {}", file);
    }
}

async fn run(config: Config) -> Result<()> {
    config.validate()?;
    let orchestrator = Orchestrator::from_config(&config).context("Failed to set up sources")?;
    let report = orchestrator
        .run_to_csv(&config.output_path)
        .await
        .with_context(|| format!("Failed to write {}", config.output_path.display()))?;

    match serde_json::to_string(&report) {
        Ok(json) => debug!(report = %json, "Run report"),
        Err(e) => warn!("Could not serialize run report: {}", e),
    }
    print_report(&report);

    let failed = report.failed_sources().count();
    if failed > 0 {
        warn!("{} of {} sources failed", failed, report.sources.len());
    }
    Ok(())
}

fn parse_saved_page(
    config: &Config,
    source: Source,
    file: &Path,
    url: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let html = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let page_url = parse_url(source, url.unwrap_or(source.listing_url()))?;
    let strategies = strategies_for(source)?;

    let rows = extract_rows(source, &strategies, &html, &page_url);
    let assembler = EventRecordAssembler::for_today(config.assembler.clone());
    let assembly = assembler.assemble_with_report(rows);
    if let Some(tally) = assembly.tallies.get(source.as_str()) {
        info!(
            source = %source,
            accepted = tally.accepted,
            rejected = tally.rejected,
            duplicates = tally.duplicates,
            "Parsed saved page"
        );
    }

    match output {
        Some(path) => write_csv(path, &assembly.records)?,
        None => write_records(io::stdout().lock(), &assembly.records)?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    let _guard = logging::init_logging(config.log_level, config.log_dir.as_deref());

    match cli.command {
        Commands::Run {
            sources,
            output,
            debug_dump,
        } => {
            if let Some(sources) = sources {
                config.sources = sources;
            }
            if let Some(output) = output {
                config.output_path = output;
            }
            config.debug_dump_enabled |= debug_dump;
            println!("🚀 Running {} sources...", config.sources.len());
            run(config).await?;
        }
        Commands::Parse {
            source,
            file,
            url,
            output,
        } => {
            parse_saved_page(&config, source, &file, url.as_deref(), output.as_deref())?;
        }
        Commands::Normalize { text } => {
            for text in &text {
                println!("{}\t{}", text, normalize(Some(text.as_str())));
            }
        }
        Commands::Sources => {
            for name in constants::get_supported_sources() {
                let source: Source = name.parse()?;
                println!("{:<10} {}", source, source.listing_url());
            }
        }
    }
    Ok(())
}
