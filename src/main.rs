use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use episode_extract::{
    collection_stats, load_existing, run_enhance, run_extraction, run_reformat, AnthropicClient,
    AnthropicConfig, DirectoryDocumentSource, Episode, ExtractionStrategy, JsonFileStore,
    OracleExtractionConfig, ReformatOptions,
};

#[derive(Parser)]
#[command(name = "episode-extract")]
#[command(author, version, about = "Podcast transcript extraction and reconciliation pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract episode records from a directory of transcripts and merge them into the store
    Extract {
        /// Directory of transcript documents (.txt, .md)
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Episode store (JSON array)
        #[arg(short, long)]
        store: PathBuf,

        /// Use the language model instead of the keyword heuristics
        #[arg(long)]
        oracle: bool,

        /// Model override (defaults to ANTHROPIC_MODEL or the built-in model)
        #[arg(long)]
        model: Option<String>,

        /// Transcript characters sent to the model
        #[arg(long, default_value = "4000")]
        prompt_chars: usize,

        /// Extra attempts after a failed model reply
        #[arg(long, default_value = "0")]
        oracle_retries: u32,

        /// Model request timeout in seconds
        #[arg(long, default_value = "120")]
        timeout_secs: u64,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Regenerate topics, quotes and summaries of every stored episode
    Enhance {
        /// Episode store (JSON array)
        #[arg(short, long)]
        store: PathBuf,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Rewrite stored transcripts into `Speaker: [timestamp] text` lines
    Reformat {
        /// Episode store (JSON array)
        #[arg(short, long)]
        store: PathBuf,

        /// Label bare-timestamp paragraphs with the previous speaker
        #[arg(long)]
        fill_missing_speakers: bool,

        /// Report changes without writing them
        #[arg(long)]
        dry_run: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print statistics about the stored episodes
    Inspect {
        /// Episode store (JSON array)
        #[arg(short, long)]
        store: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            input_dir,
            store,
            oracle,
            model,
            prompt_chars,
            oracle_retries,
            timeout_secs,
            verbose,
        } => {
            setup_logging(verbose);
            let oracle_config = oracle.then_some(OracleExtractionConfig {
                prompt_char_budget: prompt_chars,
                max_retries: oracle_retries,
            });
            extract(input_dir, store, oracle_config, model, timeout_secs).await
        }
        Commands::Enhance { store, verbose } => {
            setup_logging(verbose);
            let result = run_enhance(&JsonFileStore::new(&store), Utc::now())?;
            println!(
                "Enhanced {} episodes ({} changed) in {:?}",
                result.total, result.changed, store
            );
            Ok(())
        }
        Commands::Reformat {
            store,
            fill_missing_speakers,
            dry_run,
            verbose,
        } => {
            setup_logging(verbose);
            let options = ReformatOptions {
                fill_missing_speakers,
                dry_run,
            };
            let report = run_reformat(&JsonFileStore::new(&store), &options, Utc::now())?;
            for id in &report.fixed {
                println!("  fixed {}", id);
            }
            let verb = if dry_run { "would fix" } else { "fixed" };
            println!("Reformat {} {}/{} transcripts", verb, report.fixed.len(), report.total);
            Ok(())
        }
        Commands::Inspect { store } => {
            setup_logging(false);
            inspect(store)
        }
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).ok();
}

async fn extract(
    input_dir: PathBuf,
    store: PathBuf,
    oracle_config: Option<OracleExtractionConfig>,
    model: Option<String>,
    timeout_secs: u64,
) -> Result<()> {
    let source = DirectoryDocumentSource::new(&input_dir);
    let store = JsonFileStore::new(&store);

    let client = match &oracle_config {
        Some(_) => {
            let mut config = AnthropicConfig::from_env()?;
            if let Some(model) = model {
                config.model = model;
            }
            config.timeout = Duration::from_secs(timeout_secs);
            let client = AnthropicClient::new(config)?;
            info!("Using model {}", client.model());
            Some(client)
        }
        None => None,
    };

    let strategy = match (&client, oracle_config) {
        (Some(client), Some(config)) => ExtractionStrategy::Oracle {
            oracle: client,
            config,
        },
        _ => ExtractionStrategy::Heuristic,
    };

    info!("Loading transcripts from {:?}", input_dir);
    let report = run_extraction(&source, &strategy, &store, Utc::now())
        .await
        .context("Extraction failed")?;

    println!("Extracted {} episodes", report.batch.len());
    println!("========================");
    for episode in &report.batch {
        print_episode(episode);
    }
    println!();
    println!(
        "{} added, {} updated, {} skipped; {} episodes in {:?}",
        report.added,
        report.updated,
        report.skipped,
        report.total,
        store.path()
    );

    Ok(())
}

fn print_episode(episode: &Episode) {
    let date = episode
        .date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{} | {} | {} #{} | {}",
        episode.id(),
        date,
        or_dash(&episode.series),
        or_dash(&episode.episode_number),
        or_dash(&episode.episode_title)
    );
    if !episode.hosts.is_empty() {
        println!("    hosts: {}", episode.hosts.join(", "));
    }
    if !episode.guests.is_empty() {
        println!("    guests: {}", episode.guests.join(", "));
    }
    for quote in episode.notable_quotes() {
        println!(
            "    \"{}\" ({})",
            quote.quote,
            quote.speaker.as_deref().unwrap_or("Unknown")
        );
    }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn inspect(store: PathBuf) -> Result<()> {
    info!("Loading episodes from {:?}", store);
    let episodes = load_existing(&JsonFileStore::new(&store))?;
    let stats = collection_stats(&episodes);

    println!("Episode Store");
    println!("=============");
    println!("Episodes: {}", stats.episodes);
    println!("Distinct hosts: {}", stats.distinct_hosts);
    println!("Distinct guests: {}", stats.distinct_guests);
    println!("Total words: {}", stats.total_words);
    match (stats.earliest, stats.latest) {
        (Some(earliest), Some(latest)) => println!("Date range: {} to {}", earliest, latest),
        _ => println!("Date range: -"),
    }
    println!();

    println!("Series");
    println!("------");
    for (series, count) in &stats.series {
        println!("{}: {}", or_dash(series), count);
    }
    println!();

    println!("Episodes");
    println!("--------");
    for episode in &episodes {
        print_episode(episode);
    }

    Ok(())
}
