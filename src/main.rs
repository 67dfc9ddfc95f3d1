//! serpscout CLI - search scraper command line interface.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use serpscout::{server, DateRange, Scraper, ScraperConfig, SearchOptions};

/// serpscout - resilient search result page scraper
#[derive(Parser)]
#[command(name = "serpscout")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single search and print the results
    Search(SearchArgs),

    /// Serve the REST facade
    Serve(ServeArgs),
}

#[derive(Parser)]
struct SearchArgs {
    /// Search term
    query: String,

    /// Number of results to return (1-50)
    #[arg(short, long, default_value = "10")]
    num: usize,

    /// Language code
    #[arg(short, long, default_value = "en")]
    lang: String,

    /// Restrict results to a single domain
    #[arg(long)]
    site: Option<String>,

    /// Restrict results to a file extension (pdf, doc, ...)
    #[arg(long)]
    filetype: Option<String>,

    /// Recency filter: day, week, month or year
    #[arg(long)]
    date_range: Option<String>,

    /// Enable safe search
    #[arg(long)]
    safe: bool,

    /// Maximum fetch attempts when the target serves block pages
    #[arg(long, default_value = "3")]
    attempts: u32,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Parser)]
struct ServeArgs {
    /// Bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Bind port
    #[arg(long, default_value = "8000")]
    port: u16,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("serpscout=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("serpscout=info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Search(args) => run_search(args).await,
        Commands::Serve(args) => run_serve(args).await,
    }
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let config = ScraperConfig {
        max_attempts: args.attempts,
        ..Default::default()
    };
    let scraper = Scraper::new(config);

    let mut options = SearchOptions::new(&args.query)
        .with_num_results(args.num)
        .with_language(&args.lang)
        .with_safe_search(args.safe);
    if let Some(site) = args.site {
        options = options.with_site(site);
    }
    if let Some(filetype) = args.filetype {
        options = options.with_filetype(filetype);
    }
    if let Some(range) = args.date_range.as_deref() {
        match DateRange::parse(range) {
            Some(parsed) => options = options.with_date_range(parsed),
            None => eprintln!("Warning: unknown date range '{}', ignoring", range),
        }
    }

    let response = scraper.search(&options).await;
    scraper.close().await;

    match args.format {
        OutputFormat::Text => {
            if !response.success {
                anyhow::bail!(
                    "search failed: {}",
                    response.error.unwrap_or_else(|| "unknown error".to_string())
                );
            }
            println!(
                "\nResults for \"{}\" ({} from {}):\n",
                response.query, response.results_count, response.source
            );
            for result in &response.results {
                println!("{}. {}", result.position, result.title);
                println!("   URL: {}", result.url);
                if !result.snippet.is_empty() {
                    println!("   {}", result.snippet);
                }
                if !result.date.is_empty() {
                    println!("   Date: {}", result.date);
                }
                println!();
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let scraper = Arc::new(Scraper::new(ScraperConfig::default()));

    server::serve(Arc::clone(&scraper), addr).await?;

    // Graceful shutdown: tear down pooled connections before exit.
    scraper.close().await;
    Ok(())
}
