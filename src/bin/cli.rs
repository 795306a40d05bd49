//! voxbrief command line.
//! Run with: cargo run --bin voxbrief -- <command>

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use voxbrief::analysis::demo_report;
use voxbrief::config::AppConfig;
use voxbrief::scraping::format_profile_summary;
use voxbrief::server::AppState;
use voxbrief::start_voxbrief::init_tracing;

#[derive(Parser)]
#[command(name = "voxbrief")]
#[command(version)]
#[command(about = "Company, CV and LinkedIn briefs from a hosted language model", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a company website.
    Company {
        /// Website URL, scheme optional.
        #[arg(required_unless_present = "demo")]
        url: Option<String>,

        /// Word budget of the analysis.
        #[arg(short, long, value_name = "N")]
        words: Option<usize>,

        /// Analyse the built-in sample page offline.
        #[arg(long)]
        demo: bool,
    },

    /// Summarize a CV, plain text or PDF.
    Cv {
        path: PathBuf,

        /// Word budget of the summary.
        words: Option<usize>,
    },

    /// Extract a LinkedIn profile from a URL or pasted text.
    Linkedin { input: String },

    /// Ask the assistant.
    Prompt { text: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if let Commands::Company { demo: true, .. } = &cli.command {
        println!("{}", demo_report());
        return Ok(());
    }

    let config = AppConfig::from_env().context("invalid configuration")?;
    let state = AppState::from_config(config).context("failed to build clients")?;

    match cli.command {
        Commands::Company { url, words, .. } => {
            let url = url.context("a URL is required")?;
            let words = words
                .filter(|w| *w > 0)
                .unwrap_or_else(|| state.company.default_target_words());
            let analysis = state.company.analyze(&url, words).await;
            if let Some(title) = &analysis.title {
                println!("# {title}\n");
            }
            println!("{}", analysis.analysis);
            if !analysis.success {
                anyhow::bail!("analysis of {url} failed");
            }
        }
        Commands::Cv { path, words } => {
            let words = words
                .filter(|w| *w > 0)
                .unwrap_or_else(|| state.cv.default_target_words());
            let summary = state
                .cv
                .summarize_file(&path, words)
                .await
                .with_context(|| format!("cannot read {}", path.display()))?;
            println!("{}", summary.summary);
        }
        Commands::Linkedin { input } => {
            let profile = if input.to_lowercase().contains("linkedin.com") {
                state.linkedin.scrape_or_error(input.trim()).await
            } else {
                state.linkedin_parser.parse(&input)
            };
            println!("{}", serde_json::to_string_pretty(&profile)?);
            println!("\n{}", format_profile_summary(&profile));
        }
        Commands::Prompt { text } => {
            println!("{}", state.assistant.reply(&text).await);
        }
    }

    Ok(())
}
