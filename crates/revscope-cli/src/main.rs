mod extract;
mod show;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use revscope_core::{OutputFormat, RunRequest};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "revscope-cli")]
#[command(about = "Collect, classify and summarize product reviews")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one extraction in the foreground and print the saved file paths
    Extract {
        /// Product page URL
        #[arg(long)]
        product_url: String,

        /// Stop after this many pages (0 or omitted visits every page)
        #[arg(long)]
        max_pages: Option<u32>,

        /// Output format: json or csv
        #[arg(long, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Print the reconciled counts, score and summary of a saved run
    Show {
        /// Results file (.json or .csv)
        path: PathBuf,

        /// Summary file for CSV results; defaults to the `_summary.json` companion
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Product URL to report for CSV results, which carry no metadata
        #[arg(long)]
        product_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            product_url,
            max_pages,
            format,
        } => {
            let config = revscope_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            let request = RunRequest {
                product_url,
                max_pages,
                format,
            };
            extract::run_extract(&config, request).await?;
        }
        Commands::Show {
            path,
            summary,
            product_url,
        } => {
            init_tracing("warn")?;
            show::run_show(&path, summary.as_deref(), product_url.as_deref()).await?;
        }
    }

    Ok(())
}

fn init_tracing(fallback: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
