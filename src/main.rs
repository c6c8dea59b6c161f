use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use browse_intent::commands::{
    cluster, load_config, predict, prepare, serve, show_or_init_config, train_intent, train_topics,
    train_website,
};

#[derive(Parser)]
#[command(name = "browse-intent")]
#[command(about = "Browsing intent classification, topic analysis and prediction service")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml (defaults to ~/.browse-intent)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or initialise the configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Write the effective configuration to config.toml
        #[arg(long)]
        init: bool,
    },
    /// Start the HTTP prediction service
    Serve,
    /// Train a model and save it under the models directory
    Train {
        #[command(subcommand)]
        target: TrainTarget,
    },
    /// Predict the intent of a single visit
    Predict {
        /// URL of the visited page
        url: String,
        /// Title of the visited page
        title: String,
    },
    /// Cluster recorded visits and print each cluster
    Cluster,
    /// Convert the website classification CSV into labeled JSON
    Prepare {
        /// CSV with website_url and Category columns
        #[arg(long)]
        input: Option<PathBuf>,
        /// Destination JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum TrainTarget {
    /// Intent classifier over visit titles and domains
    Intent,
    /// Website classifier over fetched page text
    Website {
        /// Read labeled sites from this CSV instead of labeled_data.json
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// LDA topic model over visits
    Topics,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config_dir.as_deref())?;

    match cli.command {
        Commands::Config { show, init } => {
            if show || init {
                show_or_init_config(&config, init)?;
            } else {
                eprintln!("Nothing to do. Use --show or --init.");
            }
        }
        Commands::Serve => {
            serve(&config).await?;
        }
        Commands::Train { target } => match target {
            TrainTarget::Intent => train_intent(&config)?,
            TrainTarget::Website { csv } => train_website(&config, csv.as_deref())?,
            TrainTarget::Topics => train_topics(&config)?,
        },
        Commands::Predict { url, title } => {
            predict(&config, &url, &title)?;
        }
        Commands::Cluster => {
            cluster(&config)?;
        }
        Commands::Prepare { input, output } => {
            prepare(&config, input, output)?;
        }
    }

    Ok(())
}
