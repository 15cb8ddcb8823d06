use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use knsearch_core::{Config, RetrievalOverrides, SearchPipeline, SearchRequest};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "knsearch")]
#[command(about = "Retrieve the schema and instances of a knowledge network relevant to a query", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search a knowledge network
    Search {
        /// Knowledge network ID
        kn_id: String,

        /// Free-text query
        #[arg(required = true)]
        query: Vec<String>,

        /// Return schema concepts only
        #[arg(long)]
        only_schema: bool,

        /// Rank relation types with the rerank service
        #[arg(long)]
        rerank: bool,

        /// Relation types to keep
        #[arg(long)]
        top_k: Option<usize>,

        /// Omit low-signal schema fields
        #[arg(long)]
        brief: bool,

        /// Attach a sample instance to each object type
        #[arg(long)]
        samples: bool,

        /// Config file (.toml, .yaml or .yml)
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
    /// Print the default configuration
    Config,
}

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("knsearch=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Commands::Search {
            kn_id,
            query,
            only_schema,
            rerank,
            top_k,
            brief,
            samples,
            config,
        } => {
            let config = match config {
                Some(path) => Config::from_file(&path)
                    .with_context(|| format!("failed to load config from {}", path.display()))?,
                None => Config::load().context("failed to load config")?,
            };
            debug!(manager_url = %config.ontology.manager_url, "config loaded");

            let request = SearchRequest {
                kn_id,
                query: query.join(" "),
                only_schema,
                enable_rerank: rerank,
                retrieval_config: Some(RetrievalOverrides {
                    top_k,
                    schema_brief: brief.then_some(true),
                    include_sample_data: samples.then_some(true),
                    ..Default::default()
                }),
            };

            let pipeline = SearchPipeline::from_config(&config);
            let response = pipeline.search(&request).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Config => {
            print!("{}", Config::default_config_string());
        }
    }

    Ok(())
}
