//! Problem Difficulty Estimator CLI
//!
//! Trains models from synthetic, archive or CSV data, runs predictions
//! locally or against a running server, and inspects extracted features.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::{inspect, predict, remote, train};
use difficulty_lib::{FeatureRecipe, PredictionRequest};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Problem Difficulty Estimator CLI
#[derive(Parser)]
#[command(name = "cpd")]
#[command(author, version, about = "CLI for the Problem Difficulty Estimator", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, short, default_value = "table", global = true)]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a model and save it as an artifact
    #[command(subcommand)]
    Train(TrainCommands),

    /// Predict difficulty with a local model
    Predict {
        /// Model artifact (defaults to the config file, then model.json)
        #[arg(long, short, env = "CPD_MODEL")]
        model: Option<PathBuf>,

        #[command(flatten)]
        statement: StatementArgs,
    },

    /// Show extracted features and diagnostics without a model
    Inspect {
        /// Feature recipe (text-diversity-v1 or solved-count-v1)
        #[arg(long, default_value = "text-diversity-v1")]
        recipe: FeatureRecipe,

        #[command(flatten)]
        statement: StatementArgs,
    },

    /// Ask a running server for a prediction
    Remote {
        /// Server URL (defaults to the config file, then http://localhost:5000)
        #[arg(long, env = "CPD_API_URL")]
        api_url: Option<String>,

        #[command(flatten)]
        statement: StatementArgs,
    },
}

#[derive(Subcommand)]
pub enum TrainCommands {
    /// Train on seeded noisy variants of the anchor problems
    Synthetic {
        /// Number of anchor variants to generate
        #[arg(long, default_value_t = 2000)]
        samples: usize,

        #[command(flatten)]
        options: TrainOptions,
    },

    /// Train on rated problems from an archive JSON dump
    Archive {
        /// Archive JSON (problem list or problemset response)
        path: PathBuf,

        /// Keep only this many problems, spread across the rating range
        #[arg(long)]
        limit: Option<usize>,

        #[command(flatten)]
        options: TrainOptions,
    },

    /// Train on a labeled CSV file
    Csv {
        /// CSV with title,description,input_description,output_description,problem_class,problem_score
        path: PathBuf,

        #[command(flatten)]
        options: TrainOptions,
    },
}

/// Options shared by every training source
#[derive(Args, Clone, Debug)]
pub struct TrainOptions {
    /// Where to write the model artifact
    #[arg(long, short, env = "CPD_MODEL")]
    pub model: Option<PathBuf>,

    /// Trees per forest
    #[arg(long)]
    pub trees: Option<usize>,

    /// Maximum tree depth
    #[arg(long)]
    pub depth: Option<usize>,

    /// Seed for sampling and synthetic data
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Override the source's default feature recipe
    #[arg(long)]
    pub recipe: Option<FeatureRecipe>,
}

/// The three statement fields plus optional metadata
#[derive(Args, Clone, Debug)]
pub struct StatementArgs {
    /// Problem description
    #[arg(long, short = 'd')]
    pub description: String,

    /// Input format description
    #[arg(long = "input", short = 'i')]
    pub input_description: String,

    /// Output format description
    #[arg(long = "output", short = 'o')]
    pub output_description: String,

    /// Comma-separated problem tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Number of accepted solutions
    #[arg(long)]
    pub solved_count: Option<u64>,
}

impl StatementArgs {
    pub fn to_request(&self) -> PredictionRequest {
        PredictionRequest {
            tags: self.tags.clone(),
            solved_count: self.solved_count,
            ..PredictionRequest::new(
                self.description.as_str(),
                self.input_description.as_str(),
                self.output_description.as_str(),
            )
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::registry()
            .with(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,difficulty_lib=debug")),
            )
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }

    let config = config::Config::load()?;

    match cli.command {
        Commands::Train(source) => {
            train::run(source, &config, cli.format)?;
        }
        Commands::Predict { model, statement } => {
            predict::run(&config.model_path(model), &statement, cli.format)?;
        }
        Commands::Inspect { recipe, statement } => {
            inspect::run(recipe, &statement, cli.format)?;
        }
        Commands::Remote { api_url, statement } => {
            let client = client::ApiClient::new(&config.api_url(api_url))?;
            remote::run(&client, &statement, cli.format).await?;
        }
    }

    Ok(())
}
