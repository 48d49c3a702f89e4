//! Model training commands

use anyhow::{Context, Result};
use colored::Colorize;
use difficulty_lib::dataset::{self, ArchiveProblem};
use difficulty_lib::{
    run_probes, store, LabeledSample, ProbeResult, StructuredLogger, Trainer, TrainingConfig,
};
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

use crate::config::Config;
use crate::output::{
    color_class, print_info, print_json, print_success, print_table, print_warning, FieldRow,
    OutputFormat,
};
use crate::{TrainCommands, TrainOptions};

/// Row for the probe report table
#[derive(Tabled)]
struct ProbeRow {
    #[tabled(rename = "Probe")]
    statement: String,
    #[tabled(rename = "Expected")]
    expected: String,
    #[tabled(rename = "Predicted")]
    predicted: String,
    #[tabled(rename = "Score")]
    score: i64,
    #[tabled(rename = "")]
    verdict: String,
}

impl From<&ProbeResult> for ProbeRow {
    fn from(probe: &ProbeResult) -> Self {
        Self {
            statement: probe.statement.to_string(),
            expected: probe.expected.to_string(),
            predicted: probe
                .predicted
                .map(color_class)
                .unwrap_or_else(|| "?".to_string()),
            score: probe.score,
            verdict: if probe.passed() {
                "✓".green().to_string()
            } else {
                "✗".red().to_string()
            },
        }
    }
}

#[derive(Serialize)]
struct TrainReport {
    model_path: PathBuf,
    source: String,
    recipe: String,
    samples: usize,
    class_counts: [usize; 3],
    checksum: String,
    probes: Vec<ProbeResult>,
}

/// Train from the chosen source and write the artifact
pub fn run(source: TrainCommands, config: &Config, format: OutputFormat) -> Result<()> {
    let (samples, defaults, options, description) = load_source(source)?;
    let training = training_config(defaults, &options);

    if matches!(format, OutputFormat::Table) {
        print_info(&format!(
            "Training on {} samples from {} ({} trees, depth {})",
            samples.len(),
            description,
            training.classifier.n_estimators,
            training.classifier.max_depth
        ));
    }

    let model = Trainer::new(training)
        .train(&samples)
        .context("Training failed")?;

    let model_path = config.model_path(options.model);
    let header = store::save(&model, &model_path)
        .with_context(|| format!("Failed to save model to {}", model_path.display()))?;
    StructuredLogger::new("trainer")
        .log_training_complete(model.metadata(), &model_path.display().to_string());

    let report = TrainReport {
        model_path,
        source: description,
        recipe: header.recipe.id().to_string(),
        samples: model.metadata().samples,
        class_counts: model.metadata().class_counts,
        checksum: header.checksum,
        probes: run_probes(&model),
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => print_report(&report),
    }
    Ok(())
}

fn load_source(
    source: TrainCommands,
) -> Result<(Vec<LabeledSample>, TrainingConfig, TrainOptions, String)> {
    Ok(match source {
        TrainCommands::Synthetic { samples, options } => (
            dataset::generate_synthetic(samples, options.seed),
            TrainingConfig::statement_defaults(),
            options,
            format!("{} synthetic variants", samples),
        ),
        TrainCommands::Archive {
            path,
            limit,
            options,
        } => {
            let problems = dataset::load_archive(&path)
                .with_context(|| format!("Failed to load archive {}", path.display()))?;
            let problems: Vec<ArchiveProblem> = match limit {
                Some(n) => dataset::select_spread(&problems, n),
                None => problems,
            };
            (
                dataset::to_samples(&problems),
                TrainingConfig::archive_defaults(),
                options,
                format!("archive {}", path.display()),
            )
        }
        TrainCommands::Csv { path, options } => (
            dataset::load_labeled_csv(&path)
                .with_context(|| format!("Failed to load CSV {}", path.display()))?,
            TrainingConfig::statement_defaults(),
            options,
            format!("CSV {}", path.display()),
        ),
    })
}

/// Apply command-line overrides on top of a source's defaults
fn training_config(mut config: TrainingConfig, options: &TrainOptions) -> TrainingConfig {
    if let Some(recipe) = options.recipe {
        config.recipe = recipe;
    }
    let trees = options.trees.unwrap_or(config.classifier.n_estimators);
    let depth = options.depth.unwrap_or(config.classifier.max_depth);
    config.with_forest_size(trees, depth).with_seed(options.seed)
}

fn print_report(report: &TrainReport) {
    print_success(&format!("Model saved to {}", report.model_path.display()));
    println!();

    let [easy, medium, hard] = report.class_counts;
    print_table(&[
        FieldRow::new("Recipe", &report.recipe),
        FieldRow::new("Samples", report.samples),
        FieldRow::new("Easy / Medium / Hard", format!("{} / {} / {}", easy, medium, hard)),
        FieldRow::new("Checksum", &report.checksum[..16.min(report.checksum.len())]),
    ]);
    println!();

    println!("{}", "Sanity probes".bold());
    let rows: Vec<ProbeRow> = report.probes.iter().map(ProbeRow::from).collect();
    print_table(&rows);

    let failed = report.probes.iter().filter(|p| !p.passed()).count();
    if failed > 0 {
        print_warning(&format!(
            "{} of {} probes disagree with their expected class",
            failed,
            report.probes.len()
        ));
    }
}
