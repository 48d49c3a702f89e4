//! Feature inspection without a model

use anyhow::Result;
use difficulty_lib::{Diagnostics, FeatureExtractor, FeatureRecipe, FeatureVector, ProblemSample};
use serde::Serialize;

use crate::output::{format_tiers, print_json, print_table, FieldRow, OutputFormat};
use crate::StatementArgs;

#[derive(Serialize)]
struct Inspection {
    recipe: FeatureRecipe,
    features: FeatureVector,
    diagnostics: Diagnostics,
}

pub fn run(recipe: FeatureRecipe, statement: &StatementArgs, format: OutputFormat) -> Result<()> {
    let mut sample = ProblemSample::new(
        statement.description.as_str(),
        statement.input_description.as_str(),
        statement.output_description.as_str(),
    )
    .with_tags(statement.tags.clone());
    sample.solved_count = statement.solved_count;

    let (features, diagnostics) = FeatureExtractor::new(recipe).extract_sample(&sample);
    let inspection = Inspection {
        recipe,
        features,
        diagnostics,
    };

    match format {
        OutputFormat::Json => print_json(&inspection)?,
        OutputFormat::Table => {
            let f = &inspection.features;
            let d = &inspection.diagnostics;
            let fourth = match recipe {
                FeatureRecipe::TextDiversity => "Vocabulary diversity",
                FeatureRecipe::SolvedCount => "log(solved + 1)",
            };
            print_table(&[
                FieldRow::new("Recipe", recipe),
                FieldRow::new("log(length + 1)", format!("{:.4}", f.log_text_length)),
                FieldRow::new("Math count", f.math_count),
                FieldRow::new("Math ratio", format!("{:.4}", f.math_ratio)),
                FieldRow::new(fourth, format!("{:.4}", f.fourth_signal)),
                FieldRow::new(
                    "Simple / Medium / Hard",
                    format!("{} / {} / {}", f.simple_flag, f.medium_flag, f.hard_flag),
                ),
                FieldRow::new("Text length", d.text_length),
                FieldRow::new("Detected tiers", format_tiers(&d.detected_tags)),
                FieldRow::new("Diversity", &d.vocabulary_diversity),
            ]);
        }
    }
    Ok(())
}
