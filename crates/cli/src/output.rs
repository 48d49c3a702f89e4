//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use difficulty_lib::{DifficultyClass, Prediction};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Two-column row for key/value tables
#[derive(Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl FieldRow {
    pub fn new(field: &str, value: impl ToString) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Print rows as a rounded table
pub fn print_table<T: Tabled>(rows: &[T]) {
    if rows.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a prediction in the requested format
pub fn print_prediction(prediction: &Prediction, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(prediction)?,
        OutputFormat::Table => {
            let d = &prediction.diagnostics;
            print_table(&[
                FieldRow::new("Class", color_class(prediction.problem_class)),
                FieldRow::new("Score", prediction.problem_score),
                FieldRow::new("Text length", d.text_length),
                FieldRow::new("Math symbols", d.math_count),
                FieldRow::new("Detected tiers", format_tiers(&d.detected_tags)),
                FieldRow::new("Vocabulary diversity", &d.vocabulary_diversity),
            ]);
        }
    }
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

pub fn format_tiers(tiers: &[String]) -> String {
    if tiers.is_empty() {
        "-".to_string()
    } else {
        tiers.join(", ")
    }
}

/// Color a class by difficulty
pub fn color_class(class: DifficultyClass) -> String {
    match class {
        DifficultyClass::Easy => class.as_str().green().to_string(),
        DifficultyClass::Medium => class.as_str().yellow().to_string(),
        DifficultyClass::Hard => class.as_str().red().to_string(),
    }
}
