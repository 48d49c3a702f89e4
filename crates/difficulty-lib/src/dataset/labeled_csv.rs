//! Labeled problem CSV
//!
//! Header row `title,description,input_description,output_description,
//! problem_class,problem_score`; `title` and any extra columns are ignored.

use crate::error::DatasetError;
use crate::models::{DifficultyClass, LabeledSample, ProblemSample};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct CsvRow {
    description: String,
    input_description: String,
    output_description: String,
    problem_class: String,
    problem_score: String,
}

pub fn read_labeled<R: Read>(reader: R) -> Result<Vec<LabeledSample>, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    for (i, record) in csv_reader.deserialize::<CsvRow>().enumerate() {
        // header is line 1
        let row = i + 2;
        let record = record?;
        let class: DifficultyClass = record
            .problem_class
            .parse()
            .map_err(|message| DatasetError::InvalidRow { row, message })?;
        let score: f64 = record
            .problem_score
            .parse()
            .ok()
            .filter(|s: &f64| s.is_finite())
            .ok_or_else(|| DatasetError::InvalidRow {
                row,
                message: format!("unparsable problem_score {:?}", record.problem_score),
            })?;
        samples.push(LabeledSample::new(
            ProblemSample::new(
                record.description,
                record.input_description,
                record.output_description,
            ),
            class,
            score,
        ));
    }
    Ok(samples)
}

pub fn load_labeled_csv(path: &Path) -> Result<Vec<LabeledSample>, DatasetError> {
    let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let samples = read_labeled(file)?;
    info!(path = %path.display(), samples = samples.len(), "Labeled CSV loaded");
    Ok(samples)
}
