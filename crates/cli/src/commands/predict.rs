//! Local prediction against a saved model

use anyhow::{Context, Result};
use difficulty_lib::{store, Predictor};
use std::path::Path;
use std::sync::Arc;

use crate::output::{print_prediction, OutputFormat};
use crate::StatementArgs;

pub fn run(model_path: &Path, statement: &StatementArgs, format: OutputFormat) -> Result<()> {
    let model = store::load(model_path).with_context(|| {
        format!(
            "Failed to load model from {}; train one with `cpd train`",
            model_path.display()
        )
    })?;
    let predictor = Predictor::new(Arc::new(model));
    let prediction = predictor.predict(&statement.to_request())?;
    print_prediction(&prediction, format)
}
