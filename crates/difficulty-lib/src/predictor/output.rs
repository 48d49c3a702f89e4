//! Conversion of raw forest outputs into a prediction

use crate::error::PredictError;
use crate::models::{Diagnostics, DifficultyClass, Prediction};

/// Decode the classifier's vote into a class
pub fn decode_class(raw: f64) -> Result<DifficultyClass, PredictError> {
    if !raw.is_finite() || raw < 0.0 {
        return Err(PredictError::InvalidClass(raw));
    }
    DifficultyClass::from_index(raw.round() as usize).ok_or(PredictError::InvalidClass(raw))
}

/// Regression output rounded to the nearest whole rating
pub fn round_score(raw: f64) -> i64 {
    raw.round() as i64
}

pub fn format_prediction(
    raw_class: f64,
    raw_score: f64,
    diagnostics: Diagnostics,
) -> Result<Prediction, PredictError> {
    Ok(Prediction {
        problem_class: decode_class(raw_class)?,
        problem_score: round_score(raw_score),
        diagnostics,
    })
}
