//! Core data models for the difficulty estimator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of values in every feature vector, for every recipe
pub const NUM_FEATURES: usize = 7;

/// A problem statement plus whatever archive metadata came with it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProblemSample {
    pub description: String,
    pub input_description: String,
    pub output_description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub solved_count: Option<u64>,
    #[serde(default)]
    pub rating: Option<i32>,
}

impl ProblemSample {
    pub fn new(
        description: impl Into<String>,
        input_description: impl Into<String>,
        output_description: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            input_description: input_description.into(),
            output_description: output_description.into(),
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_solved_count(mut self, solved_count: u64) -> Self {
        self.solved_count = Some(solved_count);
        self
    }

    pub fn with_rating(mut self, rating: i32) -> Self {
        self.rating = Some(rating);
        self
    }
}

/// Discrete difficulty tier, encoded as 0/1/2 for the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifficultyClass {
    Easy,
    Medium,
    Hard,
}

impl DifficultyClass {
    pub const ALL: [DifficultyClass; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub fn index(self) -> usize {
        match self {
            Self::Easy => 0,
            Self::Medium => 1,
            Self::Hard => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Class thresholds used for rated archive problems
    pub fn from_rating(rating: i32) -> Self {
        if rating < 1200 {
            Self::Easy
        } else if rating < 1900 {
            Self::Medium
        } else {
            Self::Hard
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl fmt::Display for DifficultyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            other => Err(format!("unknown difficulty class '{}'", other)),
        }
    }
}

/// A training example: statement, target class and target score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub problem: ProblemSample,
    pub class: DifficultyClass,
    pub score: f64,
}

impl LabeledSample {
    pub fn new(problem: ProblemSample, class: DifficultyClass, score: f64) -> Self {
        Self {
            problem,
            class,
            score,
        }
    }
}

/// Fixed-order feature vector fed to both forests
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub log_text_length: f64,
    pub math_count: f64,
    pub math_ratio: f64,
    /// Vocabulary diversity or log solved-count, depending on the recipe
    pub fourth_signal: f64,
    pub simple_flag: f64,
    pub medium_flag: f64,
    pub hard_flag: f64,
}

impl FeatureVector {
    pub fn to_array(&self) -> [f64; NUM_FEATURES] {
        [
            self.log_text_length,
            self.math_count,
            self.math_ratio,
            self.fourth_signal,
            self.simple_flag,
            self.medium_flag,
            self.hard_flag,
        ]
    }
}

/// Human-readable breakdown of an extraction; never used as model input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub text_length: usize,
    pub math_count: usize,
    pub detected_tags: Vec<String>,
    pub vocabulary_diversity: String,
}

/// Result of a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub problem_class: DifficultyClass,
    pub problem_score: i64,
    pub diagnostics: Diagnostics,
}

/// Prediction input as it arrives at the serving boundary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub description: Option<String>,
    pub input_description: Option<String>,
    pub output_description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub solved_count: Option<u64>,
}

impl PredictionRequest {
    pub fn new(
        description: impl Into<String>,
        input_description: impl Into<String>,
        output_description: impl Into<String>,
    ) -> Self {
        Self {
            description: Some(description.into()),
            input_description: Some(input_description.into()),
            output_description: Some(output_description.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_index_round_trip() {
        for class in DifficultyClass::ALL {
            assert_eq!(DifficultyClass::from_index(class.index()), Some(class));
        }
        assert_eq!(DifficultyClass::from_index(3), None);
    }

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(DifficultyClass::from_rating(800), DifficultyClass::Easy);
        assert_eq!(DifficultyClass::from_rating(1199), DifficultyClass::Easy);
        assert_eq!(DifficultyClass::from_rating(1200), DifficultyClass::Medium);
        assert_eq!(DifficultyClass::from_rating(1899), DifficultyClass::Medium);
        assert_eq!(DifficultyClass::from_rating(1900), DifficultyClass::Hard);
    }

    #[test]
    fn test_class_parsing() {
        assert_eq!("Easy".parse::<DifficultyClass>(), Ok(DifficultyClass::Easy));
        assert_eq!(" hard ".parse::<DifficultyClass>(), Ok(DifficultyClass::Hard));
        assert!("impossible".parse::<DifficultyClass>().is_err());
    }

    #[test]
    fn test_diagnostics_serialize_camel_case() {
        let diagnostics = Diagnostics {
            text_length: 23,
            math_count: 0,
            detected_tags: vec!["simple".to_string()],
            vocabulary_diversity: "85.7%".to_string(),
        };
        let json = serde_json::to_value(&diagnostics).unwrap();
        assert_eq!(json["textLength"], 23);
        assert_eq!(json["detectedTags"][0], "simple");
        assert_eq!(json["vocabularyDiversity"], "85.7%");
    }
}
