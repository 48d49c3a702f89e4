//! Feature extraction for difficulty estimation
//!
//! Turns the three text fields of a problem statement (plus optional archive
//! metadata) into the fixed seven-value [`FeatureVector`] consumed by both
//! forests, along with a [`Diagnostics`] record for humans.
//!
//! Two recipes exist. A model must be served with the recipe it was trained
//! with, so the recipe travels with every persisted artifact.

mod indicators;
mod tokenizer;

pub use indicators::{count_math_symbols, IndicatorSet, MATH_SYMBOLS, STATEMENT_TIERS, TAG_TIERS, TIER_NAMES};
pub use tokenizer::{Tokenizer, WordTokenizer};

use crate::models::{Diagnostics, FeatureVector, ProblemSample};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Below this many tokens the diversity ratio is reported as zero
pub const MIN_DIVERSITY_TOKENS: usize = 5;

/// Identifies which signals make up a feature vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureRecipe {
    /// Statement text with vocabulary diversity as the fourth signal
    #[default]
    #[serde(rename = "text-diversity-v1")]
    TextDiversity,
    /// Title plus tags with log solved-count as the fourth signal
    #[serde(rename = "solved-count-v1")]
    SolvedCount,
}

impl FeatureRecipe {
    pub fn id(self) -> &'static str {
        match self {
            Self::TextDiversity => "text-diversity-v1",
            Self::SolvedCount => "solved-count-v1",
        }
    }

    pub fn indicators(self) -> &'static IndicatorSet {
        match self {
            Self::TextDiversity => &STATEMENT_TIERS,
            Self::SolvedCount => &TAG_TIERS,
        }
    }
}

impl fmt::Display for FeatureRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FeatureRecipe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "text-diversity-v1" | "text" => Ok(Self::TextDiversity),
            "solved-count-v1" | "solved-count" => Ok(Self::SolvedCount),
            other => Err(format!("unknown feature recipe '{}'", other)),
        }
    }
}

/// Extracts features from problem text
pub struct FeatureExtractor<T: Tokenizer = WordTokenizer> {
    recipe: FeatureRecipe,
    tokenizer: T,
}

impl FeatureExtractor<WordTokenizer> {
    pub fn new(recipe: FeatureRecipe) -> Self {
        Self {
            recipe,
            tokenizer: WordTokenizer,
        }
    }
}

impl<T: Tokenizer> FeatureExtractor<T> {
    pub fn with_tokenizer(recipe: FeatureRecipe, tokenizer: T) -> Self {
        Self { recipe, tokenizer }
    }

    pub fn recipe(&self) -> FeatureRecipe {
        self.recipe
    }

    /// Extract from the three statement fields alone
    pub fn extract(
        &self,
        description: &str,
        input_description: &str,
        output_description: &str,
    ) -> (FeatureVector, Diagnostics) {
        let sample = ProblemSample::new(description, input_description, output_description);
        self.extract_sample(&sample)
    }

    /// Extract from a full sample, using metadata when the recipe needs it
    pub fn extract_sample(&self, sample: &ProblemSample) -> (FeatureVector, Diagnostics) {
        let combined = self.combined_text(sample);
        let char_len = combined.chars().count();
        let tokens = self.tokenizer.tokenize(&combined);

        let math_count = count_math_symbols(&combined);
        let math_ratio = math_count as f64 / (tokens.len() + 1) as f64;
        let diversity = vocabulary_diversity(&tokens);

        let flags = self.recipe.indicators().flags(&combined);
        let detected_tags = TIER_NAMES
            .iter()
            .zip(flags)
            .filter(|(_, hit)| *hit)
            .map(|(name, _)| name.to_string())
            .collect();

        let fourth_signal = match self.recipe {
            FeatureRecipe::TextDiversity => diversity,
            FeatureRecipe::SolvedCount => (sample.solved_count.unwrap_or(0) as f64 + 1.0).ln(),
        };

        let features = FeatureVector {
            log_text_length: (char_len as f64 + 1.0).ln(),
            math_count: math_count as f64,
            math_ratio,
            fourth_signal,
            simple_flag: flag(flags[0]),
            medium_flag: flag(flags[1]),
            hard_flag: flag(flags[2]),
        };

        let diagnostics = Diagnostics {
            text_length: char_len,
            math_count,
            detected_tags,
            vocabulary_diversity: format!("{:.1}%", diversity * 100.0),
        };

        (features, diagnostics)
    }

    fn combined_text(&self, sample: &ProblemSample) -> String {
        let joined = match self.recipe {
            FeatureRecipe::TextDiversity => format!(
                "{} {} {}",
                sample.description, sample.input_description, sample.output_description
            ),
            FeatureRecipe::SolvedCount => {
                format!("{} {}", sample.description, sample.tags.join(" "))
            }
        };
        joined.to_lowercase().trim().to_string()
    }
}

fn flag(hit: bool) -> f64 {
    if hit {
        1.0
    } else {
        0.0
    }
}

fn vocabulary_diversity(tokens: &[&str]) -> f64 {
    if tokens.len() <= MIN_DIVERSITY_TOKENS {
        return 0.0;
    }
    let unique: HashSet<&str> = tokens.iter().copied().collect();
    unique.len() as f64 / (tokens.len() + 1) as f64
}
