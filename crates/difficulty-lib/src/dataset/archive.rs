//! Problem-archive metadata
//!
//! Accepts either a plain list of problem records or the archive's
//! `problemset` payload, where solve counts live in a parallel
//! `problemStatistics` list keyed by contest id and problem index.

use crate::error::DatasetError;
use crate::models::{DifficultyClass, LabeledSample, ProblemSample};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// One problem as described by the archive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveProblem {
    #[serde(default)]
    pub contest_id: Option<u32>,
    #[serde(default)]
    pub index: String,
    pub name: String,
    #[serde(default)]
    pub rating: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub solved_count: Option<u64>,
}

impl ArchiveProblem {
    /// Labeled sample for rated problems; `None` for unrated ones
    pub fn to_labeled(&self) -> Option<LabeledSample> {
        let rating = self.rating?;
        let problem = ProblemSample::new(self.name.clone(), "", "")
            .with_tags(self.tags.clone())
            .with_solved_count(self.solved_count.unwrap_or(0))
            .with_rating(rating);
        Some(LabeledSample::new(
            problem,
            DifficultyClass::from_rating(rating),
            rating as f64,
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProblemStatistic {
    #[serde(default)]
    contest_id: Option<u32>,
    #[serde(default)]
    index: String,
    #[serde(default)]
    solved_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProblemSet {
    problems: Vec<ArchiveProblem>,
    #[serde(default)]
    problem_statistics: Vec<ProblemStatistic>,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    result: ProblemSet,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArchivePayload {
    List(Vec<ArchiveProblem>),
    Envelope(ApiEnvelope),
    ProblemSet(ProblemSet),
}

/// Parse archive JSON in any of the supported shapes
pub fn parse_archive(json: &str) -> Result<Vec<ArchiveProblem>, DatasetError> {
    let json = json.trim_start_matches('\u{feff}');
    let payload: ArchivePayload = serde_json::from_str(json)?;
    Ok(match payload {
        ArchivePayload::List(problems) => problems,
        ArchivePayload::Envelope(envelope) => merge_statistics(envelope.result),
        ArchivePayload::ProblemSet(set) => merge_statistics(set),
    })
}

pub fn load_archive(path: &Path) -> Result<Vec<ArchiveProblem>, DatasetError> {
    let json = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let problems = parse_archive(&json)?;
    info!(path = %path.display(), problems = problems.len(), "Archive metadata loaded");
    Ok(problems)
}

fn merge_statistics(set: ProblemSet) -> Vec<ArchiveProblem> {
    let counts: HashMap<(Option<u32>, String), u64> = set
        .problem_statistics
        .into_iter()
        .map(|s| ((s.contest_id, s.index), s.solved_count))
        .collect();
    set.problems
        .into_iter()
        .map(|mut p| {
            if p.solved_count.is_none() {
                let key = (p.contest_id, p.index.clone());
                p.solved_count = Some(counts.get(&key).copied().unwrap_or(0));
            }
            p
        })
        .collect()
}

/// Rated, tagged problems sorted by rating, sampled at an even stride
pub fn select_spread(problems: &[ArchiveProblem], limit: usize) -> Vec<ArchiveProblem> {
    let mut rated: Vec<&ArchiveProblem> = problems
        .iter()
        .filter(|p| p.rating.is_some() && !p.tags.is_empty())
        .collect();
    rated.sort_by_key(|p| p.rating);
    if limit == 0 || rated.is_empty() {
        return Vec::new();
    }
    let step = (rated.len() / limit).max(1);
    let selected: Vec<ArchiveProblem> = rated
        .into_iter()
        .step_by(step)
        .take(limit)
        .cloned()
        .collect();
    debug!(selected = selected.len(), step, "Selected rating spread");
    selected
}

/// Labeled samples for every rated problem; unrated ones are dropped
pub fn to_samples(problems: &[ArchiveProblem]) -> Vec<LabeledSample> {
    let samples: Vec<LabeledSample> = problems.iter().filter_map(|p| p.to_labeled()).collect();
    let skipped = problems.len() - samples.len();
    if skipped > 0 {
        debug!(skipped, "Skipped unrated problems");
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: &str = r#"[
        {"contestId": 4, "index": "A", "name": "Watermelon", "rating": 800,
         "tags": ["brute force", "math"], "solvedCount": 400000},
        {"contestId": 1, "index": "A", "name": "Theatre Square", "rating": 1000,
         "tags": ["math"]},
        {"contestId": 2000, "index": "H", "name": "Unrated Thing", "tags": []}
    ]"#;

    const PROBLEMSET: &str = r#"{
        "status": "OK",
        "result": {
            "problems": [
                {"contestId": 10, "index": "B", "name": "Flows", "rating": 2400, "tags": ["flows"]},
                {"contestId": 10, "index": "C", "name": "Greedy", "rating": 1500, "tags": ["greedy"]}
            ],
            "problemStatistics": [
                {"contestId": 10, "index": "B", "solvedCount": 321}
            ]
        }
    }"#;

    #[test]
    fn test_parse_plain_list() {
        let problems = parse_archive(LIST).unwrap();
        assert_eq!(problems.len(), 3);
        assert_eq!(problems[0].solved_count, Some(400000));
        assert_eq!(problems[1].solved_count, None);
    }

    #[test]
    fn test_parse_envelope_joins_statistics() {
        let problems = parse_archive(PROBLEMSET).unwrap();
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0].solved_count, Some(321));
        assert_eq!(problems[1].solved_count, Some(0));
    }

    #[test]
    fn test_byte_order_mark_ignored() {
        let with_bom = format!("\u{feff}{}", LIST);
        assert_eq!(parse_archive(&with_bom).unwrap().len(), 3);
    }

    #[test]
    fn test_unrated_excluded_and_classes_assigned() {
        let samples = to_samples(&parse_archive(LIST).unwrap());
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].class, DifficultyClass::Easy);
        assert_eq!(samples[0].score, 800.0);
        assert_eq!(samples[0].problem.solved_count, Some(400000));
        assert_eq!(samples[1].problem.solved_count, Some(0));
        assert_eq!(samples[1].problem.tags, vec!["math".to_string()]);
    }

    #[test]
    fn test_select_spread() {
        let problems: Vec<ArchiveProblem> = (0..10)
            .map(|i| ArchiveProblem {
                contest_id: Some(i),
                index: "A".to_string(),
                name: format!("P{}", i),
                rating: Some(3500 - i as i32 * 100),
                tags: vec!["math".to_string()],
                solved_count: None,
            })
            .collect();
        let picked = select_spread(&problems, 3);
        let ratings: Vec<i32> = picked.iter().filter_map(|p| p.rating).collect();
        assert_eq!(ratings, vec![2600, 2900, 3200]);
        assert_eq!(select_spread(&problems, 50).len(), 10);
        assert!(select_spread(&problems, 0).is_empty());
    }

    #[test]
    fn test_select_spread_skips_untagged() {
        let problem = |i: u32, tags: &[&str]| ArchiveProblem {
            contest_id: Some(i),
            index: "A".to_string(),
            name: format!("P{}", i),
            rating: Some(800 + i as i32 * 100),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            solved_count: None,
        };
        let problems = vec![
            problem(0, &[]),
            problem(1, &["greedy"]),
            problem(2, &[]),
            problem(3, &["dp", "math"]),
        ];
        let picked: Vec<Option<u32>> = select_spread(&problems, 4)
            .iter()
            .map(|p| p.contest_id)
            .collect();
        assert_eq!(picked, vec![Some(1), Some(3)]);
    }

    #[test]
    fn test_malformed_json_is_dataset_error() {
        assert!(matches!(
            parse_archive("{not json"),
            Err(DatasetError::Json(_))
        ));
    }
}
