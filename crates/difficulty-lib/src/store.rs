//! Model artifact persistence
//!
//! An artifact is a single file: one JSON header line carrying the format
//! version, recipe tag and a SHA-256 of the body, then the JSON body with
//! both forests and their metadata. Writes go to a temp file that is renamed
//! over the target, so a reader never observes a half-written model.

use crate::error::ModelStoreError;
use crate::features::FeatureRecipe;
use crate::predictor::TrainedModel;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// Current artifact layout version
pub const FORMAT_VERSION: u32 = 1;

/// First line of every artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub format_version: u32,
    pub recipe: FeatureRecipe,
    pub checksum: String,
    pub created_at: i64,
}

/// Serialize a model into artifact bytes
pub fn encode(model: &TrainedModel) -> Result<(ArtifactHeader, Vec<u8>), ModelStoreError> {
    let body = serde_json::to_vec(model)?;
    let header = ArtifactHeader {
        format_version: FORMAT_VERSION,
        recipe: model.metadata().recipe,
        checksum: compute_checksum(&body),
        created_at: chrono::Utc::now().timestamp(),
    };
    let mut bytes = serde_json::to_vec(&header)?;
    bytes.push(b'\n');
    bytes.extend_from_slice(&body);
    Ok((header, bytes))
}

/// Parse and verify artifact bytes
pub fn decode(bytes: &[u8]) -> Result<(ArtifactHeader, TrainedModel), ModelStoreError> {
    let newline = bytes
        .iter()
        .position(|&b| b == b'\n')
        .ok_or_else(|| ModelStoreError::Corrupt("missing header line".to_string()))?;
    let (header_bytes, rest) = bytes.split_at(newline);
    let body = &rest[1..];

    let header: ArtifactHeader = serde_json::from_slice(header_bytes)?;
    if header.format_version != FORMAT_VERSION {
        return Err(ModelStoreError::UnsupportedVersion(header.format_version));
    }

    let actual = compute_checksum(body);
    if actual != header.checksum {
        return Err(ModelStoreError::ChecksumMismatch {
            expected: header.checksum,
            actual,
        });
    }

    let model: TrainedModel = serde_json::from_slice(body)?;
    model.check().map_err(ModelStoreError::Corrupt)?;
    if model.metadata().recipe != header.recipe {
        return Err(ModelStoreError::Corrupt(format!(
            "header recipe {} does not match body recipe {}",
            header.recipe,
            model.metadata().recipe
        )));
    }
    Ok((header, model))
}

/// Write the artifact, replacing any previous model at `path`
pub fn save(model: &TrainedModel, path: &Path) -> Result<ArtifactHeader, ModelStoreError> {
    let (header, bytes) = encode(model)?;
    let io_err = |source| ModelStoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path).map_err(io_err)?;
    file.write_all(&bytes).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;
    fs::rename(&temp_path, path).map_err(io_err)?;

    info!(
        path = %path.display(),
        size = bytes.len(),
        recipe = %header.recipe,
        checksum = %header.checksum,
        "Model artifact saved"
    );
    Ok(header)
}

/// Read and verify the artifact at `path`
pub fn load(path: &Path) -> Result<TrainedModel, ModelStoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ModelStoreError::NotFound(path.to_path_buf()))
        }
        Err(source) => {
            return Err(ModelStoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let (header, model) = decode(&bytes)?;
    debug!(
        path = %path.display(),
        recipe = %header.recipe,
        samples = model.metadata().samples,
        "Model artifact loaded"
    );
    Ok(model)
}

fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DifficultyClass, LabeledSample, ProblemSample};
    use crate::predictor::DifficultyModel;
    use crate::trainer::{Trainer, TrainingConfig};
    use crate::features::FeatureExtractor;

    fn trained() -> TrainedModel {
        let samples = vec![
            LabeledSample::new(
                ProblemSample::new("add two numbers", "a b", "sum"),
                DifficultyClass::Easy,
                803.25,
            ),
            LabeledSample::new(
                ProblemSample::new("find the minimum spanning tree", "n m edges", "weight"),
                DifficultyClass::Medium,
                1600.5,
            ),
            LabeledSample::new(
                ProblemSample::new("segment tree with bitmask states", "n q", "answers"),
                DifficultyClass::Hard,
                2311.125,
            ),
        ];
        Trainer::new(TrainingConfig::statement_defaults().with_forest_size(4, 4))
            .train(&samples)
            .unwrap()
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("model.json");
        let model = trained();

        let header = save(&model, &path).unwrap();
        assert_eq!(header.recipe, FeatureRecipe::TextDiversity);
        assert!(!path.with_extension("tmp").exists());

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, model);

        let extractor = FeatureExtractor::new(FeatureRecipe::TextDiversity);
        let (features, _) = extractor.extract("find the minimum spanning tree", "n m", "w");
        assert_eq!(loaded.score(&features), model.score(&features));
        assert_eq!(loaded.classify(&features), model.classify(&features));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ModelStoreError::NotFound(_)));
    }

    #[test]
    fn test_tampered_body_fails_checksum() {
        let mut bytes = encode(&trained()).unwrap().1;
        let last = bytes.len() - 2;
        bytes[last] = if bytes[last] == b'1' { b'2' } else { b'1' };
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, ModelStoreError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let bytes = encode(&trained()).unwrap().1;
        let text = String::from_utf8(bytes).unwrap();
        let bumped = text.replacen("\"format_version\":1", "\"format_version\":9", 1);
        let err = decode(bumped.as_bytes()).unwrap_err();
        assert!(matches!(err, ModelStoreError::UnsupportedVersion(9)));
    }

    #[test]
    fn test_header_recipe_must_match_body() {
        let bytes = encode(&trained()).unwrap().1;
        let text = String::from_utf8(bytes).unwrap();
        let (header, body) = text.split_once('\n').unwrap();
        let forged = header.replace("text-diversity-v1", "solved-count-v1");
        let err = decode(format!("{}\n{}", forged, body).as_bytes()).unwrap_err();
        assert!(matches!(err, ModelStoreError::Corrupt(_)));
    }

    /// Replace the first classifier tree and re-sign the body so only
    /// structural checks can catch the damage
    fn resigned_with_tree(nodes: serde_json::Value) -> Vec<u8> {
        let bytes = encode(&trained()).unwrap().1;
        let text = String::from_utf8(bytes).unwrap();
        let (header, body) = text.split_once('\n').unwrap();

        let mut body: serde_json::Value = serde_json::from_str(body).unwrap();
        body["classifier"]["trees"][0]["nodes"] = nodes;
        let body = serde_json::to_vec(&body).unwrap();

        let mut header: ArtifactHeader = serde_json::from_str(header).unwrap();
        header.checksum = compute_checksum(&body);
        let mut bytes = serde_json::to_vec(&header).unwrap();
        bytes.push(b'\n');
        bytes.extend_from_slice(&body);
        bytes
    }

    #[test]
    fn test_dangling_child_with_valid_checksum_is_corrupt() {
        let bytes = resigned_with_tree(serde_json::json!([
            {"Split": {"feature": 0, "threshold": 0.5, "left": 999, "right": 1}},
            {"Leaf": {"value": 0.0}}
        ]));
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, ModelStoreError::Corrupt(_)), "{:?}", err);
    }

    #[test]
    fn test_backward_child_and_empty_tree_are_corrupt() {
        let cycle = resigned_with_tree(serde_json::json!([
            {"Split": {"feature": 0, "threshold": 0.5, "left": 1, "right": 2}},
            {"Split": {"feature": 1, "threshold": 0.5, "left": 0, "right": 2}},
            {"Leaf": {"value": 1.0}}
        ]));
        assert!(matches!(decode(&cycle), Err(ModelStoreError::Corrupt(_))));

        let empty = resigned_with_tree(serde_json::json!([]));
        assert!(matches!(decode(&empty), Err(ModelStoreError::Corrupt(_))));

        let unknown_feature = resigned_with_tree(serde_json::json!([
            {"Split": {"feature": 7, "threshold": 0.5, "left": 1, "right": 2}},
            {"Leaf": {"value": 0.0}},
            {"Leaf": {"value": 2.0}}
        ]));
        assert!(matches!(decode(&unknown_feature), Err(ModelStoreError::Corrupt(_))));
    }

    #[test]
    fn test_save_overwrites_previous_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, b"stale").unwrap();
        save(&trained(), &path).unwrap();
        assert!(load(&path).is_ok());
    }
}
