//! Training data sources
//!
//! Each source yields `LabeledSample`s ready for the trainer:
//! - `synthetic`: seeded noisy variants of anchor problems
//! - `archive`: rated problem metadata from the public problem archive
//! - `labeled_csv`: hand-labeled statements

pub mod archive;
pub mod labeled_csv;
pub mod synthetic;

pub use archive::{load_archive, parse_archive, select_spread, to_samples, ArchiveProblem};
pub use labeled_csv::{load_labeled_csv, read_labeled};
pub use synthetic::{generate as generate_synthetic, Anchor, ANCHORS};
