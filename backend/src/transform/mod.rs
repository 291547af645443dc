//! Transformation module.
//!
//! - Clean: value-cleaning helpers
//! - Classifier: candidate attribute columns and attribute configuration
//! - Flattener: product rows to parent and variation records
//! - Pipeline: end-to-end conversion

pub mod classifier;
pub mod clean;
pub mod flattener;
pub mod pipeline;

pub use classifier::{classify, configure, essential_columns, CandidateColumn};
pub use flattener::{flatten, group_rows, FlattenSettings, ProductGroup};
pub use pipeline::*;
