//! The document tree produced by C9, and the processing-info record that
//! travels alongside it.

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;

/// One node of the output tree. The root is synthetic and carries
/// `level == -1`; every other node's `level` is in `{0..5}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentNode {
    pub node_id: u64,
    pub title: String,
    pub level: i8,
    pub page_number: Option<i32>,
    pub content: Option<String>,
    pub bbox: Option<Bbox>,
    pub label: Option<String>,
    pub spatial_score: Option<f64>,
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    /// The synthetic root all trees are wrapped in.
    pub fn root() -> Self {
        Self {
            node_id: 0,
            title: String::new(),
            level: -1,
            page_number: None,
            content: None,
            bbox: None,
            label: None,
            spatial_score: None,
            children: Vec::new(),
        }
    }
}

/// Per-kind counts of elements dropped by C3.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterCounts {
    pub repeated: usize,
    pub noise: usize,
    pub margin: usize,
}

/// Metadata describing which stages ran and what they did, attached to
/// the root alongside the tree proper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineInfo {
    pub version: String,
    pub used_filters: bool,
    pub used_zone_classification: bool,
    pub used_reading_order: bool,
    pub used_markdown_validation: bool,
    pub used_adaptive_thresholds: bool,
    pub used_thinning: bool,
    pub filter_counts: FilterCounts,
    pub thinning_before: usize,
    pub thinning_after: usize,
    pub elements_processed: usize,
}

impl PipelineInfo {
    pub fn empty(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            used_filters: false,
            used_zone_classification: false,
            used_reading_order: false,
            used_markdown_validation: false,
            used_adaptive_thresholds: false,
            used_thinning: false,
            filter_counts: FilterCounts::default(),
            thinning_before: 0,
            thinning_after: 0,
            elements_processed: 0,
        }
    }
}

/// The analyser's complete output: a rooted tree plus processing metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentTree {
    pub root: DocumentNode,
    pub pipeline_info: PipelineInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_synthetic_at_level_minus_one() {
        let root = DocumentNode::root();
        assert_eq!(root.level, -1);
        assert!(root.children.is_empty());
    }
}
