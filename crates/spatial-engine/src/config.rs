//! Pipeline tunables.
//!
//! Every stage takes its configuration as a parameter; there is no
//! module-level settings singleton. [`AnalyzerConfig::default`] is the
//! single source of defaults named throughout the component design.

use serde::{Deserialize, Serialize};

/// Weights for the five hierarchy-scoring features (C7), must not need to
/// sum to 1.0 but do by convention in the defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SpatialWeights {
    pub label: f64,
    pub whitespace: f64,
    pub size: f64,
    pub vertical: f64,
    pub indent: f64,
}

impl Default for SpatialWeights {
    fn default() -> Self {
        Self {
            label: 0.40,
            whitespace: 0.25,
            size: 0.15,
            vertical: 0.10,
            indent: 0.10,
        }
    }
}

/// Fixed per-level score thresholds for hierarchy levels `0..=5`, indexed
/// by level. Overridden by percentile thresholds when
/// [`AnalyzerConfig::use_adaptive_thresholds`] is set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SpatialThresholds(pub [f64; 6]);

impl Default for SpatialThresholds {
    fn default() -> Self {
        Self([0.8, 0.6, 0.4, 0.25, 0.15, 0.0])
    }
}

/// All pipeline tunables, with the defaults named in the component design.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyzerConfig {
    pub use_filters: bool,
    pub use_zone_classification: bool,
    pub use_reading_order: bool,
    pub use_markdown_validation: bool,
    /// When set, per-level thresholds are percentiles of the document's
    /// score distribution rather than the fixed ladder in
    /// [`SpatialThresholds::default`].
    pub use_adaptive_thresholds: bool,
    pub use_thinning: bool,

    pub min_repeat_pages: u32,
    pub min_area_ratio: f64,
    pub max_area_ratio: f64,
    pub margin_ratio: f64,
    pub use_margin_filter: bool,

    pub thinning_gap_multiplier: f64,
    pub use_dynamic_gap: bool,

    pub spatial_weights: SpatialWeights,
    pub spatial_thresholds: SpatialThresholds,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            use_filters: true,
            use_zone_classification: true,
            use_reading_order: true,
            use_markdown_validation: true,
            use_adaptive_thresholds: false,
            use_thinning: true,

            min_repeat_pages: 3,
            min_area_ratio: 0.001,
            max_area_ratio: 0.5,
            margin_ratio: 0.05,
            use_margin_filter: false,

            thinning_gap_multiplier: 2.0,
            use_dynamic_gap: true,

            spatial_weights: SpatialWeights::default(),
            spatial_thresholds: SpatialThresholds::default(),
        }
    }
}
