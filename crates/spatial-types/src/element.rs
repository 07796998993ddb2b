//! The element record threaded through every pipeline stage, and the
//! closed set of zone classifications assigned by C4.

use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::error::ValidationError;

/// Functional zone classification assigned to an element by the zone
/// classifier (C4). Fixed reading-order priority per zone (lower reads
/// first) is exposed via [`Zone::priority`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Zone {
    TitleBlock,
    AuthorBlock,
    Abstract,
    SectionHeading,
    MainText,
    Figure,
    Table,
    Caption,
    Equation,
    Footnote,
    Header,
    Footer,
    PageNumber,
    Sidebar,
    Unknown,
}

impl Zone {
    /// Fixed reading-order priority; lower values read first.
    pub const fn priority(self) -> u8 {
        match self {
            Zone::TitleBlock => 0,
            Zone::AuthorBlock => 1,
            Zone::Abstract => 2,
            Zone::SectionHeading => 3,
            Zone::MainText => 4,
            Zone::Equation => 4,
            Zone::Figure => 5,
            Zone::Table => 5,
            Zone::Unknown => 5,
            Zone::Caption => 6,
            Zone::Sidebar => 7,
            Zone::Footnote => 8,
            Zone::Header => 9,
            Zone::Footer => 10,
            Zone::PageNumber => 10,
        }
    }
}

/// How an element's final hierarchy level was decided (C7).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LevelSource {
    /// No markdown heading syntax present; `final_level == spatial_level`.
    SpatialOnly,
    /// Markdown heading syntax present but agreed with the spatial
    /// prediction within tolerance; `final_level == spatial_level`.
    SpatialValidated,
    /// Markdown and spatial predictions disagreed by more than one level;
    /// `final_level` is their rounded average.
    Blended,
}

/// One detected region: a labelled bounding box with associated text,
/// progressively enriched by the pipeline stages that consume it.
///
/// Geometry (`bbox`) and identity (`label`, `page_number`) are fixed at
/// construction. Every other field is `None` until the corresponding
/// stage runs; C3..C7 enrich elements in place but never mutate their
/// bbox or label. C8 replaces groups of `text` elements with a new
/// merged element rather than mutating any existing one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutElement {
    /// Dense, pipeline-assigned id. Stable within one pipeline run only.
    pub id: u64,
    pub label: String,
    pub bbox: Bbox,
    pub page_number: i32,
    pub text_content: String,
    pub text_full: String,

    pub zone: Option<Zone>,
    pub zone_confidence: Option<f64>,
    pub zone_method: Option<&'static str>,

    pub column_index: Option<usize>,

    pub spatial_level: Option<u8>,
    pub spatial_score: Option<f64>,
    pub final_level: Option<u8>,
    pub level_source: Option<LevelSource>,

    /// Set by C8 on a merged paragraph: how many text elements it absorbed.
    pub merged_from: Option<usize>,
    /// Set by C8 on a merged paragraph: the original labels of its
    /// constituents in merge order (always `"text"` repeated today, but
    /// recorded for downstream introspection).
    pub original_labels: Option<Vec<String>>,
}

impl LayoutElement {
    /// Construct a new element, rejecting the invariant violations named
    /// in the error-handling design: non-positive bbox area, empty label,
    /// or a page number below 1. Bbox area is already enforced by
    /// [`Bbox::new`]; this constructor additionally validates the label
    /// and page number.
    pub fn new(
        label: impl Into<String>,
        bbox: Bbox,
        page_number: i32,
        text_content: impl Into<String>,
        text_full: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let label = label.into();
        if label.is_empty() {
            return Err(ValidationError::EmptyLabel);
        }
        if page_number < 1 {
            return Err(ValidationError::InvalidPageNumber(page_number));
        }
        Ok(Self {
            id: 0,
            label,
            bbox,
            page_number,
            text_content: text_content.into(),
            text_full: text_full.into(),
            zone: None,
            zone_confidence: None,
            zone_method: None,
            column_index: None,
            spatial_level: None,
            spatial_score: None,
            final_level: None,
            level_source: None,
            merged_from: None,
            original_labels: None,
        })
    }

    pub fn is_barrier(&self) -> bool {
        matches!(
            self.label.as_str(),
            "title"
                | "subtitle"
                | "heading"
                | "sub_title"
                | "equation"
                | "formula"
                | "image"
                | "figure"
                | "table"
                | "tablecaption"
                | "tablefootnote"
                | "imagecaption"
                | "caption"
        )
    }

    pub fn is_text(&self) -> bool {
        self.label == "text"
    }
}

#[cfg(test)]
impl LayoutElement {
    /// Test-only convenience constructor for a plain `text` element.
    pub fn text_at(page_number: i32, x1: i32, y1: i32, x2: i32, y2: i32, content: &str) -> Self {
        Self::new(
            "text",
            Bbox::new(x1, y1, x2, y2).unwrap(),
            page_number,
            content,
            content,
        )
        .unwrap()
    }
}
