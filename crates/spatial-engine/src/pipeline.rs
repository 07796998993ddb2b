//! Pipeline orchestration (C2-C9 wired together): the two public entry
//! points and the shared stage sequence behind them.

use std::collections::HashMap;

use spatial_types::{DocumentTree, LayoutElement, PipelineInfo, ValidationError};

use crate::config::AnalyzerConfig;
use crate::error::AnalyzerError;
use crate::extractor::extract_elements;
use crate::filters::apply_all_filters;
use crate::grouping::{assign_column_membership, detect_columns};
use crate::hierarchy::predict_hierarchy;
use crate::reading_order::get_column_aware_reading_order;
use crate::thinning::apply_thinning;
use crate::tree_builder::build_document_tree;

/// Crate version surfaced on every [`PipelineInfo`], for callers that
/// persist or diff the output across upgrades.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Boundary check for caller-supplied page dimensions (spec.md §7
/// `InvalidInput`): a page must have positive width and height. Unlike
/// malformed grounding (logged and skipped), this is the caller's mistake
/// to fix, so it is rejected rather than silently clamped.
fn validate_page_dims(width: i32, height: i32) -> Result<(), AnalyzerError> {
    if width <= 0 || height <= 0 {
        return Err(AnalyzerError::InvalidInput(
            ValidationError::InvalidPageDimensions { width, height },
        ));
    }
    Ok(())
}

/// Run the full pipeline over already-extracted elements.
///
/// This is the entry point for callers who have their own OCR/layout
/// source and only need C3..C9; [`analyze_grounded_text`] additionally
/// runs C2 for callers starting from the grounded wire format.
pub fn analyze_layout(
    elements: Vec<LayoutElement>,
    config: &AnalyzerConfig,
    page_dims_override: &HashMap<i32, (i32, i32)>,
) -> Result<DocumentTree, AnalyzerError> {
    for &(width, height) in page_dims_override.values() {
        validate_page_dims(width, height)?;
    }

    let elements_processed = elements.len();

    if elements.is_empty() {
        let mut info = PipelineInfo::empty(VERSION);
        info.elements_processed = 0;
        return Ok(build_document_tree(Vec::new(), info));
    }

    let mut elements = assign_ids(elements);

    let (mut elements, filter_counts, page_dims) = if config.use_filters {
        apply_all_filters(elements, config, page_dims_override)
    } else {
        let page_dims = crate::filters::estimate_page_dims(&elements, page_dims_override);
        (
            std::mem::take(&mut elements),
            spatial_types::FilterCounts::default(),
            page_dims,
        )
    };

    if config.use_zone_classification {
        let repetitions = crate::filters::analyze_cross_page_repetitions(
            &elements,
            config.min_repeat_pages,
            &page_dims,
        );
        crate::zone::classify_zones(&mut elements, &repetitions, &page_dims);
    }

    assign_columns_per_page(&mut elements, &page_dims);

    let mut elements = if config.use_reading_order {
        get_column_aware_reading_order(elements)?
    } else {
        elements
    };
    predict_hierarchy(&mut elements, config, &page_dims);

    let (elements, thinning_before, thinning_after) = if config.use_thinning {
        apply_thinning(elements, config)
    } else {
        let n = elements.len();
        (elements, n, n)
    };

    let info = PipelineInfo {
        version: VERSION.to_string(),
        used_filters: config.use_filters,
        used_zone_classification: config.use_zone_classification,
        used_reading_order: config.use_reading_order,
        used_markdown_validation: config.use_markdown_validation,
        used_adaptive_thresholds: config.use_adaptive_thresholds,
        used_thinning: config.use_thinning,
        filter_counts,
        thinning_before,
        thinning_after,
        elements_processed,
    };

    Ok(build_document_tree(elements, info))
}

/// Extract elements from one or more pages of grounded text, then run the
/// full C3..C9 pipeline.
///
/// `pages` is `(page_number, raw_text, page_width, page_height)` for each
/// page, supplied in any order; extraction does not depend on ordering,
/// and the reading-order stage (C5) determines final sequencing.
pub fn analyze_grounded_text(
    pages: &[(i32, &str, i32, i32)],
    config: &AnalyzerConfig,
) -> Result<DocumentTree, AnalyzerError> {
    let mut elements = Vec::new();
    let mut page_dims = HashMap::new();
    for &(page_number, raw, page_width, page_height) in pages {
        validate_page_dims(page_width, page_height)?;
        page_dims.insert(page_number, (page_width, page_height));
        elements.extend(extract_elements(raw, page_number, page_width, page_height));
    }
    analyze_layout(elements, config, &page_dims)
}

fn assign_ids(elements: Vec<LayoutElement>) -> Vec<LayoutElement> {
    elements
        .into_iter()
        .enumerate()
        .map(|(i, mut el)| {
            el.id = i as u64 + 1;
            el
        })
        .collect()
}

/// Column membership (C6) is assigned per page, since column layout is a
/// page-local concept: a two-column page and a single-column page may
/// appear back to back in the same document.
fn assign_columns_per_page(elements: &mut [LayoutElement], page_dims: &HashMap<i32, (i32, i32)>) {
    let mut pages: Vec<i32> = elements.iter().map(|e| e.page_number).collect();
    pages.sort_unstable();
    pages.dedup();

    for page in pages {
        let (page_width, _) = *page_dims.get(&page).unwrap_or(&(1, 1));
        let indices: Vec<usize> = elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.page_number == page)
            .map(|(i, _)| i)
            .collect();
        let mut page_elements: Vec<LayoutElement> =
            indices.iter().map(|&i| elements[i].clone()).collect();
        let columns = detect_columns(&page_elements, page_width);
        assign_column_membership(&mut page_elements, &columns);
        for (slot, &i) in indices.iter().enumerate() {
            elements[i].column_index = page_elements[slot].column_index;
        }
    }
}
