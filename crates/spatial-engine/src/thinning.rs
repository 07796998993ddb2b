//! Thinning (C8): per-page scanline merge of consecutive `text` elements
//! into `paragraph` elements, respecting barriers and page boundaries.

use spatial_types::LayoutElement;

use crate::config::AnalyzerConfig;
use crate::grouping::median_line_height;

fn can_merge(a: &LayoutElement, b: &LayoutElement, gap_threshold: f64) -> bool {
    if !(a.is_text() && b.is_text()) {
        return false;
    }
    if a.page_number != b.page_number {
        return false;
    }
    let gap = a.bbox.vertical_gap(&b.bbox) as f64;
    if !(0.0..=gap_threshold).contains(&gap) {
        return false;
    }
    let overlap_ok =
        a.bbox.horizontal_overlap_ratio(&b.bbox) >= 0.5 || (a.bbox.x1 - b.bbox.x1).abs() <= 10;
    if !overlap_ok {
        return false;
    }
    b.bbox.x1 - a.bbox.x1 < 30
}

/// 70th percentile of intra-page vertical gaps between consecutive
/// `text` elements, used when [`AnalyzerConfig::use_dynamic_gap`] is set.
fn dynamic_gap_threshold(elements: &[LayoutElement]) -> f64 {
    let mut gaps: Vec<f64> = elements
        .windows(2)
        .filter(|w| w[0].is_text() && w[1].is_text() && w[0].page_number == w[1].page_number)
        .map(|w| w[0].bbox.vertical_gap(&w[1].bbox) as f64)
        .filter(|&g| g >= 0.0)
        .collect();

    if gaps.is_empty() {
        return 0.0;
    }
    gaps.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let idx = (0.70 * (gaps.len() - 1) as f64).round() as usize;
    gaps[idx.min(gaps.len() - 1)]
}

fn gap_threshold(elements: &[LayoutElement], config: &AnalyzerConfig) -> f64 {
    if config.use_dynamic_gap {
        dynamic_gap_threshold(elements)
    } else {
        median_line_height(elements, 40.0) * config.thinning_gap_multiplier
    }
}

fn merge_group(mut group: Vec<LayoutElement>) -> LayoutElement {
    let page_number = group[0].page_number;
    let mut bbox = group[0].bbox;
    for g in &group[1..] {
        bbox = bbox.union(&g.bbox);
    }
    let text_content = group
        .iter()
        .map(|g| g.text_content.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let text_full = group
        .iter()
        .map(|g| g.text_full.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let original_labels: Vec<String> = group.iter().map(|g| g.label.clone()).collect();
    let merged_from = group.len();
    let first = group.remove(0);

    LayoutElement {
        id: first.id,
        label: "paragraph".to_string(),
        bbox,
        page_number,
        text_content,
        text_full,
        zone: first.zone,
        zone_confidence: first.zone_confidence,
        zone_method: first.zone_method,
        column_index: first.column_index,
        spatial_level: None,
        spatial_score: None,
        final_level: None,
        level_source: None,
        merged_from: Some(merged_from),
        original_labels: Some(original_labels),
    }
}

fn flush(group: &mut Vec<LayoutElement>, output: &mut Vec<LayoutElement>) {
    if group.is_empty() {
        return;
    }
    if group.len() == 1 {
        output.push(group.pop().unwrap());
    } else {
        output.push(merge_group(std::mem::take(group)));
    }
}

/// Run the scanline merge over elements already in reading order.
pub fn hierarchical_thinning(elements: Vec<LayoutElement>, config: &AnalyzerConfig) -> Vec<LayoutElement> {
    let threshold = gap_threshold(&elements, config);

    let mut output = Vec::with_capacity(elements.len());
    let mut current_group: Vec<LayoutElement> = Vec::new();
    let mut current_page: Option<i32> = None;

    for el in elements {
        if current_page.is_some_and(|p| p != el.page_number) {
            flush(&mut current_group, &mut output);
        }
        current_page = Some(el.page_number);

        if el.is_barrier() {
            flush(&mut current_group, &mut output);
            output.push(el);
        } else if el.is_text() {
            if current_group.is_empty() {
                current_group.push(el);
            } else {
                let last = current_group.last().unwrap();
                if can_merge(last, &el, threshold) {
                    current_group.push(el);
                } else {
                    flush(&mut current_group, &mut output);
                    current_group.push(el);
                }
            }
        } else {
            flush(&mut current_group, &mut output);
            output.push(el);
        }
    }
    flush(&mut current_group, &mut output);
    output
}

/// Apply thinning and return `(merged elements, count before, count after)`.
pub fn apply_thinning(
    elements: Vec<LayoutElement>,
    config: &AnalyzerConfig,
) -> (Vec<LayoutElement>, usize, usize) {
    let before = elements.len();
    let merged = hierarchical_thinning(elements, config);
    let after = merged.len();
    (merged, before, after)
}
