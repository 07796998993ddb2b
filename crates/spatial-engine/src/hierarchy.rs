//! Hierarchy scorer (C7): five-feature weighted score, adaptive
//! percentile thresholds, and the optional markdown cross-check.

use std::collections::HashMap;

use spatial_types::{LayoutElement, LevelSource};

use crate::config::{AnalyzerConfig, SpatialThresholds, SpatialWeights};
use crate::grouping::median_line_height;
use crate::patterns::MARKDOWN_HEADING_PREFIX;

fn clamp01(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

fn vertical_score(el: &LayoutElement, page_height: i32) -> f64 {
    if page_height <= 0 {
        return 0.0;
    }
    clamp01(1.0 - el.bbox.y1 as f64 / page_height as f64)
}

fn size_score(el: &LayoutElement, page_width: i32, page_height: i32) -> f64 {
    if page_width <= 0 || page_height <= 0 {
        return 0.0;
    }
    let width_ratio = el.bbox.width() as f64 / page_width as f64;
    let height_ratio = el.bbox.height() as f64 / page_height as f64;
    clamp01(2.0 * (0.7 * width_ratio + 0.3 * height_ratio))
}

/// Fixed label-to-weight table; unmatched labels default to `0.3`.
pub fn label_hierarchy_weight(label: &str) -> f64 {
    match label.to_lowercase().as_str() {
        "title" => 1.0,
        "sub_title" | "subtitle" => 0.8,
        "heading" => 0.7,
        "header" => 0.65,
        "table" | "image" | "figure" | "formula" | "equation" => 0.4,
        "text" | "paragraph" => 0.3,
        "caption" => 0.2,
        "footer" => 0.1,
        "page_number" => 0.05,
        _ => 0.3,
    }
}

fn indent_score(el: &LayoutElement, page_width: i32) -> f64 {
    let max_indent = 0.3 * page_width as f64;
    if max_indent <= 0.0 {
        return 0.0;
    }
    clamp01(1.0 - el.bbox.x1 as f64 / max_indent)
}

fn whitespace_score(before: f64, after: f64, median_height: f64) -> f64 {
    if median_height <= 0.0 {
        return 0.0;
    }
    ((0.6 * before + 0.4 * after) / (2.0 * median_height)).min(1.0)
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (p / 100.0 * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Percentile thresholds (95th, 80th, 60th, 40th, 20th, 0th) of the
/// document's score distribution.
pub fn calculate_adaptive_thresholds(scores: &[f64]) -> [f64; 6] {
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    [
        percentile(&sorted, 95.0),
        percentile(&sorted, 80.0),
        percentile(&sorted, 60.0),
        percentile(&sorted, 40.0),
        percentile(&sorted, 20.0),
        percentile(&sorted, 0.0),
    ]
}

fn level_for_score(score: f64, thresholds: &[f64; 6]) -> u8 {
    for (level, &threshold) in thresholds.iter().enumerate() {
        if score > threshold {
            return level as u8;
        }
    }
    5
}

fn extract_markdown_level(text: &str) -> Option<u8> {
    let caps = MARKDOWN_HEADING_PREFIX.captures(text)?;
    let hashes = caps.get(1)?.as_str().len();
    Some((hashes - 1) as u8)
}

/// Score every element, assign `spatial_level`/`spatial_score`, and —
/// when enabled — blend in the markdown cross-check to produce
/// `final_level`/`level_source`. Elements are assumed to already be in
/// reading order; whitespace scoring uses each element's immediate
/// neighbours in that order.
pub fn predict_hierarchy(
    elements: &mut [LayoutElement],
    config: &AnalyzerConfig,
    page_dims: &HashMap<i32, (i32, i32)>,
) {
    let n = elements.len();
    if n == 0 {
        return;
    }

    let median_height = median_line_height(elements, 20.0);
    let weights: &SpatialWeights = &config.spatial_weights;

    let mut scores = vec![0.0f64; n];
    for i in 0..n {
        let (page_width, page_height) = *page_dims.get(&elements[i].page_number).unwrap_or(&(1, 1));

        let before = if i == 0 {
            1.5 * median_height
        } else {
            (elements[i].bbox.y1 - elements[i - 1].bbox.y2) as f64
        };
        let after = if i + 1 == n {
            1.0 * median_height
        } else {
            (elements[i + 1].bbox.y1 - elements[i].bbox.y2) as f64
        };

        let vertical = vertical_score(&elements[i], page_height);
        let size = size_score(&elements[i], page_width, page_height);
        let label = label_hierarchy_weight(&elements[i].label);
        let indent = indent_score(&elements[i], page_width);
        let whitespace = whitespace_score(before, after, median_height);

        scores[i] = weights.label * label
            + weights.whitespace * whitespace
            + weights.size * size
            + weights.vertical * vertical
            + weights.indent * indent;
    }

    let thresholds: SpatialThresholds = if config.use_adaptive_thresholds {
        SpatialThresholds(calculate_adaptive_thresholds(&scores))
    } else {
        config.spatial_thresholds
    };

    for i in 0..n {
        let spatial_level = level_for_score(scores[i], &thresholds.0);
        elements[i].spatial_score = Some(scores[i]);
        elements[i].spatial_level = Some(spatial_level);

        if config.use_markdown_validation {
            if let Some(md_level) = extract_markdown_level(&elements[i].text_content) {
                let diff = (md_level as i32 - spatial_level as i32).abs();
                if diff > 1 {
                    let blended = (0.5 * md_level as f64 + 0.5 * spatial_level as f64).round();
                    elements[i].final_level = Some(blended.clamp(0.0, 5.0) as u8);
                    elements[i].level_source = Some(LevelSource::Blended);
                } else {
                    elements[i].final_level = Some(spatial_level);
                    elements[i].level_source = Some(LevelSource::SpatialValidated);
                }
                continue;
            }
        }
        elements[i].final_level = Some(spatial_level);
        elements[i].level_source = Some(LevelSource::SpatialOnly);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_weights_match_fixed_table() {
        assert_eq!(label_hierarchy_weight("title"), 1.0);
        assert_eq!(label_hierarchy_weight("TEXT"), 0.3);
        assert_eq!(label_hierarchy_weight("made_up_label"), 0.3);
    }

    #[test]
    fn level_ladder_picks_first_exceeded_threshold() {
        let thresholds = [0.8, 0.6, 0.4, 0.25, 0.15, 0.0];
        assert_eq!(level_for_score(0.9, &thresholds), 0);
        assert_eq!(level_for_score(0.5, &thresholds), 2);
        assert_eq!(level_for_score(0.0, &thresholds), 5);
    }

    #[test]
    fn markdown_cross_check_blends_on_large_disagreement() {
        let mut el = LayoutElement::text_at(1, 0, 0, 100, 20, "# Chapter 1");
        el.label = "heading".to_string();
        // Force a spatial_level of 3 directly, bypassing score computation,
        // to exercise the blend formula on the documented seed scenario.
        el.spatial_level = Some(3);
        let md = extract_markdown_level(&el.text_content).unwrap();
        assert_eq!(md, 0);
        let diff = (md as i32 - 3i32).abs();
        assert!(diff > 1);
        let blended = (0.5 * md as f64 + 0.5 * 3.0).round();
        assert_eq!(blended as u8, 2);
    }

    #[test]
    fn adaptive_thresholds_are_nonincreasing() {
        let scores = vec![0.1, 0.9, 0.5, 0.3, 0.7, 0.2, 0.6];
        let t = calculate_adaptive_thresholds(&scores);
        for w in t.windows(2) {
            assert!(w[0] >= w[1]);
        }
    }
}
