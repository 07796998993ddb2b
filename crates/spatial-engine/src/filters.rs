//! Filters (C3): cross-page repetition, noise, and margin filtering.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use spatial_types::{FilterCounts, LayoutElement, Zone};

use crate::config::AnalyzerConfig;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Lower-case, trim, and erase digit runs (covering `page N` / `trang N`
/// forms and dates, which are themselves digit runs once case-folded).
pub fn normalize_text_for_matching(text: &str) -> String {
    let lower = text.to_lowercase();
    let no_digits = DIGIT_RUN.replace_all(&lower, "");
    let collapsed = WHITESPACE_RUN.replace_all(&no_digits, " ");
    collapsed.trim().to_string()
}

/// Page pixel dimensions either supplied by the caller or estimated as
/// `1.05 * max(x2)`, `1.05 * max(y2)` over that page's elements.
pub fn estimate_page_dims(
    elements: &[LayoutElement],
    overrides: &HashMap<i32, (i32, i32)>,
) -> HashMap<i32, (i32, i32)> {
    let mut max_by_page: HashMap<i32, (i32, i32)> = HashMap::new();
    for el in elements {
        let entry = max_by_page.entry(el.page_number).or_insert((0, 0));
        entry.0 = entry.0.max(el.bbox.x2);
        entry.1 = entry.1.max(el.bbox.y2);
    }
    let mut out = HashMap::new();
    for (page, (max_x, max_y)) in max_by_page {
        if let Some(&dims) = overrides.get(&page) {
            out.insert(page, dims);
        } else {
            let w = (max_x as f64 * 1.05).round() as i32;
            let h = (max_y as f64 * 1.05).round() as i32;
            out.insert(page, (w.max(1), h.max(1)));
        }
    }
    out
}

/// What zone a qualifying repeated-text group was assigned, based on its
/// mean relative vertical position across pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatZone {
    Header,
    Footer,
    Unknown,
}

#[derive(Debug, Clone)]
pub struct RepetitionInfo {
    pub zone: RepeatZone,
    pub pages: Vec<i32>,
}

/// Group elements by normalised text; a group "qualifies" as repeated
/// when it spans at least `min_pages` distinct pages.
pub fn analyze_cross_page_repetitions(
    elements: &[LayoutElement],
    min_pages: u32,
    page_dims: &HashMap<i32, (i32, i32)>,
) -> HashMap<String, RepetitionInfo> {
    let mut groups: HashMap<String, Vec<&LayoutElement>> = HashMap::new();
    for el in elements {
        let key = normalize_text_for_matching(&el.text_content);
        if key.is_empty() {
            continue;
        }
        groups.entry(key).or_default().push(el);
    }

    let mut result = HashMap::new();
    for (key, members) in groups {
        let mut pages: Vec<i32> = members.iter().map(|e| e.page_number).collect();
        pages.sort_unstable();
        pages.dedup();
        if (pages.len() as u32) < min_pages {
            continue;
        }

        let mut rel_y_sum = 0.0;
        let mut n = 0usize;
        for el in &members {
            let height = page_dims
                .get(&el.page_number)
                .map(|(_, h)| *h)
                .unwrap_or(1)
                .max(1);
            rel_y_sum += el.bbox.y1 as f64 / height as f64;
            n += 1;
        }
        let mean_rel_y = if n > 0 { rel_y_sum / n as f64 } else { 0.5 };

        let zone = if mean_rel_y < 0.15 {
            RepeatZone::Header
        } else if mean_rel_y > 0.85 {
            RepeatZone::Footer
        } else {
            RepeatZone::Unknown
        };

        result.insert(key, RepetitionInfo { zone, pages });
    }
    result
}

/// Drop elements whose normalised text belongs to a repeated group tagged
/// header or footer.
pub fn filter_repeated_elements(
    elements: Vec<LayoutElement>,
    repetitions: &HashMap<String, RepetitionInfo>,
) -> (Vec<LayoutElement>, Vec<LayoutElement>) {
    let mut kept = Vec::new();
    let mut dropped = Vec::new();
    for el in elements {
        let key = normalize_text_for_matching(&el.text_content);
        match repetitions.get(&key) {
            Some(info) if info.zone != RepeatZone::Unknown => dropped.push(el),
            _ => kept.push(el),
        }
    }
    (kept, dropped)
}

/// Drop elements whose area/page-area ratio falls outside `[min_ratio, max_ratio]`.
pub fn filter_noise_elements(
    elements: Vec<LayoutElement>,
    min_ratio: f64,
    max_ratio: f64,
    page_dims: &HashMap<i32, (i32, i32)>,
) -> (Vec<LayoutElement>, Vec<LayoutElement>) {
    let mut kept = Vec::new();
    let mut dropped = Vec::new();
    for el in elements {
        let page_area = page_dims
            .get(&el.page_number)
            .map(|(w, h)| (*w as i64) * (*h as i64))
            .unwrap_or(1)
            .max(1);
        let ratio = el.bbox.area() as f64 / page_area as f64;
        if ratio < min_ratio || ratio > max_ratio {
            dropped.push(el);
        } else {
            kept.push(el);
        }
    }
    (kept, dropped)
}

/// Drop small elements lying entirely within the left or right
/// `margin_ratio` strip of the page. Off by default.
pub fn filter_margin_elements(
    elements: Vec<LayoutElement>,
    margin_ratio: f64,
    page_dims: &HashMap<i32, (i32, i32)>,
) -> (Vec<LayoutElement>, Vec<LayoutElement>) {
    let mut kept = Vec::new();
    let mut dropped = Vec::new();
    for el in elements {
        let width = page_dims.get(&el.page_number).map(|(w, _)| *w).unwrap_or(1);
        let left_bound = (width as f64 * margin_ratio).round() as i32;
        let right_bound = width - left_bound;
        let in_left_margin = el.bbox.x2 <= left_bound;
        let in_right_margin = el.bbox.x1 >= right_bound;
        if in_left_margin || in_right_margin {
            dropped.push(el);
        } else {
            kept.push(el);
        }
    }
    (kept, dropped)
}

/// Run all three filters in order, returning the surviving elements,
/// per-kind drop counts, and the page dimensions used throughout (so
/// later stages don't recompute the estimate from pre-filter data).
pub fn apply_all_filters(
    elements: Vec<LayoutElement>,
    config: &AnalyzerConfig,
    page_dims_override: &HashMap<i32, (i32, i32)>,
) -> (Vec<LayoutElement>, FilterCounts, HashMap<i32, (i32, i32)>) {
    let page_dims = estimate_page_dims(&elements, page_dims_override);

    let repetitions =
        analyze_cross_page_repetitions(&elements, config.min_repeat_pages, &page_dims);
    let (elements, repeated_dropped) = filter_repeated_elements(elements, &repetitions);

    let (elements, noise_dropped) = filter_noise_elements(
        elements,
        config.min_area_ratio,
        config.max_area_ratio,
        &page_dims,
    );

    let (elements, margin_dropped) = if config.use_margin_filter {
        filter_margin_elements(elements, config.margin_ratio, &page_dims)
    } else {
        (elements, Vec::new())
    };

    let counts = FilterCounts {
        repeated: repeated_dropped.len(),
        noise: noise_dropped.len(),
        margin: margin_dropped.len(),
    };

    (elements, counts, page_dims)
}

/// Assign a fixed zone tag to a [`RepeatZone`], for elements the reading
/// order / zone classifier consults via the shared repetition statistic.
pub fn repeat_zone_to_zone(zone: RepeatZone) -> Option<Zone> {
    match zone {
        RepeatZone::Header => Some(Zone::Header),
        RepeatZone::Footer => Some(Zone::Footer),
        RepeatZone::Unknown => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_digits_and_case() {
        assert_eq!(normalize_text_for_matching("Page 12 of 30"), "page of");
        assert_eq!(normalize_text_for_matching("  Hello   World  "), "hello world");
    }

    #[test]
    fn repeated_footer_filter_drops_five_pages() {
        let mut els = Vec::new();
        for page in 1..=5 {
            let mut e = LayoutElement::text_at(page, 400, 950, 600, 970, "Page N / 10");
            e.label = "footer".to_string();
            els.push(e);
        }
        let page_dims: HashMap<i32, (i32, i32)> =
            (1..=5).map(|p| (p, (1000, 1000))).collect();
        let (kept, counts, _) = apply_all_filters(els, &AnalyzerConfig::default(), &page_dims);
        assert_eq!(kept.len(), 0);
        assert_eq!(counts.repeated, 5);
    }

    #[test]
    fn noise_filter_drops_tiny_and_huge_elements() {
        let tiny = LayoutElement::text_at(1, 0, 0, 1, 1, "x");
        let huge = LayoutElement::text_at(1, 0, 0, 999, 999, "x");
        let normal = LayoutElement::text_at(1, 100, 100, 300, 150, "normal text");
        let page_dims: HashMap<i32, (i32, i32)> = [(1, (1000, 1000))].into_iter().collect();
        let (kept, dropped) = filter_noise_elements(
            vec![tiny, huge, normal],
            0.001,
            0.5,
            &page_dims,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(dropped.len(), 2);
    }
}
