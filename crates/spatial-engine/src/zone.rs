//! Zone classifier (C4): priority cascade assigning each element one of
//! the fifteen closed-set zones.

use std::collections::HashMap;

use spatial_types::{LayoutElement, Zone};

use crate::filters::{normalize_text_for_matching, repeat_zone_to_zone, RepetitionInfo};
use crate::patterns::{CAPTION_PATTERNS, PAGE_NUMBER_PATTERNS, SECTION_PATTERNS};

/// Classify every element in place, annotating `zone`, `zone_confidence`,
/// and `zone_method`.
pub fn classify_zones(
    elements: &mut [LayoutElement],
    repetitions: &HashMap<String, RepetitionInfo>,
    page_dims: &HashMap<i32, (i32, i32)>,
) {
    for el in elements.iter_mut() {
        let (zone, confidence, method) = classify_one(el, repetitions, page_dims);
        el.zone = Some(zone);
        el.zone_confidence = Some(confidence);
        el.zone_method = Some(method);
    }
}

fn classify_one(
    el: &LayoutElement,
    repetitions: &HashMap<String, RepetitionInfo>,
    page_dims: &HashMap<i32, (i32, i32)>,
) -> (Zone, f64, &'static str) {
    if let Some(result) = classify_by_repetition(el, repetitions) {
        return result;
    }
    if let Some(result) = classify_by_label(el) {
        return result;
    }
    if let Some(result) = classify_by_text_pattern(el) {
        return result;
    }
    if let Some(result) = classify_by_position(el, page_dims) {
        return result;
    }
    if let Some(result) = classify_by_geometry(el) {
        return result;
    }
    (Zone::MainText, 0.5, "fallback")
}

fn classify_by_repetition(
    el: &LayoutElement,
    repetitions: &HashMap<String, RepetitionInfo>,
) -> Option<(Zone, f64, &'static str)> {
    let key = normalize_text_for_matching(&el.text_content);
    let info = repetitions.get(&key)?;
    let zone = repeat_zone_to_zone(info.zone)?;
    Some((zone, 0.95, "repetition"))
}

fn classify_by_label(el: &LayoutElement) -> Option<(Zone, f64, &'static str)> {
    let zone = match el.label.to_lowercase().as_str() {
        "title" => Zone::TitleBlock,
        "sub_title" | "subtitle" | "heading" => Zone::SectionHeading,
        "figure" | "image" => Zone::Figure,
        "table" => Zone::Table,
        "equation" | "formula" => Zone::Equation,
        "caption" | "tablecaption" | "imagecaption" => Zone::Caption,
        "footnote" | "tablefootnote" => Zone::Footnote,
        "footer" => Zone::Footer,
        "page_number" => Zone::PageNumber,
        "header" => Zone::Header,
        _ => return None,
    };
    Some((zone, 0.8, "label"))
}

fn classify_by_text_pattern(el: &LayoutElement) -> Option<(Zone, f64, &'static str)> {
    let text = el.text_content.trim();
    if text.is_empty() {
        return None;
    }
    if CAPTION_PATTERNS.iter().any(|p| p.is_match(text)) {
        return Some((Zone::Caption, 0.85, "text_pattern"));
    }
    if PAGE_NUMBER_PATTERNS.iter().any(|p| p.is_match(text)) {
        return Some((Zone::PageNumber, 0.85, "text_pattern"));
    }
    if SECTION_PATTERNS.iter().any(|p| p.is_match(text)) {
        return Some((Zone::SectionHeading, 0.8, "text_pattern"));
    }
    if text.to_lowercase().starts_with("abstract") {
        return Some((Zone::Abstract, 0.9, "text_pattern"));
    }
    None
}

fn classify_by_position(
    el: &LayoutElement,
    page_dims: &HashMap<i32, (i32, i32)>,
) -> Option<(Zone, f64, &'static str)> {
    let (page_width, page_height) = *page_dims.get(&el.page_number)?;
    if page_height <= 0 || page_width <= 0 {
        return None;
    }

    let rel_y1 = el.bbox.y1 as f64 / page_height as f64;
    let rel_y2 = el.bbox.y2 as f64 / page_height as f64;
    let rel_height = (el.bbox.height() as f64) / page_height as f64;
    let small_height = rel_height < 0.05;

    if !small_height {
        return None;
    }

    let (centre_x, _) = el.bbox.centre();
    let horizontally_centred =
        (centre_x - page_width as f64 / 2.0).abs() < page_width as f64 * 0.15;

    if rel_y2 > 0.95 && horizontally_centred {
        return Some((Zone::PageNumber, 0.8, "position"));
    }
    if rel_y2 > 0.85 {
        return Some((Zone::Footer, 0.75, "position"));
    }
    if rel_y1 < 0.1 {
        return Some((Zone::Header, 0.75, "position"));
    }
    if rel_y2 > 0.75 {
        return Some((Zone::Footnote, 0.7, "position"));
    }
    None
}

fn classify_by_geometry(el: &LayoutElement) -> Option<(Zone, f64, &'static str)> {
    let width = el.bbox.width() as f64;
    let height = el.bbox.height() as f64;
    if height <= 0.0 {
        return None;
    }
    let aspect = width / height;
    let wide_and_short = aspect > 3.0;
    if !wide_and_short {
        return None;
    }

    let label = el.label.to_lowercase();
    if label.contains("fig") || label.contains("image") {
        return Some((Zone::Figure, 0.75, "geometry"));
    }
    if label.contains("eq") || label.contains("formula") {
        return Some((Zone::Equation, 0.75, "geometry"));
    }
    None
}
