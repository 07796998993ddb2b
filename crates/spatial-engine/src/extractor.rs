//! Text extractor (C2): parses the grounded wire format into
//! [`LayoutElement`] records.

use spatial_types::{Bbox, LayoutElement};

use crate::patterns::{ANY_HTML_TAG, COORD_TUPLE, GROUNDING_BLOCK, MARKDOWN_HEADING_PREFIX};

const NAMED_TAGS: &[&str] = &["center", "b", "i", "strong", "em", "br"];

/// Extract all elements from one page's grounded text.
///
/// `page_width`/`page_height` are the page's pixel dimensions, used to
/// rescale coordinates from the `0..999` normalised grid. A `<|det|>`
/// payload that fails to parse is skipped with a warning; processing
/// continues with the remaining blocks.
pub fn extract_elements(
    raw: &str,
    page_number: i32,
    page_width: i32,
    page_height: i32,
) -> Vec<LayoutElement> {
    let blocks: Vec<(usize, usize, &str, &str)> = GROUNDING_BLOCK
        .captures_iter(raw)
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            let label = caps.get(1).unwrap().as_str();
            let coords = caps.get(2).unwrap().as_str();
            (whole.start(), whole.end(), label, coords)
        })
        .collect();

    let mut elements = Vec::new();

    for (i, &(_start, end, label, coords_str)) in blocks.iter().enumerate() {
        let segment_end = blocks.get(i + 1).map(|b| b.0).unwrap_or(raw.len());
        let segment = if end <= segment_end {
            &raw[end..segment_end]
        } else {
            ""
        };

        let text_full = segment.to_string();
        let text_content = extract_text_content(segment, label);

        let coords = match parse_coord_tuples(coords_str) {
            Some(c) if !c.is_empty() => c,
            _ => {
                log::warn!("malformed <|det|> payload for label '{label}', skipping block");
                continue;
            }
        };

        for (x1, y1, x2, y2) in coords {
            let px1 = spatial_types::denormalise(x1, page_width);
            let py1 = spatial_types::denormalise(y1, page_height);
            let px2 = spatial_types::denormalise(x2, page_width);
            let py2 = spatial_types::denormalise(y2, page_height);

            let bbox = match Bbox::new(px1, py1, px2, py2) {
                Ok(b) => b,
                Err(_) => {
                    log::warn!(
                        "degenerate bbox after denormalisation for label '{label}', skipping"
                    );
                    continue;
                }
            };

            match LayoutElement::new(label, bbox, page_number, &text_content, &text_full) {
                Ok(el) => elements.push(el),
                Err(e) => log::warn!("skipping element for label '{label}': {e}"),
            }
        }
    }

    elements
}

fn parse_coord_tuples(coords_str: &str) -> Option<Vec<(i32, i32, i32, i32)>> {
    let mut out = Vec::new();
    for caps in COORD_TUPLE.captures_iter(coords_str) {
        let x1 = caps.get(1)?.as_str().parse().ok()?;
        let y1 = caps.get(2)?.as_str().parse().ok()?;
        let x2 = caps.get(3)?.as_str().parse().ok()?;
        let y2 = caps.get(4)?.as_str().parse().ok()?;
        out.push((x1, y1, x2, y2));
    }
    Some(out)
}

/// Reduce an inter-block text segment to its cleaned heading/label text:
/// first non-empty line, markdown prefix and known HTML tags stripped.
/// Falls back to the (capitalised) label when the segment is empty.
fn extract_text_content(segment: &str, label: &str) -> String {
    let first_line = segment
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty());

    let Some(line) = first_line else {
        let mut c = label.chars();
        return match c.next() {
            Some(first) => first.to_uppercase().collect::<String>() + c.as_str(),
            None => String::new(),
        };
    };

    let stripped_md = MARKDOWN_HEADING_PREFIX.replace(line, "");
    strip_html_tags(&stripped_md)
}

fn strip_html_tags(text: &str) -> String {
    let mut result = text.to_string();
    for tag in NAMED_TAGS {
        let open = format!("<{tag}>");
        let close = format!("</{tag}>");
        result = result.replace(&open, "").replace(&close, "");
    }
    ANY_HTML_TAG.replace_all(&result, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_single_block() {
        let raw = "<|ref|>title<|/ref|><|det|>[[0,0,999,100]]<|/det|>Document Title";
        let els = extract_elements(raw, 1, 1000, 1000);
        assert_eq!(els.len(), 1);
        assert_eq!(els[0].label, "title");
        assert_eq!(els[0].text_content, "Document Title");
        assert_eq!(els[0].page_number, 1);
    }

    #[test]
    fn multiple_coords_produce_multiple_elements() {
        let raw = "<|ref|>text<|/ref|><|det|>[[0,0,100,50],[0,100,100,150]]<|/det|>Body";
        let els = extract_elements(raw, 1, 999, 999);
        assert_eq!(els.len(), 2);
    }

    #[test]
    fn strips_markdown_and_html() {
        let raw =
            "<|ref|>title<|/ref|><|det|>[[0,0,999,100]]<|/det|>### <center><b>Section</b></center>\nmore text";
        let els = extract_elements(raw, 1, 1000, 1000);
        assert_eq!(els[0].text_content, "Section");
        assert!(els[0].text_full.contains("more text"));
    }

    #[test]
    fn malformed_det_payload_is_skipped() {
        let raw = "<|ref|>text<|/ref|><|det|>not-coords<|/det|>Ignored\n<|ref|>title<|/ref|><|det|>[[0,0,10,10]]<|/det|>Kept";
        let els = extract_elements(raw, 1, 1000, 1000);
        assert_eq!(els.len(), 1);
        assert_eq!(els[0].label, "title");
    }

    #[test]
    fn empty_segment_falls_back_to_label() {
        let raw = "<|ref|>figure<|/ref|><|det|>[[0,0,100,100]]<|/det|>";
        let els = extract_elements(raw, 1, 1000, 1000);
        assert_eq!(els[0].text_content, "Figure");
    }
}
