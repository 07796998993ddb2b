//! Precompiled regex patterns shared by the text extractor and the zone
//! classifier.
//!
//! Patterns are compiled once at first use and reused across documents,
//! per the "precompile once" design note.

use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// Grounding wire format (C2)
// ============================================================================

/// Matches one `<|ref|>LABEL<|/ref|><|det|>[[x1,y1,x2,y2],...]<|/det|>` block.
/// Capture groups: 1 = whole match, 2 = label, 3 = coordinate list source.
pub static GROUNDING_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<\|ref\|>(.*?)<\|/ref\|><\|det\|>(.*?)<\|/det\|>")
        .expect("grounding block regex should be valid")
});

/// A single `[x1,y1,x2,y2]` coordinate tuple inside a `<|det|>` payload.
pub static COORD_TUPLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\s*(-?\d+)\s*,\s*(-?\d+)\s*,\s*(-?\d+)\s*,\s*(-?\d+)\s*\]")
        .expect("coordinate tuple regex should be valid")
});

/// Leading markdown heading prefix, `#{1,6}` followed by whitespace.
pub static MARKDOWN_HEADING_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+").expect("markdown heading regex should be valid"));

/// Generic inline HTML tag fallback, used after the closed set of named
/// tags has already been stripped.
pub static ANY_HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("html tag regex should be valid"));

// ============================================================================
// Zone classifier text patterns (C4)
// ============================================================================

/// Caption lead-ins: `Figure N`, `Table N`, `Hình N`, `Bảng N`, optionally
/// wrapped in `<center>...</center>`.
pub static CAPTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"(?i)^(<center>\s*)?fig(ure)?\.?\s*\d+").unwrap(),
        Regex::new(r"(?i)^(<center>\s*)?table\.?\s*\d+").unwrap(),
        Regex::new(r"(?i)^(<center>\s*)?h[ìi]nh\.?\s*\d+").unwrap(),
        Regex::new(r"(?i)^(<center>\s*)?b[ảa]ng\.?\s*\d+").unwrap(),
    ]
});

/// Page number forms: standalone digits, `- N -`, `page N`, `trang N`.
pub static PAGE_NUMBER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\s*\d+\s*$").unwrap(),
        Regex::new(r"^\s*-\s*\d+\s*-\s*$").unwrap(),
        Regex::new(r"(?i)^\s*page\s+\d+\s*$").unwrap(),
        Regex::new(r"(?i)^\s*trang\s+\d+\s*$").unwrap(),
    ]
});

/// Section numbering: `N.`, `N.N.N`, or `Chapter/Section/Part/Chương/Phần N`.
pub static SECTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\s*\d+(\.\d+)*\.?\s+\S").unwrap(),
        Regex::new(r"(?i)^\s*(chapter|section|part|chương|phần|mục)\s+\d+").unwrap(),
    ]
});
