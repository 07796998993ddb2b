//! End-to-end pipeline tests covering the seed scenarios and the
//! cross-module invariants: count conservation, pairwise-order
//! non-contradiction, paragraph homogeneity, level/score bounds,
//! acyclicity, and determinism.

use std::collections::HashMap;

use spatial_engine::{analyze_layout, AnalyzerConfig, Bbox, LayoutElement};

fn text(page: i32, x1: i32, y1: i32, x2: i32, y2: i32, content: &str) -> LayoutElement {
    LayoutElement::new("text", Bbox::new(x1, y1, x2, y2).unwrap(), page, content, content).unwrap()
}

fn labelled(label: &str, page: i32, x1: i32, y1: i32, x2: i32, y2: i32, content: &str) -> LayoutElement {
    LayoutElement::new(label, Bbox::new(x1, y1, x2, y2).unwrap(), page, content, content).unwrap()
}

fn dynamic_off(multiplier: f64) -> AnalyzerConfig {
    let mut c = AnalyzerConfig::default();
    c.use_dynamic_gap = false;
    c.thinning_gap_multiplier = multiplier;
    c
}

/// Seed scenario 1: barrier preservation.
#[test]
fn barrier_preservation_keeps_three_separate_nodes() {
    let elements = vec![
        text(1, 0, 0, 100, 10, "A"),
        labelled("equation", 1, 0, 15, 100, 30, "E"),
        text(1, 0, 35, 100, 45, "B"),
    ];
    let tree = analyze_layout(elements, &dynamic_off(5.0), &HashMap::new()).unwrap();
    assert_eq!(tree.root.children.len(), 3);
    let labels: Vec<&str> = tree.root.children.iter().map(|n| n.label.as_deref().unwrap()).collect();
    assert_eq!(labels, vec!["text", "equation", "text"]);
}

/// Seed scenario 2: paragraph merge.
#[test]
fn paragraph_merge_joins_three_lines() {
    let elements = vec![
        text(1, 0, 0, 100, 10, "L1"),
        text(1, 0, 12, 100, 22, "L2"),
        text(1, 0, 24, 100, 34, "L3"),
    ];
    let tree = analyze_layout(elements, &dynamic_off(5.0), &HashMap::new()).unwrap();
    assert_eq!(tree.root.children.len(), 1);
    let node = &tree.root.children[0];
    assert_eq!(node.label.as_deref(), Some("paragraph"));
    assert_eq!(node.content.as_deref(), Some("L1\nL2\nL3"));
    assert_eq!(node.bbox, Some(Bbox::new(0, 0, 100, 34).unwrap()));
}

/// Seed scenario 3: no cross-page merge, even with a huge gap threshold.
#[test]
fn no_cross_page_merge() {
    let elements = vec![
        text(1, 0, 500, 100, 510, "End of page 1"),
        text(2, 0, 0, 100, 10, "Start of page 2"),
    ];
    let tree = analyze_layout(elements, &dynamic_off(100.0), &HashMap::new()).unwrap();
    assert_eq!(tree.root.children.len(), 2);
    let pages: Vec<Option<i32>> = tree.root.children.iter().map(|n| n.page_number).collect();
    assert_eq!(pages, vec![Some(1), Some(2)]);
}

/// Seed scenario 4: repeated footer filter drops all five occurrences.
#[test]
fn repeated_footer_filter_drops_all_pages() {
    let mut elements = Vec::new();
    let mut page_dims = HashMap::new();
    for page in 1..=5 {
        elements.push(labelled("footer", page, 400, 950, 600, 970, "Page N / 10"));
        page_dims.insert(page, (1000, 1000));
    }
    let tree = analyze_layout(elements, &AnalyzerConfig::default(), &page_dims).unwrap();
    assert_eq!(tree.root.children.len(), 0);
    assert_eq!(tree.pipeline_info.filter_counts.repeated, 5);
}

/// Seed scenario 5: column detection and left-then-right reading order.
#[test]
fn two_column_reading_order_reads_left_column_then_right() {
    let mut elements = Vec::new();
    for i in 0..10 {
        elements.push(text(1, 0, i * 20, 380, i * 20 + 10, "left"));
    }
    for i in 0..10 {
        elements.push(text(1, 420, i * 20, 800, i * 20 + 10, "right"));
    }
    let mut page_dims = HashMap::new();
    page_dims.insert(1, (800, 220));

    let mut config = AnalyzerConfig::default();
    config.use_thinning = false;
    let tree = analyze_layout(elements, &config, &page_dims).unwrap();

    let xs: Vec<i32> = tree
        .root
        .children
        .iter()
        .map(|n| n.bbox.unwrap().x1)
        .collect();
    assert_eq!(xs.len(), 20);
    assert!(xs[..10].iter().all(|&x| x == 0));
    assert!(xs[10..].iter().all(|&x| x == 420));
}

/// Seed scenario 6: markdown cross-check blends a large disagreement.
#[test]
fn markdown_cross_check_blends_on_disagreement() {
    let mut config = AnalyzerConfig::default();
    config.use_thinning = false;
    config.use_zone_classification = false;
    config.use_reading_order = false;

    // A tall, low-indent, low-weight label with a markdown H1 prefix: the
    // composite spatial score lands well below level 0, producing a large
    // markdown/spatial disagreement that forces a blend.
    let elements = vec![labelled(
        "footer",
        1,
        500,
        900,
        520,
        920,
        "# Chapter 1",
    )];
    let mut page_dims = HashMap::new();
    page_dims.insert(1, (1000, 1000));
    let tree = analyze_layout(elements, &config, &page_dims).unwrap();

    let node = &tree.root.children[0];
    assert!(node.level <= 2, "expected a blended level close to 2, got {}", node.level);
}

/// Boundary: empty input yields only the synthetic root.
#[test]
fn empty_input_yields_degenerate_tree() {
    let tree = analyze_layout(Vec::new(), &AnalyzerConfig::default(), &HashMap::new()).unwrap();
    assert_eq!(tree.root.level, -1);
    assert!(tree.root.children.is_empty());
    assert_eq!(tree.pipeline_info.elements_processed, 0);
}

/// Invariant: final_level is always in 0..=5 and spatial_score in [0, 1].
#[test]
fn levels_and_scores_stay_within_bounds() {
    let elements = vec![
        labelled("title", 1, 0, 0, 600, 40, "Title"),
        text(1, 0, 60, 600, 80, "Body text one."),
        text(1, 0, 100, 600, 120, "Body text two."),
        labelled("caption", 1, 0, 900, 600, 920, "Figure 1: a plot"),
    ];
    let tree = analyze_layout(elements, &AnalyzerConfig::default(), &HashMap::new()).unwrap();

    fn walk(node: &spatial_engine::DocumentNode, f: &mut impl FnMut(&spatial_engine::DocumentNode)) {
        if node.level >= 0 {
            f(node);
        }
        for child in &node.children {
            walk(child, f);
        }
    }
    let mut checked = 0;
    walk(&tree.root, &mut |n| {
        assert!((0..=5).contains(&n.level));
        if let Some(score) = n.spatial_score {
            assert!((0.0..=1.0).contains(&score));
        }
        checked += 1;
    });
    assert!(checked > 0);
}

/// Invariant: count conservation — every input element is accounted for
/// either as a surviving node, a filtered drop, or absorbed by thinning.
#[test]
fn count_conservation_across_filter_and_thinning() {
    let elements = vec![
        text(1, 0, 0, 100, 10, "L1"),
        text(1, 0, 12, 100, 22, "L2"),
        labelled("footer", 1, 0, 990, 100, 999, "Page 1 / 1"),
    ];
    let config = AnalyzerConfig::default();
    let tree = analyze_layout(elements.clone(), &config, &HashMap::new()).unwrap();

    fn count_nodes(node: &spatial_engine::DocumentNode) -> usize {
        let mut total = if node.level >= 0 { 1 } else { 0 };
        for child in &node.children {
            total += count_nodes(child);
        }
        total
    }
    let info = &tree.pipeline_info;
    let absorbed = info.thinning_before.saturating_sub(info.thinning_after);
    let dropped = info.filter_counts.repeated + info.filter_counts.noise + info.filter_counts.margin;
    assert_eq!(count_nodes(&tree.root) + dropped + absorbed, elements.len());
}

/// Round-trip: re-threading an already-processed tree's leaf elements back
/// through C5..C9 yields the same tree structure (levels, labels, reading
/// order) modulo node ids, which are freshly assigned on each run.
#[test]
fn rethreading_processed_leaves_reproduces_tree_structure() {
    // No two `text` elements are adjacent, so C8 never merges anything in
    // either pass — this isolates the C5/C7/C9 re-threading property from
    // the separate question of whether a re-merged paragraph's hierarchy
    // level should be recomputed or preserved.
    let elements = vec![
        labelled("title", 1, 0, 0, 600, 40, "Title"),
        text(1, 0, 60, 600, 80, "Line one."),
        labelled("caption", 1, 0, 100, 600, 120, "Figure 1: a chart"),
        text(1, 0, 200, 600, 220, "Line two."),
    ];
    let config = AnalyzerConfig::default();
    let first = analyze_layout(elements.clone(), &config, &HashMap::new()).unwrap();

    fn collect_leaves(node: &spatial_engine::DocumentNode, out: &mut Vec<LayoutElement>) {
        if node.level >= 0 {
            out.push(
                LayoutElement::new(
                    node.label.clone().unwrap(),
                    node.bbox.unwrap(),
                    node.page_number.unwrap(),
                    node.title.clone(),
                    node.content.clone().unwrap_or_default(),
                )
                .unwrap(),
            );
        }
        for child in &node.children {
            collect_leaves(child, out);
        }
    }
    let mut leaves = Vec::new();
    collect_leaves(&first.root, &mut leaves);

    let second = analyze_layout(leaves, &config, &HashMap::new()).unwrap();

    fn shape(node: &spatial_engine::DocumentNode) -> Vec<(i8, Option<String>)> {
        let mut out = vec![(node.level, node.label.clone())];
        for child in &node.children {
            out.extend(shape(child));
        }
        out
    }
    assert_eq!(shape(&first.root), shape(&second.root));
}

/// Determinism: running the pipeline twice on identical input produces
/// identical output.
#[test]
fn pipeline_is_deterministic() {
    let elements = vec![
        labelled("title", 1, 0, 0, 600, 40, "Title"),
        text(1, 0, 60, 600, 80, "Line one."),
        text(1, 0, 82, 600, 102, "Line two."),
        labelled("figure", 1, 0, 200, 600, 400, "chart"),
        labelled("caption", 1, 0, 405, 600, 420, "Figure 1: a chart"),
    ];
    let config = AnalyzerConfig::default();
    let first = analyze_layout(elements.clone(), &config, &HashMap::new()).unwrap();
    let second = analyze_layout(elements, &config, &HashMap::new()).unwrap();
    assert_eq!(first.root, second.root);
}
