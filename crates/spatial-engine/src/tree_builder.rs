//! Tree builder (C9): stack-based parent assignment from an ordered,
//! levelled element list.

use spatial_types::{Bbox, DocumentNode, DocumentTree, LayoutElement, PipelineInfo};

/// Fallback level used only if an element somehow reaches C9 without a
/// `final_level` (should not happen in practice — C7 always assigns one).
const FALLBACK_LEVEL: u8 = 3;

struct ArenaNode {
    level: i8,
    node_id: u64,
    title: String,
    page_number: Option<i32>,
    content: Option<String>,
    bbox: Option<Bbox>,
    label: Option<String>,
    spatial_score: Option<f64>,
    children: Vec<usize>,
}

impl ArenaNode {
    fn root() -> Self {
        Self {
            level: -1,
            node_id: 0,
            title: String::new(),
            page_number: None,
            content: None,
            bbox: None,
            label: None,
            spatial_score: None,
            children: Vec::new(),
        }
    }

    fn from_element(node_id: u64, level: i8, el: &LayoutElement) -> Self {
        Self {
            level,
            node_id,
            title: el.text_content.clone(),
            page_number: Some(el.page_number),
            content: Some(el.text_full.clone()),
            bbox: Some(el.bbox),
            label: Some(el.label.clone()),
            spatial_score: el.spatial_score,
            children: Vec::new(),
        }
    }
}

fn materialise(idx: usize, arena: &mut [Option<ArenaNode>]) -> DocumentNode {
    let node = arena[idx].take().expect("each arena node visited once");
    let mut children = Vec::with_capacity(node.children.len());
    for c in node.children {
        children.push(materialise(c, &mut *arena));
    }
    DocumentNode {
        node_id: node.node_id,
        title: node.title,
        level: node.level,
        page_number: node.page_number,
        content: node.content,
        bbox: node.bbox,
        label: node.label,
        spatial_score: node.spatial_score,
        children,
    }
}

/// Build the tree: create a synthetic root at level `-1`, then for each
/// element (in reading order, with `final_level` assigned) pop the
/// ancestor stack while the top's level is `>=` the element's level,
/// append as a child of the new top, and push.
pub fn build_tree(elements: Vec<LayoutElement>) -> DocumentNode {
    let mut arena: Vec<ArenaNode> = vec![ArenaNode::root()];
    let mut stack: Vec<usize> = vec![0];
    let mut next_id: u64 = 1;

    for el in &elements {
        let level = el.final_level.unwrap_or(FALLBACK_LEVEL) as i8;

        while stack.len() > 1 && arena[*stack.last().unwrap()].level >= level {
            stack.pop();
        }

        let idx = arena.len();
        arena.push(ArenaNode::from_element(next_id, level, el));
        next_id += 1;

        let parent = *stack.last().unwrap();
        arena[parent].children.push(idx);
        stack.push(idx);
    }

    let mut arena: Vec<Option<ArenaNode>> = arena.into_iter().map(Some).collect();
    materialise(0, &mut arena)
}

/// Build the tree and wrap it with pipeline metadata.
pub fn build_document_tree(elements: Vec<LayoutElement>, pipeline_info: PipelineInfo) -> DocumentTree {
    DocumentTree {
        root: build_tree(elements),
        pipeline_info,
    }
}
