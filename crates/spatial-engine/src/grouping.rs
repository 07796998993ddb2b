//! Grouping (C6): column detection, line/block grouping, caption linking.

use std::collections::HashMap;

use spatial_types::{LayoutElement, Zone};

const COLUMN_BIN_WIDTH: i32 = 5;

/// Median height among elements with positive height, or `default` when
/// none exist.
pub fn median_line_height(elements: &[LayoutElement], default: f64) -> f64 {
    let mut heights: Vec<f64> = elements
        .iter()
        .map(|e| e.bbox.height() as f64)
        .filter(|&h| h > 0.0)
        .collect();
    if heights.is_empty() {
        return default;
    }
    heights.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = heights.len() / 2;
    if heights.len() % 2 == 0 {
        (heights[mid - 1] + heights[mid]) / 2.0
    } else {
        heights[mid]
    }
}

/// X-axis projection histogram column detection. Returns `(x1, x2)`
/// ranges in page pixel space, left to right.
pub fn detect_columns(elements: &[LayoutElement], page_width: i32) -> Vec<(i32, i32)> {
    if page_width <= 0 {
        return vec![(0, 0)];
    }

    let n_bins = ((page_width + COLUMN_BIN_WIDTH - 1) / COLUMN_BIN_WIDTH) as usize;
    let mut counts = vec![0u32; n_bins];
    for el in elements {
        let start = (el.bbox.x1.max(0) / COLUMN_BIN_WIDTH) as usize;
        // x2 is an exclusive bound: a box ending exactly at a bin's left
        // edge does not cover that bin.
        let end = ((el.bbox.x2 - 1).max(0) / COLUMN_BIN_WIDTH) as usize;
        for b in start..=end.min(n_bins.saturating_sub(1)) {
            if b < n_bins {
                counts[b] += 1;
            }
        }
    }

    let min_valley_bins =
        ((page_width as f64 * 0.05) / COLUMN_BIN_WIDTH as f64).ceil() as usize;

    let mut valleys: Vec<(usize, usize)> = Vec::new();
    let mut run_start: Option<usize> = None;
    for i in 0..n_bins {
        if counts[i] == 0 {
            run_start.get_or_insert(i);
        } else if let Some(s) = run_start.take() {
            if i - s >= min_valley_bins {
                valleys.push((s, i));
            }
        }
    }
    if let Some(s) = run_start {
        if n_bins - s >= min_valley_bins {
            valleys.push((s, n_bins));
        }
    }

    if valleys.is_empty() {
        return vec![(0, page_width)];
    }

    let mut boundaries = vec![0i32];
    for (s, e) in &valleys {
        boundaries.push(*s as i32 * COLUMN_BIN_WIDTH);
        boundaries.push(*e as i32 * COLUMN_BIN_WIDTH);
    }
    boundaries.push(page_width);

    let mut columns = Vec::new();
    let mut i = 0;
    while i + 1 < boundaries.len() {
        let c1 = boundaries[i];
        let c2 = boundaries[i + 1].min(page_width);
        if c2 > c1 {
            columns.push((c1, c2));
        }
        i += 2;
    }

    let min_width = (page_width as f64 * 0.15) as i32;
    let columns: Vec<(i32, i32)> = columns
        .into_iter()
        .filter(|(a, b)| b - a >= min_width)
        .collect();

    if columns.is_empty() {
        vec![(0, page_width)]
    } else {
        columns
    }
}

/// Assign each element's `column_index` to the column whose range
/// contains its horizontal centre (falling back to the nearest column).
pub fn assign_column_membership(elements: &mut [LayoutElement], columns: &[(i32, i32)]) {
    for el in elements.iter_mut() {
        let (centre_x, _) = el.bbox.centre();
        let idx = columns
            .iter()
            .position(|&(x1, x2)| centre_x >= x1 as f64 && centre_x < x2 as f64)
            .unwrap_or_else(|| {
                columns
                    .iter()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| {
                        let da = column_distance(centre_x, **a);
                        let db = column_distance(centre_x, **b);
                        da.partial_cmp(&db).unwrap()
                    })
                    .map(|(i, _)| i)
                    .unwrap_or(0)
            });
        el.column_index = Some(idx);
    }
}

fn column_distance(x: f64, (x1, x2): (i32, i32)) -> f64 {
    if x < x1 as f64 {
        x1 as f64 - x
    } else if x > x2 as f64 {
        x - x2 as f64
    } else {
        0.0
    }
}

/// Group element indices into lines: sorted by `y1`, a new line starts
/// whenever the incoming `y1` exceeds the running bottom by more than
/// `0.3 * median_height`. Each line's indices are sorted by `x1`.
pub fn group_into_lines(
    indices: &[usize],
    elements: &[LayoutElement],
    median_height: f64,
) -> Vec<Vec<usize>> {
    let mut sorted: Vec<usize> = indices.to_vec();
    sorted.sort_by_key(|&i| elements[i].bbox.y1);

    let tolerance = 0.3 * median_height;
    let mut lines: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut current_bottom = i32::MIN;

    for idx in sorted {
        let y1 = elements[idx].bbox.y1;
        if current.is_empty() {
            current.push(idx);
            current_bottom = elements[idx].bbox.y2;
        } else if (y1 as f64) > current_bottom as f64 + tolerance {
            current.sort_by_key(|&i| elements[i].bbox.x1);
            lines.push(std::mem::take(&mut current));
            current.push(idx);
            current_bottom = elements[idx].bbox.y2;
        } else {
            current.push(idx);
            current_bottom = current_bottom.max(elements[idx].bbox.y2);
        }
    }
    if !current.is_empty() {
        current.sort_by_key(|&i| elements[i].bbox.x1);
        lines.push(current);
    }
    lines
}

/// Merge consecutive lines into blocks: a new block starts whenever the
/// gap between a line's top and the previous line's bottom exceeds
/// `1.5 * median_height`.
pub fn group_lines_to_blocks(
    lines: Vec<Vec<usize>>,
    elements: &[LayoutElement],
    median_height: f64,
) -> Vec<Vec<usize>> {
    let gap_threshold = 1.5 * median_height;
    let mut blocks: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut prev_bottom: Option<i32> = None;

    for line in lines {
        if line.is_empty() {
            continue;
        }
        let line_top = line.iter().map(|&i| elements[i].bbox.y1).min().unwrap();
        let line_bottom = line.iter().map(|&i| elements[i].bbox.y2).max().unwrap();

        if let Some(pb) = prev_bottom {
            let gap = (line_top - pb) as f64;
            if gap > gap_threshold && !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        }
        current.extend(line);
        prev_bottom = Some(line_bottom);
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Link each caption to the nearest figure/table within half its width
/// horizontally and `0.15 * figure_height` vertically. Returns a map from
/// caption index to linked figure/table index.
pub fn link_captions_to_figures(elements: &[LayoutElement]) -> HashMap<usize, usize> {
    let figures: Vec<usize> = elements
        .iter()
        .enumerate()
        .filter(|(_, e)| matches!(e.zone, Some(Zone::Figure) | Some(Zone::Table)))
        .map(|(i, _)| i)
        .collect();

    let mut links = HashMap::new();
    for (ci, cap) in elements.iter().enumerate() {
        if cap.zone != Some(Zone::Caption) {
            continue;
        }
        let (cap_cx, _) = cap.bbox.centre();

        let mut best: Option<(usize, f64)> = None;
        for &fi in &figures {
            let fig = &elements[fi];
            let (fig_cx, _) = fig.bbox.centre();
            let half_width = fig.bbox.width() as f64 / 2.0;
            if (cap_cx - fig_cx).abs() > half_width {
                continue;
            }

            let vgap = if cap.bbox.y1 >= fig.bbox.y2 {
                (cap.bbox.y1 - fig.bbox.y2) as f64
            } else if fig.bbox.y1 >= cap.bbox.y2 {
                (fig.bbox.y1 - cap.bbox.y2) as f64
            } else {
                0.0
            };
            let fig_height = fig.bbox.height() as f64;
            if vgap > 0.15 * fig_height {
                continue;
            }

            if best.map(|(_, d)| vgap < d).unwrap_or(true) {
                best = Some((fi, vgap));
            }
        }
        if let Some((fi, _)) = best {
            links.insert(ci, fi);
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(x1: i32, y1: i32, x2: i32, y2: i32) -> LayoutElement {
        LayoutElement::text_at(1, x1, y1, x2, y2, "x")
    }

    #[test]
    fn detects_two_columns_with_a_zero_density_valley() {
        let mut elements = Vec::new();
        for i in 0..10 {
            elements.push(make(0, i * 20, 380, i * 20 + 10));
        }
        for i in 0..10 {
            elements.push(make(420, i * 20, 800, i * 20 + 10));
        }
        let columns = detect_columns(&elements, 800);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0], (0, 380));
        assert_eq!(columns[1], (420, 800));
    }

    #[test]
    fn no_valley_yields_single_column() {
        let elements = vec![make(0, 0, 800, 10), make(0, 20, 800, 30)];
        let columns = detect_columns(&elements, 800);
        assert_eq!(columns.len(), 1);
    }

    #[test]
    fn median_line_height_falls_back_to_default() {
        assert_eq!(median_line_height(&[], 40.0), 40.0);
    }

    #[test]
    fn lines_split_on_large_y_gap() {
        let elements = vec![
            make(0, 0, 100, 10),
            make(0, 12, 100, 22),
            make(0, 100, 100, 110),
        ];
        let indices: Vec<usize> = (0..elements.len()).collect();
        let lines = group_into_lines(&indices, &elements, 10.0);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 2);
        assert_eq!(lines[1].len(), 1);
    }
}
