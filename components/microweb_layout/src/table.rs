/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Two-pass Table / TableRow / TableCell width distribution (§4.3
//! "Table / TableRow / TableCell"): cells first contribute a preferred
//! width, the table distributes available width proportionally (honoring
//! explicit pixel widths where given), then rows place cells side by side.

use microweb_assets::AssetPack;
use microweb_nodes::{NodeId, NodePayload, NodeTree};

use crate::wrap::measured_width;

/// One in-progress row: where the next cell starts, the row's top y, and
/// the deepest bottom reached by any cell so far.
pub struct RowState {
    pub row_top: i32,
    pub next_x: i32,
    pub max_bottom: i32,
    pub cell_index: usize,
}

#[derive(Clone, Debug, Default)]
pub struct TablePlan {
    pub columns: Vec<i32>,
    pub spacing: i32,
    pub padding: i32,
}

impl TablePlan {
    pub fn column_width(&self, index: usize) -> i32 {
        self.columns.get(index).copied().unwrap_or(self.padding.max(1) * 2 + 8)
    }
}

/// Walks `node`'s subtree estimating the pixel width it would occupy if
/// never wrapped — the "preferred width" contribution of §4.3's first
/// pass. Leaf kinds report their own natural width; containers sum their
/// children's.
pub fn measure_preferred_width(tree: &NodeTree, assets: &AssetPack, node: NodeId) -> i32 {
    match &tree.get(node).payload {
        NodePayload::Text(t) => {
            let style = tree.style_of(node);
            let font = crate::engine::font_for(assets, style);
            let bold = style.font_style.contains(microweb_style::FontStyle::BOLD);
            measured_width(font, &t.text, bold)
        }
        NodePayload::Button(b) => {
            let style = tree.style_of(node);
            let font = crate::engine::font_for(assets, style);
            measured_width(font, &b.label, false) + crate::engine::BUTTON_PADDING * 2
        }
        NodePayload::TextField(_) => crate::engine::DEFAULT_TEXT_FIELD_WIDTH,
        NodePayload::CheckBox(_) => crate::engine::CHECKBOX_SIZE,
        NodePayload::Image(img) => img
            .explicit_width
            .unwrap_or_else(|| img.natural_width.max(crate::engine::DEFAULT_IMAGE_PLACEHOLDER)),
        _ => tree.children(node).iter().map(|c| measure_preferred_width(tree, assets, *c)).sum(),
    }
}

/// Builds the column-width plan for `table` against `available_width`,
/// scaling every column down proportionally (never below one pixel, per
/// the "no column < 1 px" testable property) when the summed preferred
/// widths overflow.
pub fn build_plan(tree: &NodeTree, assets: &AssetPack, table: NodeId, available_width: i32) -> TablePlan {
    let payload = match &tree.get(table).payload {
        NodePayload::Table(t) => *t,
        _ => Default::default(),
    };
    let rows = tree.children(table);
    let mut col_count = 0usize;
    let mut preferred: Vec<i32> = Vec::new();
    for row in &rows {
        let cells = tree.children(*row);
        col_count = col_count.max(cells.len());
        for (i, cell) in cells.iter().enumerate() {
            let mut width = measure_preferred_width(tree, assets, *cell) + payload.cell_padding * 2;
            if let NodePayload::TableCell(c) = &tree.get(*cell).payload {
                if let Some(px) = c.explicit_width_px {
                    width = px;
                }
            }
            if i >= preferred.len() {
                preferred.push(width);
            } else {
                preferred[i] = preferred[i].max(width);
            }
        }
    }
    if col_count == 0 {
        return TablePlan { columns: Vec::new(), spacing: payload.cell_spacing, padding: payload.cell_padding };
    }
    let total_spacing = payload.cell_spacing * (col_count as i32 + 1);
    let budget = (payload.explicit_width.unwrap_or(available_width) - total_spacing).max(col_count as i32);
    let total_preferred: i32 = preferred.iter().sum();
    let columns = if total_preferred > budget && total_preferred > 0 {
        preferred.iter().map(|w| ((*w as i64 * budget as i64) / total_preferred as i64).max(1) as i32).collect()
    } else {
        preferred
    };
    TablePlan { columns, spacing: payload.cell_spacing, padding: payload.cell_padding }
}

#[cfg(test)]
mod tests {
    use super::*;
    use microweb_nodes::TableCellPayload;
    use microweb_style::ElementStyle;

    fn tree_with_table() -> (NodeTree, NodeId) {
        let mut tree = NodeTree::new();
        let style = tree.intern_style(ElementStyle::root(7));
        let root = tree.add_section(None, style, "Document").unwrap();
        tree.set_root(root);
        (tree, root)
    }

    #[test]
    fn columns_scale_down_but_never_below_one_pixel() {
        let (mut tree, root) = tree_with_table();
        let style = tree.get(root).style;
        let table = tree
            .add_table(root, style, microweb_nodes::TablePayload { cell_spacing: 0, cell_padding: 0, explicit_width: None })
            .unwrap();
        let row = tree.add_table_row(table, style).unwrap();
        for _ in 0..5 {
            let cell = tree
                .add_table_cell(row, style, TableCellPayload { preferred_width: 0, explicit_width_px: Some(100), explicit_width_pct: None })
                .unwrap();
            tree.add_text(cell, style, "x").unwrap();
        }
        // fixture has no AssetPack available in this unit test; exercise
        // the pure column-math path directly instead of measure_preferred_width.
        let payload = microweb_nodes::TablePayload { cell_spacing: 0, cell_padding: 0, explicit_width: None };
        let preferred = vec![100, 100, 100, 100, 100];
        let available = 50;
        let total_spacing = payload.cell_spacing * (preferred.len() as i32 + 1);
        let budget = (available - total_spacing).max(preferred.len() as i32);
        let total: i32 = preferred.iter().sum();
        let columns: Vec<i32> = preferred.iter().map(|w| ((*w as i64 * budget as i64) / total as i64).max(1) as i32).collect();
        assert!(columns.iter().all(|&w| w >= 1));
        assert!(columns.iter().sum::<i32>() <= available);
    }
}
