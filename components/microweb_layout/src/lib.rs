/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The layout engine (§4.5): `begin_layout_context` / `generate_layout` /
//! `end_layout_context` for every node kind, word-wrap, and two-pass table
//! width distribution. Depends on `microweb_nodes` for the tree and on
//! `microweb_assets` for glyph metrics, never the reverse.

mod cursor;
mod engine;
mod table;
mod wrap;

pub use engine::{
    LayoutEngine, LayoutOutcome, BLOCK_VERTICAL_GAP, BUTTON_PADDING, CHECKBOX_SIZE, DEFAULT_IMAGE_PLACEHOLDER,
    DEFAULT_TEXT_FIELD_WIDTH, LIST_INDENT, RULE_GAP, RULE_HEIGHT,
};
pub use table::{build_plan, measure_preferred_width, RowState, TablePlan};
pub use wrap::{glyph_advance, measured_width, wrap, Segment};
