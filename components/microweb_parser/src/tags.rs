/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The tag dispatch registry (§4.4): one match arm per recognized,
//! case-folded tag name. A handler may push a context frame (container
//! tags, popped on the matching close), emit a leaf node immediately, or
//! both read and mutate parser-global state (title, text encoding,
//! preformatted depth).

use microweb_nodes::{BlockPayload, ImagePayload, NodePayload, StylePayload, TableCellPayload, TablePayload};
use microweb_style::{Alignment, FontStyle};

use crate::attrs::Attrs;
use crate::encoding::TextEncoding;
use crate::section::Section;
use crate::Parser;

/// One open container tag: its name (for close-tag matching) and the node
/// it pushed as the new current parent, if any.
pub(crate) struct Frame {
    pub tag: String,
    pub node: Option<microweb_nodes::NodeId>,
}

impl Parser {
    pub(crate) fn dispatch_open_tag(&mut self, name: &str, attrs_raw: &str) {
        let attrs = Attrs::parse(attrs_raw);
        match name {
            "html" => {}
            "head" => self.section.push(Section::Head),
            "title" => self.section.push(Section::Title),
            "body" => self.section.push(Section::Body),
            "script" => self.section.push(Section::Script),
            "style" if self.section.current() != Section::Body => self.section.push(Section::Style),
            "meta" => self.handle_meta(&attrs),
            "pre" => {
                self.tokenizer.enter_preformatted();
                self.push_frame(name, None);
            }
            "br" => {
                let parent = self.current_parent();
                let style = self.style_for_new_child(parent);
                let id = self.tree.add_break(parent, style, false);
                self.restyle(parent, id);
            }
            "hr" => {
                let parent = self.current_parent();
                let style = self.style_for_new_child(parent);
                let id = self.tree.add_break(parent, style, true);
                self.restyle(parent, id);
            }
            "b" | "strong" => self.push_style_frame(name, FontStyle::BOLD, None, None),
            "i" | "em" => self.push_style_frame(name, FontStyle::ITALIC, None, None),
            "u" => self.push_style_frame(name, FontStyle::UNDERLINE, None, None),
            "tt" | "code" | "kbd" => self.push_style_frame(name, FontStyle::MONOSPACE, None, None),
            "center" => self.push_style_frame(name, FontStyle::REGULAR, Some(Alignment::Center), None),
            "h1" => self.push_style_frame(name, FontStyle::BOLD, None, Some(1)),
            "h2" => self.push_style_frame(name, FontStyle::BOLD, None, Some(2)),
            "h3" => self.push_style_frame(name, FontStyle::BOLD, None, Some(3)),
            "h4" => self.push_style_frame(name, FontStyle::BOLD, None, Some(4)),
            "p" | "div" => {
                let parent = self.current_parent();
                let style = self.style_for_new_child(parent);
                let block = self
                    .tree
                    .add_block(parent, style, BlockPayload { margin_left: 0, margin_right: 0, pad_top: 4, pad_bottom: 4 });
                let block = self.restyle(parent, block);
                self.push_frame(name, block);
            }
            "a" => {
                let href = attrs.get("href").unwrap_or("").to_string();
                let parent = self.current_parent();
                let style = self.style_for_new_child(parent);
                let link = self.tree.add_link(parent, style, href);
                let link = self.restyle(parent, link);
                self.push_frame(name, link);
            }
            "img" => self.handle_img(&attrs),
            "form" => {
                let action = attrs.get("action").unwrap_or("").to_string();
                let parent = self.current_parent();
                let style = self.style_for_new_child(parent);
                let form = self.tree.add_form(parent, style, action);
                let form = self.restyle(parent, form);
                self.push_frame(name, form);
            }
            "input" => self.handle_input(&attrs),
            "button" => {
                let parent = self.current_parent();
                let style = self.style_for_new_child(parent);
                let label = attrs.get("value").unwrap_or("").to_string();
                let button = self.tree.add_button(parent, style, label);
                let button = self.restyle(parent, button);
                self.push_frame(name, button);
            }
            "textarea" => {
                let parent = self.current_parent();
                let style = self.style_for_new_child(parent);
                let name_attr = attrs.get("name").unwrap_or("").to_string();
                let field = self.tree.add_text_field(parent, style, name_attr);
                let field = self.restyle(parent, field);
                self.push_frame(name, field);
            }
            "select" => {
                let parent = self.current_parent();
                let style = self.style_for_new_child(parent);
                let name_attr = attrs.get("name").unwrap_or("").to_string();
                let select = self.tree.add_select(parent, style, name_attr);
                let select = self.restyle(parent, select);
                self.push_frame(name, select);
            }
            "option" => {
                let parent = self.current_parent();
                let style = self.style_for_new_child(parent);
                let value = attrs.get("value").unwrap_or("").to_string();
                let option = self.tree.add_option(parent, style, value, "");
                let option = self.restyle(parent, option);
                self.push_frame(name, option);
            }
            "table" => {
                let parent = self.current_parent();
                let style = self.style_for_new_child(parent);
                let width = attrs.get("width").and_then(|w| w.trim_end_matches('%').parse().ok());
                let table = self.tree.add_table(
                    parent,
                    style,
                    TablePayload { cell_spacing: 2, cell_padding: 2, explicit_width: width },
                );
                let table = self.restyle(parent, table);
                self.push_frame(name, table);
            }
            "tr" => {
                let parent = self.current_parent();
                let style = self.style_for_new_child(parent);
                let row = self.tree.add_table_row(parent, style);
                let row = self.restyle(parent, row);
                self.push_frame(name, row);
            }
            "td" | "th" => {
                let parent = self.current_parent();
                let style = self.style_for_new_child(parent);
                let width_px = attrs.get("width").and_then(|w| w.parse().ok());
                let cell = self.tree.add_table_cell(
                    parent,
                    style,
                    TableCellPayload { preferred_width: 0, explicit_width_px: width_px, explicit_width_pct: None },
                );
                let cell = self.restyle(parent, cell);
                self.push_frame(name, cell);
            }
            "ul" => {
                let parent = self.current_parent();
                let style = self.style_for_new_child(parent);
                let list = self.tree.add_list(parent, style, false);
                let list = self.restyle(parent, list);
                self.push_frame(name, list);
            }
            "ol" => {
                let parent = self.current_parent();
                let style = self.style_for_new_child(parent);
                let list = self.tree.add_list(parent, style, true);
                let list = self.restyle(parent, list);
                self.push_frame(name, list);
            }
            "li" => {
                let parent = self.current_parent();
                let style = self.style_for_new_child(parent);
                let index = self.tree.children(parent).len() as u32;
                let item = self.tree.add_list_item(parent, style, index);
                let item = self.restyle(parent, item);
                self.push_frame(name, item);
            }
            _ => {
                log::debug!("ignoring unrecognized tag <{name}>");
            }
        }
    }

    pub(crate) fn dispatch_close_tag(&mut self, name: &str) {
        match name {
            "head" => self.section.pop_to(Section::Head),
            "title" => self.section.pop_to(Section::Title),
            "script" => self.section.pop_to(Section::Script),
            "style" => self.section.pop_to(Section::Style),
            "pre" => {
                self.tokenizer.leave_preformatted();
                self.pop_frame(name);
            }
            _ => self.pop_frame(name),
        }
    }

    fn handle_meta(&mut self, attrs: &Attrs) {
        let label = attrs.get("charset").or_else(|| {
            attrs.get("content").and_then(|c| {
                let key = "charset=";
                c.to_ascii_lowercase().find(key).map(|i| &c[i + key.len()..])
            })
        });
        if let Some(label) = label {
            if let Some(encoding) = TextEncoding::from_label(label) {
                self.decoder.set_encoding(encoding);
            }
        }
    }

    fn handle_img(&mut self, attrs: &Attrs) {
        let parent = self.current_parent();
        let style = self.style_for_new_child(parent);
        let payload = ImagePayload {
            src: attrs.get("src").unwrap_or("").to_string(),
            alt: attrs.get("alt").unwrap_or("").to_string(),
            ismap: attrs.has("ismap"),
            explicit_width: attrs.get("width").and_then(|w| w.parse().ok()),
            explicit_height: attrs.get("height").and_then(|h| h.parse().ok()),
            ..Default::default()
        };
        let id = self.tree.add_image(parent, style, payload);
        self.restyle(parent, id);
    }

    fn handle_input(&mut self, attrs: &Attrs) {
        let parent = self.current_parent();
        let style = self.style_for_new_child(parent);
        match attrs.get("type").unwrap_or("text") {
            "checkbox" | "radio" => {
                // CheckBoxPayload doesn't carry the `name` attribute; the
                // form walk treats every checked box as one "on" pair
                // (§4.3 "Form").
                let id = self.tree.add_check_box(parent, style, attrs.has("checked"));
                self.restyle(parent, id);
            }
            "submit" | "button" => {
                let label = attrs.get("value").unwrap_or("Submit").to_string();
                let id = self.tree.add_button(parent, style, label);
                self.restyle(parent, id);
            }
            _ => {
                let name_attr = attrs.get("name").unwrap_or("").to_string();
                let id = self.tree.add_text_field(parent, style, name_attr);
                if let (Some(id), Some(value)) = (id, attrs.get("value")) {
                    if let NodePayload::TextField(f) = &mut self.tree.get_mut(id).payload {
                        f.buffer = value.to_string();
                        f.cursor = f.buffer.chars().count();
                    }
                }
                self.restyle(parent, id);
            }
        }
    }

    fn push_style_frame(&mut self, tag: &str, mask: FontStyle, alignment: Option<Alignment>, heading: Option<u8>) {
        let parent = self.current_parent();
        let style = self.style_for_new_child(parent);
        let node = self.tree.add_style(
            parent,
            style,
            StylePayload { override_mask: mask, override_alignment: alignment, heading_level: heading },
        );
        let node = self.restyle(parent, node);
        self.push_frame(tag, node);
    }

    pub(crate) fn push_frame(&mut self, tag: &str, node: Option<microweb_nodes::NodeId>) {
        self.stack.push(Frame { tag: tag.to_string(), node });
    }

    pub(crate) fn pop_frame(&mut self, tag: &str) {
        if let Some(pos) = self.stack.iter().rposition(|f| f.tag == tag) {
            self.stack.truncate(pos);
        }
    }

    pub(crate) fn current_parent(&self) -> microweb_nodes::NodeId {
        self.stack
            .iter()
            .rev()
            .find_map(|f| f.node)
            .unwrap_or(self.root)
    }

    /// Computes the style a newly inserted child should start with before
    /// `apply_style` overlays kind-specific overrides: simply the nearest
    /// container's effective style.
    pub(crate) fn style_for_new_child(&self, parent: microweb_nodes::NodeId) -> microweb_style::StyleHandle {
        self.tree.get(parent).style
    }

    /// Runs `apply_style` (§4.3: "On creation, after parent style is
    /// known") for a just-inserted node and stores the resulting handle,
    /// replacing the parent-inherited placeholder every `add_*` call was
    /// seeded with.
    pub(crate) fn restyle(&mut self, parent: microweb_nodes::NodeId, id: Option<microweb_nodes::NodeId>) -> Option<microweb_nodes::NodeId> {
        let id = id?;
        let parent_style = self.tree.style_of(parent);
        let handle = microweb_nodes::apply_style(&mut self.tree, id, parent_style);
        self.tree.get_mut(id).style = handle;
        Some(id)
    }
}
