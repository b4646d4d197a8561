/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The UI shell (§4.7): the interface root's fixed node set (title, back
//! and forward buttons, address bar, scrollbar, status bar) plus the
//! packed-buffer navigation history. This is a second, independent
//! `NodeTree` from the document root, per §3's "two independent roots".

mod history;

pub use history::HistoryRing;

use microweb_nodes::{Key, NodeAction, NodeEvent, NodeId, NodeTree};
use microweb_style::ElementStyle;

/// The shell-level intents interaction with the interface root can
/// produce — a small, closed mapping onto §4.7's button/field semantics,
/// the way `NodeAction` maps the document root's.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellAction {
    PreviousPage,
    NextPage,
    OpenUrl(String),
    ScrollTo(i32),
    SetStatus(Option<String>),
}

pub struct InterfaceRoot {
    tree: NodeTree,
    root: NodeId,
    title: NodeId,
    back_button: NodeId,
    forward_button: NodeId,
    address_bar: NodeId,
    scrollbar: NodeId,
    status_bar: NodeId,
    pub history: HistoryRing,
}

impl InterfaceRoot {
    pub fn new(text_color: u8) -> Self {
        let mut tree = NodeTree::new();
        let style = tree.intern_style(ElementStyle::root(text_color));
        let root = tree.add_section(None, style, "Interface").expect("interface root always fits");
        tree.set_root(root);
        let title = tree.add_text(root, style, "MicroWeb").expect("interface root always fits");
        let back_button = tree.add_button(root, style, "<").expect("interface root always fits");
        let forward_button = tree.add_button(root, style, ">").expect("interface root always fits");
        let address_bar = tree.add_text_field(root, style, "address").expect("interface root always fits");
        let scrollbar = tree.add_scroll_bar(root, style).expect("interface root always fits");
        let status_bar = tree.add_status_bar(root, style).expect("interface root always fits");
        InterfaceRoot {
            tree,
            root,
            title,
            back_button,
            forward_button,
            address_bar,
            scrollbar,
            status_bar,
            history: HistoryRing::new(),
        }
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn back_button(&self) -> NodeId {
        self.back_button
    }

    pub fn forward_button(&self) -> NodeId {
        self.forward_button
    }

    pub fn address_bar(&self) -> NodeId {
        self.address_bar
    }

    pub fn scrollbar(&self) -> NodeId {
        self.scrollbar
    }

    pub fn status_bar(&self) -> NodeId {
        self.status_bar
    }

    pub fn set_title(&mut self, text: &str) {
        if let microweb_nodes::NodePayload::Text(t) = &mut self.tree.get_mut(self.title).payload {
            t.text = text.to_string();
            t.last_available_width = None;
        }
    }

    /// Replaces the address bar contents, e.g. once navigation completes
    /// and a redirect chain's final URL is known (§8 scenario 5: "the
    /// address bar shows the final URL").
    pub fn set_address(&mut self, url: &str) {
        if let microweb_nodes::NodePayload::TextField(f) = &mut self.tree.get_mut(self.address_bar).payload {
            f.buffer = url.to_string();
            f.cursor = f.buffer.chars().count();
            f.selection = None;
        }
    }

    fn address_text(&self) -> String {
        match &self.tree.get(self.address_bar).payload {
            microweb_nodes::NodePayload::TextField(f) => f.buffer.clone(),
            _ => String::new(),
        }
    }

    /// Sets the status bar's general message slot.
    pub fn set_status(&mut self, message: impl Into<String>) {
        if let microweb_nodes::NodePayload::StatusBar(s) = &mut self.tree.get_mut(self.status_bar).payload {
            s.general = message.into();
        }
    }

    /// Sets (or clears) the hover slot, which overrides the general
    /// message while present (§4.7).
    pub fn set_hover(&mut self, message: Option<String>) {
        if let microweb_nodes::NodePayload::StatusBar(s) = &mut self.tree.get_mut(self.status_bar).payload {
            s.hover = message;
        }
    }

    /// Updates the scrollbar's track geometry, e.g. after the document's
    /// content height or window height changes.
    pub fn configure_scrollbar(&mut self, max_scroll: i32, thumb_size: i32, track_size: i32) {
        if let microweb_nodes::NodePayload::ScrollBar(s) = &mut self.tree.get_mut(self.scrollbar).payload {
            s.max_scroll = max_scroll;
            s.thumb_size = thumb_size;
            s.track_size = track_size;
        }
    }

    pub fn set_scroll_position(&mut self, position: i32) {
        if let microweb_nodes::NodePayload::ScrollBar(s) = &mut self.tree.get_mut(self.scrollbar).payload {
            s.scroll_position = position;
        }
    }

    pub fn pick(&self, x: i32, y: i32) -> Option<NodeId> {
        microweb_nodes::pick(&self.tree, self.root, x, y)
    }

    /// Routes `event` to `node`'s handler, translating the fixed
    /// shell-level semantics (§4.7: back/forward buttons, address bar
    /// Enter) on top of `microweb_nodes`'s generic per-kind dispatch.
    pub fn dispatch(&mut self, node: NodeId, event: NodeEvent) -> Option<ShellAction> {
        if node == self.back_button && matches!(event, NodeEvent::MouseRelease { .. }) {
            microweb_nodes::handle_event(&mut self.tree, node, event);
            return Some(ShellAction::PreviousPage);
        }
        if node == self.forward_button && matches!(event, NodeEvent::MouseRelease { .. }) {
            microweb_nodes::handle_event(&mut self.tree, node, event);
            return Some(ShellAction::NextPage);
        }
        if node == self.address_bar && matches!(event, NodeEvent::KeyPress(Key::Enter)) {
            return Some(ShellAction::OpenUrl(self.address_text()));
        }
        let (_, action) = microweb_nodes::handle_event(&mut self.tree, node, event);
        match action {
            Some(NodeAction::ScrollTo(pos)) => Some(ShellAction::ScrollTo(pos)),
            Some(NodeAction::SetStatus(msg)) => Some(ShellAction::SetStatus(msg)),
            Some(NodeAction::Navigate { url }) => Some(ShellAction::OpenUrl(url)),
            Some(NodeAction::RequestFormSubmit { .. }) | None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_button_release_yields_previous_page() {
        let mut shell = InterfaceRoot::new(1);
        let action = shell.dispatch(shell.back_button(), NodeEvent::MouseRelease { x: 0, y: 0 });
        assert_eq!(action, Some(ShellAction::PreviousPage));
    }

    #[test]
    fn forward_button_release_yields_next_page() {
        let mut shell = InterfaceRoot::new(1);
        let action = shell.dispatch(shell.forward_button(), NodeEvent::MouseRelease { x: 0, y: 0 });
        assert_eq!(action, Some(ShellAction::NextPage));
    }

    #[test]
    fn address_bar_enter_yields_open_url_with_its_contents() {
        let mut shell = InterfaceRoot::new(1);
        shell.set_address("http://h.com/");
        let action = shell.dispatch(shell.address_bar(), NodeEvent::KeyPress(Key::Enter));
        assert_eq!(action, Some(ShellAction::OpenUrl("http://h.com/".to_string())));
    }

    #[test]
    fn scrollbar_release_commits_scroll_position() {
        let mut shell = InterfaceRoot::new(1);
        let bar = shell.scrollbar();
        shell.configure_scrollbar(100, 20, 200);
        shell.dispatch(bar, NodeEvent::MouseClick { x: 0, y: 10 });
        let action = shell.dispatch(bar, NodeEvent::MouseRelease { x: 0, y: 10 });
        assert!(matches!(action, Some(ShellAction::ScrollTo(_))));
    }

    #[test]
    fn set_title_updates_the_text_payload() {
        let mut shell = InterfaceRoot::new(1);
        shell.set_title("Example Page");
        match &shell.tree().get(shell.title).payload {
            microweb_nodes::NodePayload::Text(t) => assert_eq!(t.text, "Example Page"),
            _ => panic!("expected text payload"),
        }
    }
}
