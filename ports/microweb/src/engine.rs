/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The cooperative engine context (§5): owns every piece of mutable state
//! a run touches and drives the single-threaded tick order — platform
//! update, parser feed, layout advance, paint, UI update — with no
//! globals, matching the "the node tree, arena, and renderer dirty set
//! are all owned by the application" shared-resource policy.

use std::io::Write;

use microweb_assets::AssetPack;
use microweb_draw::{ColorScheme, DrawContext};
use microweb_geometry::Rect;
use microweb_layout::{LayoutEngine, LayoutOutcome};
use microweb_mem::PageMemory;
use microweb_net::{LoadCoordinator, NetworkDriver};
use microweb_nodes::{ImageState, Key, NodeAction, NodeEvent, NodeId, NodePayload};
use microweb_parser::{Parser, TextEncoding};
use microweb_render::{PageRenderer, ScrollOutcome};
use microweb_shell::{InterfaceRoot, ShellAction};

use crate::input::{InputDriver, KeyCode, MouseButtons};
use crate::opts::Opts;
use crate::video::VideoDriver;

const NETWORK_CHUNK: usize = 4096;

/// Height in device pixels of the fixed interface-root strip (title, back
/// and forward buttons, address bar, scrollbar, status bar) painted above
/// the document root (§4.7).
const SHELL_HEIGHT: i32 = 28;

/// Which of the two independent node trees (§3: "two independent roots")
/// a focused or mouse-captured node belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FocusTarget {
    Shell(NodeId),
    Document(NodeId),
}

/// One iteration's report back to the caller's run loop.
pub struct TickReport {
    /// The page load task still has bytes to deliver, or layout/parsing
    /// hasn't caught up with what's already arrived.
    pub loading: bool,
    /// Set once, the tick a fatal load error or a clean finish occurs.
    pub status: Option<String>,
}

pub struct Engine<D: NetworkDriver> {
    opts: Opts,
    assets: AssetPack,
    colors: ColorScheme,
    memory: PageMemory,
    coordinator: LoadCoordinator<D>,
    parser: Option<Parser>,
    layout: LayoutEngine,
    layout_started: bool,
    renderer: PageRenderer,
    shell: InterfaceRoot,
    window_width: i32,
    window_height: i32,
    pending_image: Option<NodeId>,
    focus: Option<FocusTarget>,
    mouse_down: bool,
    mouse_capture: Option<FocusTarget>,
    /// A `ScrollOutcome::Band` blit to perform on the next `paint` call
    /// (device-space `top`, `bottom`, `delta`): `scroll_screen` needs a
    /// `DrawContext`, which only exists during `paint`, not during the
    /// input-processing phase that decides a scroll happened.
    pending_scroll: Option<(i32, i32, i32)>,
}

impl<D: NetworkDriver> Engine<D> {
    pub fn new(opts: Opts, assets: AssetPack, colors: ColorScheme, window_width: i32, window_height: i32, page_driver: D, content_driver: D) -> Self {
        let mut memory = PageMemory::new();
        if !opts.no_ems {
            memory.blocks.enable_expanded_memory();
        }
        if opts.use_swap {
            if let Err(e) = memory.blocks.enable_swap(std::path::PathBuf::from("microweb.swp"), 1024 * 1024) {
                log::warn!("failed to enable disk swap: {e}");
            }
        }
        Engine {
            opts,
            assets,
            colors,
            memory,
            coordinator: LoadCoordinator::new(page_driver, content_driver),
            parser: None,
            layout: LayoutEngine::new(window_width),
            layout_started: false,
            renderer: PageRenderer::new(),
            shell: InterfaceRoot::new(colors.text.0),
            window_width,
            window_height,
            pending_image: None,
            focus: None,
            mouse_down: false,
            mouse_capture: None,
            pending_scroll: None,
        }
    }

    pub fn shell(&self) -> &InterfaceRoot {
        &self.shell
    }

    pub fn renderer(&self) -> &PageRenderer {
        &self.renderer
    }

    /// §5's cancellation sequence for a user-initiated `OpenURL`: stop
    /// both load tasks, reset the arena (by starting a fresh `Parser`,
    /// which owns its own tree/arena), reset the renderer's dirty set,
    /// zero the scroll position, and begin a fresh parse.
    pub fn open_url(&mut self, raw: &str) {
        self.coordinator.open_url(raw);
        self.memory.blocks.reset();
        self.parser = Some(Parser::new(TextEncoding::Utf8, self.colors.text.0));
        self.layout = LayoutEngine::new(self.window_width);
        self.layout_started = false;
        self.pending_image = None;
        self.renderer.reset();
        self.clear_document_focus();
        self.pending_scroll = None;
        self.shell.history.push(raw);
        self.shell.set_address(raw);
        self.shell.set_status("Loading...");
    }

    /// One full tick: platform update, parser feed, layout advance,
    /// paint (left to the caller, which owns the surface), UI update.
    pub fn tick<I: InputDriver>(&mut self, input: &mut I) -> TickReport {
        self.poll_input(input);
        let mut status = None;

        if self.opts.no_images {
            self.skip_pending_images();
        } else {
            self.pump_image_load();
        }

        let fed = self.pump_page_load();
        if let Some(task_error) = self.coordinator.page.error() {
            status = Some(format!("Error: {task_error}"));
            self.shell.set_status(task_error.to_string());
        }

        self.advance_layout();

        if self.layout_started && self.layout.is_complete() && !self.coordinator.page.has_content() && self.coordinator.page.error().is_none() {
            if let Some(parser) = &self.parser {
                if parser.tree().overflowed() {
                    self.shell.set_status("Page truncated: out of memory");
                }
            }
            self.shell.set_address(self.coordinator.page.url().map(|u| u.as_str()).unwrap_or_default());
            if status.is_none() {
                status = Some("Done".to_string());
                self.shell.set_status("Done");
            }
        }

        let loading = fed || self.coordinator.page.has_content() || !self.layout.is_complete();
        TickReport { loading, status }
    }

    /// Tracks the left button's press/hold/release edges across ticks
    /// (§4.6: a driver only reports current state, so presses and
    /// releases have to be derived here) and the non-blocking key queue.
    /// Picks the interface root first, then the document root (§4.6:
    /// "first tests the interface root, then the document root"), and
    /// keeps whatever node a press landed on as the drag/release target
    /// even if the pointer later leaves its box.
    fn poll_input<I: InputDriver>(&mut self, input: &mut I) {
        let mouse = input.poll_mouse();
        let down = mouse.buttons.contains(MouseButtons::LEFT);
        if down && !self.mouse_down {
            match self.pick_target(mouse.x, mouse.y) {
                Some(target) => {
                    self.set_focus(target);
                    self.mouse_capture = Some(target);
                    let (x, y) = self.event_xy(target, mouse.x, mouse.y);
                    self.dispatch_event(target, NodeEvent::MouseClick { x, y });
                }
                None => self.clear_focus(),
            }
        } else if down {
            if let Some(target) = self.mouse_capture {
                let (x, y) = self.event_xy(target, mouse.x, mouse.y);
                self.dispatch_event(target, NodeEvent::MouseDrag { x, y });
            }
        } else if self.mouse_down {
            if let Some(target) = self.mouse_capture.take() {
                let (x, y) = self.event_xy(target, mouse.x, mouse.y);
                self.dispatch_event(target, NodeEvent::MouseRelease { x, y });
            }
        }
        self.mouse_down = down;

        if let Some(code) = input.get_key() {
            if let Some(key) = map_key(code) {
                if let Some(target) = self.focus {
                    self.dispatch_event(target, NodeEvent::KeyPress(key));
                }
            }
        }
    }

    /// Screen-space `(x, y)` to page-local: `0` for the interface root
    /// (which occupies screen space 1:1), `-doc_origin_y()` for the
    /// document root (it's scrolled and offset below the shell strip).
    fn event_xy(&self, target: FocusTarget, x: i32, y: i32) -> (i32, i32) {
        match target {
            FocusTarget::Shell(_) => (x, y),
            FocusTarget::Document(_) => (x, y - self.doc_origin_y()),
        }
    }

    /// Hit-tests the interface root first, then the document root. A
    /// document pick that lands on a link's rendered text or image (the
    /// innermost visual descendant `pick` prefers) is bubbled up to the
    /// enclosing `Link`, the node that actually owns the click handler.
    fn pick_target(&self, x: i32, y: i32) -> Option<FocusTarget> {
        if let Some(node) = self.shell.pick(x, y) {
            return Some(FocusTarget::Shell(node));
        }
        let parser = self.parser.as_ref()?;
        let node = self.renderer.pick(parser.tree(), parser.root(), x, y, self.doc_origin_y())?;
        let node = microweb_nodes::enclosing_link(parser.tree(), node).unwrap_or(node);
        Some(FocusTarget::Document(node))
    }

    fn dispatch_event(&mut self, target: FocusTarget, event: NodeEvent) {
        match target {
            FocusTarget::Shell(node) => {
                if let Some(action) = self.shell.dispatch(node, event) {
                    self.apply_shell_action(action);
                }
            }
            FocusTarget::Document(node) => {
                let action = match &mut self.parser {
                    Some(parser) => microweb_nodes::handle_event(parser.tree_mut(), node, event).1,
                    None => None,
                };
                if let Some(action) = action {
                    self.apply_document_action(action);
                }
            }
        }
    }

    fn set_focus(&mut self, target: FocusTarget) {
        if self.focus == Some(target) {
            return;
        }
        self.clear_focus();
        self.focus = Some(target);
        self.dispatch_event(target, NodeEvent::Focus);
    }

    fn clear_focus(&mut self) {
        if let Some(old) = self.focus.take() {
            self.dispatch_event(old, NodeEvent::Unfocus);
        }
    }

    /// Drops any focus/mouse-capture pointing into the document tree
    /// without dispatching `Unfocus` — called when `self.parser` is about
    /// to be replaced (§5's cancellation sequence), since the `NodeId`s it
    /// holds belong to the arena that's being thrown away. Shell-side
    /// focus (e.g. the address bar, mid-navigation) is left alone.
    fn clear_document_focus(&mut self) {
        if matches!(self.focus, Some(FocusTarget::Document(_))) {
            self.focus = None;
        }
        if matches!(self.mouse_capture, Some(FocusTarget::Document(_))) {
            self.mouse_capture = None;
        }
    }

    fn apply_document_action(&mut self, action: NodeAction) {
        match action {
            NodeAction::Navigate { url } => self.navigate_resolved(&url),
            NodeAction::SetStatus(msg) => self.shell.set_hover(msg),
            NodeAction::RequestFormSubmit { form } => self.submit_form(form),
            NodeAction::ScrollTo(_) => {}
        }
    }

    /// Resolves `href` against the currently loaded page before navigating
    /// (§8 scenarios 2-3: a relative link or form action navigates
    /// relative to the page that held it, not as a bare string).
    fn navigate_resolved(&mut self, href: &str) {
        let resolved = self
            .coordinator
            .page
            .url()
            .and_then(|base| base.resolve(href).ok())
            .map(|u| u.as_str().to_string())
            .unwrap_or_else(|| href.to_string());
        self.open_url(&resolved);
    }

    fn submit_form(&mut self, form: NodeId) {
        let target = match &self.parser {
            Some(parser) => {
                let tree = parser.tree();
                let action = match &tree.get(form).payload {
                    NodePayload::Form(f) => f.action.clone(),
                    _ => return,
                };
                let query = microweb_nodes::collect_form_query(tree, form);
                if query.is_empty() {
                    action
                } else {
                    format!("{action}?{query}")
                }
            }
            None => return,
        };
        self.navigate_resolved(&target);
    }

    fn apply_shell_action(&mut self, action: ShellAction) {
        match action {
            ShellAction::OpenUrl(url) => self.open_url(&url),
            ShellAction::PreviousPage => {
                if let Some(url) = self.shell.history.go_back().map(str::to_string) {
                    self.navigate_without_history(&url);
                }
            }
            ShellAction::NextPage => {
                if let Some(url) = self.shell.history.go_forward().map(str::to_string) {
                    self.navigate_without_history(&url);
                }
            }
            ShellAction::ScrollTo(pos) => {
                let outcome = self.renderer.set_scroll(pos, self.window_width, self.doc_height());
                if let ScrollOutcome::Band { delta, .. } = outcome {
                    self.pending_scroll = Some((SHELL_HEIGHT, self.window_height, delta));
                }
            }
            ShellAction::SetStatus(msg) => self.shell.set_hover(msg),
        }
    }

    /// Re-navigates to a history entry without pushing a fresh entry.
    fn navigate_without_history(&mut self, raw: &str) {
        self.coordinator.open_url(raw);
        self.memory.blocks.reset();
        self.parser = Some(Parser::new(TextEncoding::Utf8, self.colors.text.0));
        self.layout = LayoutEngine::new(self.window_width);
        self.layout_started = false;
        self.pending_image = None;
        self.renderer.reset();
        self.clear_document_focus();
        self.pending_scroll = None;
        self.shell.set_address(raw);
        self.shell.set_status("Loading...");
    }

    /// Reads whatever bytes are ready from the page load task into the
    /// parser. Returns `true` if any bytes were fed this tick.
    fn pump_page_load(&mut self) -> bool {
        let Some(parser) = &mut self.parser else { return false };
        if !self.coordinator.page.has_content() {
            return false;
        }
        let mut buf = [0u8; NETWORK_CHUNK];
        let n = self.coordinator.page.get_content(&mut buf);
        if n == 0 {
            return false;
        }
        if self.opts.dump_page {
            Self::append_dump(&buf[..n]);
        }
        parser.feed(&buf[..n]);
        true
    }

    fn append_dump(bytes: &[u8]) {
        if let Ok(mut f) = std::fs::OpenOptions::new().create(true).append(true).open("dump.htm") {
            let _ = f.write_all(bytes);
        }
    }

    fn advance_layout(&mut self) {
        let Some(parser) = &mut self.parser else { return };
        if !self.layout_started {
            self.layout.begin(parser.root());
            self.layout_started = true;
        }
        match self.layout.advance(parser.tree_mut(), &self.assets) {
            LayoutOutcome::Complete => {
                self.renderer.mark_all_dirty();
            }
            LayoutOutcome::Suspended(node) => {
                self.pending_image = Some(node);
            }
        }
    }

    /// Starts (or continues) the content load task for a suspended
    /// image. No real image-format decoder exists in this workspace
    /// (§1: decoders beyond the node-tree interface are out of scope),
    /// so every image completes its dimension wait as `ErrorDownloading`
    /// and the layout engine places its placeholder box (§7: "Image
    /// decode error ... placeholder icon painted").
    fn pump_image_load(&mut self) {
        let Some(node) = self.pending_image else { return };
        let Some(parser) = &mut self.parser else { return };
        let src = match &parser.tree().get(node).payload {
            NodePayload::Image(img) => img.src.clone(),
            _ => {
                self.pending_image = None;
                return;
            }
        };
        if self.coordinator.content.url().map(|u| u.as_str()) != Some(src.as_str()) {
            self.coordinator.content.load(&src);
        }
        if self.coordinator.content.has_content() {
            let mut sink = [0u8; NETWORK_CHUNK];
            while self.coordinator.content.get_content(&mut sink) > 0 {}
        }
        if self.coordinator.content.error().is_some() || !self.coordinator.content.has_content() {
            if let NodePayload::Image(img) = &mut parser.tree_mut().get_mut(node).payload {
                img.state = microweb_nodes::ImageStateSlot(ImageState::ErrorDownloading);
            }
            self.pending_image = None;
        }
    }

    fn skip_pending_images(&mut self) {
        let Some(node) = self.pending_image else { return };
        let Some(parser) = &mut self.parser else { return };
        if let NodePayload::Image(img) = &mut parser.tree_mut().get_mut(node).payload {
            img.state = microweb_nodes::ImageStateSlot(ImageState::ErrorDownloading);
        }
        self.pending_image = None;
    }

    /// `origin_y` to pass into the document `PageRenderer` for both paint
    /// and pick: the document window starts `SHELL_HEIGHT` device pixels
    /// down and is scrolled by `scroll_y` page pixels, so a page-local y
    /// lands on screen at `y + SHELL_HEIGHT - scroll_y`.
    fn doc_origin_y(&self) -> i32 {
        SHELL_HEIGHT - self.renderer.scroll_y()
    }

    fn doc_height(&self) -> i32 {
        self.window_height - SHELL_HEIGHT
    }

    /// Paints the document root (scrolled) and the interface root (fixed)
    /// into `ctx`, per §4.6's "renders the interface root (title, buttons,
    /// address bar, scrollbar, status bar) and the document root" split.
    /// Performs any scroll bit-blit left pending by `apply_shell_action`
    /// first, since `scroll_screen` needs the `DrawContext` this call
    /// supplies and `apply_shell_action` doesn't have one.
    pub fn paint(&mut self, ctx: &mut DrawContext<'_>) {
        if let Some((top, bottom, delta)) = self.pending_scroll.take() {
            ctx.scroll_screen(top, bottom, delta);
            self.renderer.mark_all_dirty();
        }

        let shell_window = Rect::new(microweb_geometry::Point::new(0, 0), microweb_geometry::Size::new(self.window_width, SHELL_HEIGHT));
        self.renderer.paint(self.shell.tree(), &self.assets, &self.colors, self.shell.root(), ctx, shell_window, 0);

        if let Some(parser) = &self.parser {
            let doc_window = Rect::new(
                microweb_geometry::Point::new(0, SHELL_HEIGHT),
                microweb_geometry::Size::new(self.window_width, self.doc_height()),
            );
            let origin_y = self.doc_origin_y();
            self.renderer.paint(parser.tree(), &self.assets, &self.colors, parser.root(), ctx, doc_window, origin_y);
        }
    }
}

/// Maps a 16-bit key code (§6: ASCII in the low byte, or an extended
/// scancode in the high byte with the low byte zero) onto a node event
/// key, or `None` for a code nothing here handles.
fn map_key(code: KeyCode) -> Option<Key> {
    let low = (code.0 & 0x00FF) as u8;
    if low != 0 {
        return Some(match low {
            0x08 => Key::Backspace,
            0x0D => Key::Enter,
            0x7F => Key::Delete,
            _ => Key::Char(low as char),
        });
    }
    let high = ((code.0 >> 8) & 0x00FF) as u8;
    match high {
        0x47 => Some(Key::Home),
        0x4F => Some(Key::End),
        0x4B => Some(Key::Left),
        0x4D => Some(Key::Right),
        0x53 => Some(Key::Delete),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{KeyCode, MouseState};
    use microweb_draw::CursorShape;
    use microweb_net::{RequestHandle, RequestState};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockDriver {
        bodies: HashMap<u32, Vec<u8>>,
        next: u32,
    }

    impl NetworkDriver for MockDriver {
        fn create_request(&mut self, url: &microweb_net::PageUrl) -> RequestHandle {
            let id = self.next;
            self.next += 1;
            let body = if url.as_str().contains("page") {
                b"<html><body><p>Hello, world!</p><a href=\"http://h.com/other\">go</a></body></html>".to_vec()
            } else {
                Vec::new()
            };
            self.bodies.insert(id, body);
            RequestHandle(id)
        }
        fn state(&mut self, _handle: RequestHandle) -> RequestState {
            RequestState::Finished
        }
        fn read_data(&mut self, handle: RequestHandle, buf: &mut [u8]) -> usize {
            if let Some(body) = self.bodies.get_mut(&handle.0) {
                let n = body.len().min(buf.len());
                buf[..n].copy_from_slice(&body[..n]);
                body.drain(..n);
                n
            } else {
                0
            }
        }
        fn location(&mut self, _handle: RequestHandle) -> Option<String> {
            None
        }
        fn stop(&mut self, _handle: RequestHandle) {}
    }

    struct IdleInput;
    impl InputDriver for IdleInput {
        fn poll_mouse(&mut self) -> MouseState {
            MouseState { buttons: MouseButtons::empty(), x: 0, y: 0 }
        }
        fn show_cursor(&mut self) {}
        fn hide_cursor(&mut self) {}
        fn set_cursor_shape(&mut self, _shape: CursorShape) {}
        fn get_key(&mut self) -> Option<KeyCode> {
            None
        }
    }

    fn test_engine() -> Engine<MockDriver> {
        let assets = AssetPack::load(&microweb_assets::test_fixture_pack()).unwrap();
        Engine::new(Opts::default(), assets, ColorScheme::monochrome(), 400, 300, MockDriver::default(), MockDriver::default())
    }

    #[test]
    fn open_url_then_ticking_to_completion_parses_and_lays_out_the_page() {
        let mut engine = test_engine();
        engine.open_url("http://h.com/page");
        let mut input = IdleInput;
        for _ in 0..10 {
            let report = engine.tick(&mut input);
            if !report.loading {
                break;
            }
        }
        assert!(engine.layout.is_complete());
        assert!(engine.parser.as_ref().unwrap().tree().get(engine.parser.as_ref().unwrap().root()).size.width >= 0);
    }

    #[test]
    fn open_url_pushes_into_history_and_updates_the_address_bar() {
        let mut engine = test_engine();
        engine.open_url("http://h.com/page");
        assert_eq!(engine.shell().history.current(), Some("http://h.com/page"));
    }

    #[test]
    fn map_key_reads_ascii_low_byte_and_extended_scancode_high_byte() {
        assert_eq!(map_key(KeyCode(0x41)), Some(Key::Char('A')));
        assert_eq!(map_key(KeyCode(0x0D)), Some(Key::Enter));
        assert_eq!(map_key(KeyCode(0x08)), Some(Key::Backspace));
        assert_eq!(map_key(KeyCode(0x4B00)), Some(Key::Left));
        assert_eq!(map_key(KeyCode(0x4F00)), Some(Key::End));
        assert_eq!(map_key(KeyCode(0x0000)), None);
    }

    #[test]
    fn scroll_to_stages_a_pending_band_blit_and_paint_consumes_it() {
        let mut engine = test_engine();
        engine.apply_shell_action(ShellAction::ScrollTo(5));
        assert_eq!(engine.renderer().scroll_y(), 5);
        assert_eq!(engine.pending_scroll, Some((SHELL_HEIGHT, engine.window_height, 5)));

        let mut surface = microweb_draw::Surface8bpp::new(400, 300);
        let mut ctx = DrawContext::new(&mut surface);
        engine.paint(&mut ctx);
        assert!(engine.pending_scroll.is_none());
    }

    #[test]
    fn large_scroll_delta_never_stages_a_band_blit() {
        let mut engine = test_engine();
        engine.apply_shell_action(ShellAction::ScrollTo(10_000));
        assert!(engine.pending_scroll.is_none());
    }

    fn find_link(tree: &microweb_nodes::NodeTree, node: NodeId) -> Option<NodeId> {
        if tree.get(node).kind == microweb_nodes::NodeKind::Link {
            return Some(node);
        }
        tree.children(node).into_iter().find_map(|child| find_link(tree, child))
    }

    struct ScriptedInput {
        mouse: std::collections::VecDeque<MouseState>,
        keys: std::collections::VecDeque<KeyCode>,
    }

    impl InputDriver for ScriptedInput {
        fn poll_mouse(&mut self) -> MouseState {
            self.mouse.pop_front().unwrap_or(MouseState { buttons: MouseButtons::empty(), x: 0, y: 0 })
        }
        fn show_cursor(&mut self) {}
        fn hide_cursor(&mut self) {}
        fn set_cursor_shape(&mut self, _shape: CursorShape) {}
        fn get_key(&mut self) -> Option<KeyCode> {
            self.keys.pop_front()
        }
    }

    fn run_to_idle(engine: &mut Engine<MockDriver>) {
        let mut input = IdleInput;
        for _ in 0..20 {
            if !engine.tick(&mut input).loading {
                break;
            }
        }
    }

    #[test]
    fn clicking_a_laid_out_link_resolves_and_navigates_to_its_href() {
        let mut engine = test_engine();
        engine.open_url("http://h.com/page");
        run_to_idle(&mut engine);

        let (lx, ly) = {
            let parser = engine.parser.as_ref().unwrap();
            let link = find_link(parser.tree(), parser.root()).expect("fixture page has a link");
            let record = parser.tree().get(link);
            (record.anchor.x + 1, record.anchor.y + 1)
        };
        let screen_y = ly + engine.doc_origin_y();
        let mut input = ScriptedInput {
            mouse: [
                MouseState { buttons: MouseButtons::LEFT, x: lx, y: screen_y },
                MouseState { buttons: MouseButtons::empty(), x: lx, y: screen_y },
            ]
            .into(),
            keys: Default::default(),
        };
        engine.tick(&mut input);

        assert_eq!(engine.shell().history.current(), Some("http://h.com/other"));
    }

    #[test]
    fn key_press_reaches_the_focused_document_text_field() {
        let mut engine = test_engine();
        engine.open_url("http://h.com/page");
        run_to_idle(&mut engine);

        let parser = Parser::new(TextEncoding::Utf8, engine.colors.text.0);
        engine.parser = Some(parser);
        let field = {
            let tree = engine.parser.as_mut().unwrap().tree_mut();
            let style = tree.intern_style(microweb_style::ElementStyle::root(1));
            let root = tree.add_section(None, style, "Document").unwrap();
            tree.set_root(root);
            let field = tree.add_text_field(root, style, "q").unwrap();
            tree.get_mut(field).anchor = microweb_geometry::Point::new(0, 0);
            tree.get_mut(field).size = microweb_geometry::Size::new(50, 10);
            if let NodePayload::TextField(f) = &mut tree.get_mut(field).payload {
                f.buffer = "hi".to_string();
                f.cursor = 2;
            }
            field
        };
        engine.set_focus(FocusTarget::Document(field));

        let mut input = ScriptedInput { mouse: Default::default(), keys: [KeyCode(0x08)].into() };
        engine.tick(&mut input);

        let parser = engine.parser.as_ref().unwrap();
        match &parser.tree().get(field).payload {
            NodePayload::TextField(f) => assert_eq!(f.buffer, "h"),
            _ => panic!("expected text field"),
        }
    }
}
