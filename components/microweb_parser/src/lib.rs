/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The streaming markup parser (§4.4): decodes bytes, tokenizes them, and
//! builds a `microweb_nodes::NodeTree` incrementally as chunks arrive. A
//! `Parser` never blocks on incomplete input — partial tags, entities and
//! multi-byte sequences are retained across `feed` calls.

mod attrs;
mod encoding;
mod entities;
mod section;
mod tags;
mod tokenizer;

pub use encoding::TextEncoding;
pub use tokenizer::{Token, TEXT_BUFFER_CAP};

use encoding::StreamDecoder;
use microweb_nodes::{NodeId, NodeTree};
use microweb_style::ElementStyle;
use section::{Section, SectionStack};
use tags::Frame;
use tokenizer::Tokenizer;

pub struct Parser {
    decoder: StreamDecoder,
    tokenizer: Tokenizer,
    tree: NodeTree,
    root: NodeId,
    stack: Vec<Frame>,
    section: SectionStack,
    title: String,
}

impl Parser {
    /// Starts a new page: a fresh arena-backed tree with a single
    /// `Section` root, ready to receive bytes via [`feed`](Self::feed).
    pub fn new(initial_encoding: TextEncoding, text_color: u8) -> Self {
        let mut tree = NodeTree::new();
        let root_style = tree.intern_style(ElementStyle::root(text_color));
        let root = tree
            .add_section(None, root_style, "Document")
            .expect("an empty arena always has room for its first node");
        tree.set_root(root);
        Parser {
            decoder: StreamDecoder::new(initial_encoding),
            tokenizer: Tokenizer::new(),
            tree,
            root,
            stack: Vec::new(),
            section: SectionStack::new(),
            title: String::new(),
        }
    }

    /// Bounds total tree memory, mirroring [`NodeTree::with_max_chunks`]
    /// for constrained targets (§7: arena overflow is best-effort, not
    /// fatal).
    pub fn with_max_chunks(initial_encoding: TextEncoding, text_color: u8, max_chunks: usize) -> Self {
        let mut tree = NodeTree::with_max_chunks(max_chunks);
        let root_style = tree.intern_style(ElementStyle::root(text_color));
        let root = tree
            .add_section(None, root_style, "Document")
            .expect("an empty arena always has room for its first node");
        tree.set_root(root);
        Parser {
            decoder: StreamDecoder::new(initial_encoding),
            tokenizer: Tokenizer::new(),
            tree,
            root,
            stack: Vec::new(),
            section: SectionStack::new(),
            title: String::new(),
        }
    }

    /// Feeds one chunk of raw bytes through decode → tokenize → build.
    /// Safe to call repeatedly with arbitrarily-sized chunks, including
    /// chunks that split a multi-byte character, a tag, or an entity.
    pub fn feed(&mut self, bytes: &[u8]) {
        let text = self.decoder.decode_chunk(bytes);
        // The tokenizer can't be fed via a closure that also borrows
        // `self` mutably while still living in `self`, so it's swapped out
        // for the duration of the call and put back afterwards.
        let mut tokenizer = std::mem::take(&mut self.tokenizer);
        tokenizer.feed(&text, |token| self.handle_token(token));
        self.tokenizer = tokenizer;
    }

    fn handle_token(&mut self, token: Token) {
        match token {
            Token::Text(text) => match self.section.current() {
                Section::Title => self.title.push_str(&text),
                Section::Body => self.append_text(&text),
                _ => {}
            },
            Token::Tag { name, closing, attrs } => {
                if closing {
                    self.dispatch_close_tag(&name);
                } else {
                    self.dispatch_open_tag(&name, &attrs);
                }
            }
        }
    }

    fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let parent = self.current_parent();
        let style = self.style_for_new_child(parent);
        let id = self.tree.add_text(parent, style, text);
        self.restyle(parent, id);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut NodeTree {
        &mut self.tree
    }

    /// Consumes the parser, handing the finished tree to the layout
    /// engine and renderer.
    pub fn into_tree(self) -> NodeTree {
        self.tree
    }

    pub fn overflowed(&self) -> bool {
        self.tree.overflowed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use microweb_nodes::{NodeKind, NodePayload};

    fn parse(html: &str) -> Parser {
        let mut parser = Parser::new(TextEncoding::Utf8, 1);
        parser.feed(html.as_bytes());
        parser
    }

    #[test]
    fn title_text_is_captured_separately_from_body() {
        let parser = parse("<html><head><title>Hello</title></head><body>World</body></html>");
        assert_eq!(parser.title(), "Hello");
        let root_children = parser.tree().children(parser.root());
        let texts: Vec<&str> = root_children
            .iter()
            .filter_map(|id| match &parser.tree().get(*id).payload {
                NodePayload::Text(t) => Some(t.text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["World"]);
    }

    #[test]
    fn script_and_style_text_never_reach_the_tree() {
        let parser = parse("<body><script>alert('x')</script>visible<style>.a{}</style></body>");
        let texts: Vec<String> = parser
            .tree()
            .children(parser.root())
            .iter()
            .filter_map(|id| match &parser.tree().get(*id).payload {
                NodePayload::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["visible".to_string()]);
    }

    #[test]
    fn link_node_is_created_with_href_and_underline_style() {
        let parser = parse("<body><a href=\"http://example.com\">go</a></body>");
        let root_children = parser.tree().children(parser.root());
        let link = root_children
            .iter()
            .copied()
            .find(|id| parser.tree().get(*id).kind == NodeKind::Link)
            .expect("link node present");
        match &parser.tree().get(link).payload {
            NodePayload::Link(l) => assert_eq!(l.href, "http://example.com"),
            _ => panic!("expected link payload"),
        }
        let style = parser.tree().style_of(link);
        assert!(style.font_style.contains(microweb_style::FontStyle::UNDERLINE));
    }

    #[test]
    fn meta_charset_switches_decoder_encoding() {
        let mut parser = Parser::new(TextEncoding::Utf8, 1);
        parser.feed(b"<head><meta charset=\"iso-8859-2\"></head><body>");
        assert_eq!(parser.decoder.encoding(), TextEncoding::Iso8859_2);
    }

    #[test]
    fn form_collects_text_field_and_checkbox() {
        let parser = parse(
            "<body><form action=\"/submit\"><input type=\"text\" name=\"q\" value=\"hi\"><input type=\"checkbox\" name=\"ok\" checked></form></body>",
        );
        let form = parser
            .tree()
            .children(parser.root())
            .into_iter()
            .find(|id| parser.tree().get(*id).kind == NodeKind::Form)
            .expect("form present");
        let query = microweb_nodes::collect_form_query(parser.tree(), form);
        assert!(query.contains("q=hi"));
    }

    #[test]
    fn feed_can_split_a_tag_across_two_calls() {
        let mut parser = Parser::new(TextEncoding::Utf8, 1);
        parser.feed(b"<body>one <b>tw");
        parser.feed(b"o</b> three</body>");
        let texts: Vec<String> = collect_all_text(&parser);
        assert_eq!(texts.join(""), "one two three");
    }

    fn collect_all_text(parser: &Parser) -> Vec<String> {
        fn walk(tree: &NodeTree, id: NodeId, out: &mut Vec<String>) {
            if let NodePayload::Text(t) = &tree.get(id).payload {
                out.push(t.text.clone());
            }
            for child in tree.children(id) {
                walk(tree, child, out);
            }
        }
        let mut out = Vec::new();
        walk(parser.tree(), parser.root(), &mut out);
        out
    }
}
