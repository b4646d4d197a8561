/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The character-level state machine (§4.4): `ParseText`, `ParsePossibleTag`,
//! `ParseTag`, `ParseAmpersandEscape`, `ParseComment`. Consumes one already
//! Unicode-decoded `char` at a time and emits [`Token`]s; never blocks, and
//! keeps any half-finished tag/entity/comment in `self` across calls.

use crate::entities;

/// Caps the internal text accumulator, matching the bounded buffer size
/// called out in §4.4 so a pathological run of text without a tag or
/// entity still flushes periodically instead of growing unbounded.
pub const TEXT_BUFFER_CAP: usize = 2560;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum State {
    Text,
    PossibleTag,
    Tag,
    AmpersandEscape,
    Comment,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Token {
    /// Accumulated body text, whitespace already collapsed.
    Text(String),
    /// A complete `<tag attrs>` or `</tag>`.
    Tag { name: String, closing: bool, attrs: String },
}

/// Streaming tokenizer. Owns all partial-parse state so `feed` can be
/// called repeatedly with arbitrary chunk boundaries.
pub struct Tokenizer {
    state: State,
    text_buf: String,
    tag_buf: String,
    entity_buf: String,
    comment_tail: String,
    preformatted: u32,
    last_was_space: bool,
}

impl Tokenizer {
    pub fn new() -> Self {
        Tokenizer {
            state: State::Text,
            text_buf: String::new(),
            tag_buf: String::new(),
            entity_buf: String::new(),
            comment_tail: String::new(),
            preformatted: 0,
            last_was_space: true,
        }
    }

    pub fn enter_preformatted(&mut self) {
        self.preformatted += 1;
    }

    pub fn leave_preformatted(&mut self) {
        self.preformatted = self.preformatted.saturating_sub(1);
    }

    pub fn is_preformatted(&self) -> bool {
        self.preformatted > 0
    }

    /// Feeds `text` (already decoded to Unicode and ASCII-folded by
    /// [`crate::encoding::StreamDecoder`]) through the state machine,
    /// calling `emit` for every token produced. Any partial tag, entity or
    /// comment tail is retained in `self` for the next call.
    /// Any text accumulated while processing `text` is flushed before
    /// returning — only a half-finished tag, entity or comment survives
    /// into the next `feed` call. That keeps plain text from silently
    /// sitting unflushed forever in a stream that never sends another tag.
    pub fn feed(&mut self, text: &str, mut emit: impl FnMut(Token)) {
        for ch in text.chars() {
            self.feed_char(ch, &mut emit);
        }
        if self.state == State::Text {
            self.flush_text(&mut emit);
        }
    }

    fn feed_char(&mut self, ch: char, emit: &mut impl FnMut(Token)) {
        match self.state {
            State::Text => self.feed_text(ch, emit),
            State::PossibleTag => self.feed_possible_tag(ch, emit),
            State::Tag => self.feed_tag(ch, emit),
            State::AmpersandEscape => self.feed_entity(ch, emit),
            State::Comment => self.feed_comment(ch),
        }
    }

    fn feed_text(&mut self, ch: char, emit: &mut impl FnMut(Token)) {
        match ch {
            '<' => {
                self.state = State::PossibleTag;
            }
            '&' => {
                self.state = State::AmpersandEscape;
                self.entity_buf.clear();
            }
            '\n' if self.preformatted > 0 => {
                self.text_buf.push('\n');
                self.last_was_space = true;
            }
            c if c.is_whitespace() => {
                if self.preformatted > 0 {
                    self.text_buf.push(' ');
                } else if !self.last_was_space {
                    self.text_buf.push(' ');
                    self.last_was_space = true;
                }
            }
            c => {
                self.text_buf.push(c);
                self.last_was_space = false;
                if self.text_buf.len() >= TEXT_BUFFER_CAP {
                    self.flush_text(emit);
                }
            }
        }
    }

    fn flush_text(&mut self, emit: &mut impl FnMut(Token)) {
        if !self.text_buf.is_empty() {
            emit(Token::Text(std::mem::take(&mut self.text_buf)));
        }
    }

    fn feed_possible_tag(&mut self, ch: char, emit: &mut impl FnMut(Token)) {
        if ch.is_ascii_alphabetic() || ch == '/' || ch == '!' {
            self.tag_buf.clear();
            self.tag_buf.push(ch);
            self.state = State::Tag;
        } else {
            // Not actually a tag start: put the '<' back as literal text.
            self.text_buf.push('<');
            self.last_was_space = false;
            self.state = State::Text;
            self.feed_text(ch, emit);
        }
    }

    fn feed_tag(&mut self, ch: char, emit: &mut impl FnMut(Token)) {
        if ch == '>' {
            self.finish_tag(emit);
            return;
        }
        self.tag_buf.push(ch);
        if self.tag_buf == "!--" {
            self.state = State::Comment;
            self.comment_tail.clear();
            self.tag_buf.clear();
        }
    }

    fn finish_tag(&mut self, emit: &mut impl FnMut(Token)) {
        let raw = std::mem::take(&mut self.tag_buf);
        self.state = State::Text;
        let closing = raw.starts_with('/');
        let rest = if closing { &raw[1..] } else { raw.as_str() };
        let split = rest.find(|c: char| c.is_whitespace()).unwrap_or(rest.len());
        let name = rest[..split].to_ascii_lowercase();
        let attrs = rest[split..].trim_start().to_string();
        if name.is_empty() {
            return;
        }
        self.flush_text(emit);
        emit(Token::Tag { name, closing, attrs });
    }

    fn feed_entity(&mut self, ch: char, emit: &mut impl FnMut(Token)) {
        if ch == ';' || ch.is_whitespace() {
            let consumed_semicolon = ch == ';';
            let name = std::mem::take(&mut self.entity_buf);
            self.state = State::Text;
            match entities::lookup(&name) {
                Some(replacement) => {
                    self.text_buf.push(replacement);
                    self.last_was_space = false;
                }
                None => {
                    self.text_buf.push('&');
                    self.text_buf.push_str(&name);
                    if consumed_semicolon {
                        self.text_buf.push(';');
                    }
                    self.last_was_space = false;
                }
            }
            if !consumed_semicolon {
                self.feed_text(ch, emit);
            }
        } else {
            self.entity_buf.push(ch);
        }
    }

    /// `comment_tail` only ever needs to remember the last three
    /// characters seen, enough to detect `-->` arriving one char at a time
    /// without accumulating the whole (possibly huge) comment body.
    fn feed_comment(&mut self, ch: char) {
        self.comment_tail.push(ch);
        let len = self.comment_tail.chars().count();
        if len > 3 {
            let drop = len - 3;
            let byte_drop = self.comment_tail.chars().take(drop).map(char::len_utf8).sum();
            self.comment_tail.drain(..byte_drop);
        }
        if self.comment_tail == "-->" {
            self.state = State::Text;
            self.comment_tail.clear();
        }
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> Vec<Token> {
        let mut tok = Tokenizer::new();
        let mut out = Vec::new();
        tok.feed(input, |t| out.push(t));
        out
    }

    #[test]
    fn collapses_whitespace_runs() {
        let tokens = run("hello   world\n\tagain");
        assert_eq!(tokens, vec![Token::Text("hello world again".to_string())]);
    }

    #[test]
    fn parses_open_and_close_tags() {
        let tokens = run("<p class=\"x\">hi</p>");
        assert_eq!(
            tokens,
            vec![
                Token::Tag { name: "p".to_string(), closing: false, attrs: "class=\"x\"".to_string() },
                Token::Text("hi".to_string()),
                Token::Tag { name: "p".to_string(), closing: true, attrs: String::new() },
            ]
        );
    }

    #[test]
    fn resolves_known_entity() {
        let tokens = run("Tom &amp; Jerry");
        assert_eq!(tokens, vec![Token::Text("Tom & Jerry".to_string())]);
    }

    #[test]
    fn unknown_entity_emitted_raw() {
        let tokens = run("a &bogus; b");
        assert_eq!(tokens, vec![Token::Text("a &bogus; b".to_string())]);
    }

    #[test]
    fn comment_is_discarded() {
        let tokens = run("a<!-- comment with <tags> inside -->b");
        assert_eq!(tokens, vec![Token::Text("ab".to_string())]);
    }

    #[test]
    fn non_alpha_after_lt_falls_back_to_text() {
        let tokens = run("1 < 2");
        assert_eq!(tokens, vec![Token::Text("1 < 2".to_string())]);
    }

    #[test]
    fn feed_can_resume_a_tag_split_across_calls() {
        let mut tok = Tokenizer::new();
        let mut out = Vec::new();
        tok.feed("<p cla", |t| out.push(t));
        tok.feed("ss=\"x\">hi", |t| out.push(t));
        assert_eq!(
            out,
            vec![
                Token::Tag { name: "p".to_string(), closing: false, attrs: "class=\"x\"".to_string() },
                Token::Text("hi".to_string()),
            ]
        );
    }

    #[test]
    fn preformatted_newline_forces_break() {
        let mut tok = Tokenizer::new();
        tok.enter_preformatted();
        let tokens_out = {
            let mut out = Vec::new();
            tok.feed("a\nb", |t| out.push(t));
            out
        };
        assert_eq!(tokens_out, vec![Token::Text("a\nb".to_string())]);
    }
}
