/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The bounded parse-section stack (§4.4): controls where text goes while
//! the tokenizer is inside `<head>`, `<title>`, `<script>` or `<style>`.

/// Caps the section stack the way the rest of this engine bounds every
/// stack-shaped resource rather than growing unboundedly on malformed
/// nesting.
const MAX_DEPTH: usize = 64;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Section {
    Document,
    Head,
    Body,
    Script,
    Style,
    Title,
}

pub struct SectionStack {
    stack: Vec<Section>,
}

impl SectionStack {
    pub fn new() -> Self {
        SectionStack { stack: vec![Section::Document] }
    }

    pub fn current(&self) -> Section {
        *self.stack.last().unwrap_or(&Section::Document)
    }

    pub fn push(&mut self, section: Section) {
        if self.stack.len() < MAX_DEPTH {
            self.stack.push(section);
        }
    }

    /// A close tag for `section`: pops `section` itself and everything
    /// nested above it (an unclosed `<title>` inside `<head>` is simply
    /// discarded when `</head>` arrives), leaving the enclosing section
    /// current. Does nothing if `section` isn't on the stack — an
    /// unmatched close tag is simply ignored, matching §7's "malformed
    /// markup is never fatal" posture.
    pub fn pop_to(&mut self, section: Section) {
        if let Some(pos) = self.stack.iter().rposition(|s| *s == section) {
            self.stack.truncate(pos);
        }
    }

    /// Body text is only routed to the document tree while in `Body`
    /// (§4.4): title text updates the page title, script/style text is
    /// discarded, and `Head`/`Document` text (stray whitespace between
    /// tags) is discarded too.
    pub fn routes_text_to_document(&self) -> bool {
        self.current() == Section::Body
    }
}

impl Default for SectionStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_to_closes_the_section_and_everything_nested_above_it() {
        let mut s = SectionStack::new();
        s.push(Section::Head);
        s.push(Section::Title);
        s.pop_to(Section::Head);
        assert_eq!(s.current(), Section::Document);
    }

    #[test]
    fn unmatched_close_is_a_no_op() {
        let mut s = SectionStack::new();
        s.push(Section::Body);
        s.pop_to(Section::Title);
        assert_eq!(s.current(), Section::Body);
    }

    #[test]
    fn only_body_routes_text_to_document() {
        let mut s = SectionStack::new();
        assert!(!s.routes_text_to_document());
        s.push(Section::Body);
        assert!(s.routes_text_to_document());
    }
}
