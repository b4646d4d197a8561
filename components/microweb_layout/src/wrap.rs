/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Word-wrap numeric semantics for a Text node (§4.5): cumulative glyph
//! width measured against the font's glyph-width table, Bold adding a
//! one-pixel surcharge per glyph, breaking at the last space/tab that
//! fits, falling back to character granularity when nothing fits on an
//! otherwise-empty line. `\n` (only meaningful inside `<pre>`, since the
//! tokenizer collapses other whitespace) always forces a break.

use microweb_draw::Font;

/// One wrapped line: a `(start, length)` byte-offset slice into the
/// owning Text node's buffer, mirroring `SubTextPayload`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Segment {
    pub start: u32,
    pub length: u32,
}

pub fn glyph_advance(font: &Font, ch: char, bold: bool) -> i32 {
    font.glyph_width(ch) as i32 + if bold { 1 } else { 0 }
}

pub fn measured_width(font: &Font, text: &str, bold: bool) -> i32 {
    text.chars().map(|c| glyph_advance(font, c, bold)).sum()
}

pub fn wrap(text: &str, font: &Font, bold: bool, available_width: i32) -> Vec<Segment> {
    let available_width = available_width.max(1);
    let chars: Vec<char> = text.chars().collect();
    let char_offsets: Vec<usize> = text
        .char_indices()
        .map(|(b, _)| b)
        .chain(std::iter::once(text.len()))
        .collect();
    let n = chars.len();

    let mut segments = Vec::new();
    let mut seg_start = 0usize;
    let mut width = 0i32;
    let mut last_space: Option<usize> = None;
    let mut i = 0usize;

    while i < n {
        let ch = chars[i];
        if ch == '\n' {
            push_segment(&mut segments, &char_offsets, seg_start, i);
            i += 1;
            seg_start = i;
            width = 0;
            last_space = None;
            continue;
        }
        let advance = glyph_advance(font, ch, bold);
        if width + advance > available_width && i > seg_start {
            if let Some(space) = last_space {
                push_segment(&mut segments, &char_offsets, seg_start, space);
                seg_start = space + 1;
                width = chars[seg_start..i].iter().map(|c| glyph_advance(font, *c, bold)).sum();
                last_space = None;
                continue;
            } else {
                push_segment(&mut segments, &char_offsets, seg_start, i);
                seg_start = i;
                width = 0;
                last_space = None;
                continue;
            }
        }
        if ch == ' ' || ch == '\t' {
            last_space = Some(i);
        }
        width += advance;
        i += 1;
    }
    push_segment(&mut segments, &char_offsets, seg_start, n);
    segments
}

fn push_segment(segments: &mut Vec<Segment>, offsets: &[usize], start: usize, end: usize) {
    if end > start {
        segments.push(Segment {
            start: offsets[start] as u32,
            length: (offsets[end] - offsets[start]) as u32,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_font() -> Font {
        let widths = [4u8; microweb_draw::GLYPH_COUNT];
        Font { glyph_width: widths, glyph_height: 8, stride: 8, bitmap: vec![0u8; microweb_draw::GLYPH_COUNT * 8] }
    }

    #[test]
    fn single_short_line_is_one_segment() {
        let font = tiny_font();
        let segments = wrap("hi there", &font, false, 1000);
        assert_eq!(segments, vec![Segment { start: 0, length: 8 }]);
    }

    #[test]
    fn breaks_at_last_fitting_space() {
        let font = tiny_font();
        // each glyph is 4px; "aaaa bbbb" is 9 glyphs * 4 = 36px; force a
        // width that fits "aaaa" (16px) plus the space (4px) but not "b".
        let segments = wrap("aaaa bbbb", &font, false, 20);
        assert_eq!(segments, vec![Segment { start: 0, length: 4 }, Segment { start: 5, length: 4 }]);
    }

    #[test]
    fn breaks_at_character_granularity_when_no_space_fits() {
        let font = tiny_font();
        let segments = wrap("aaaaaaaa", &font, false, 12);
        assert_eq!(segments, vec![Segment { start: 0, length: 3 }, Segment { start: 3, length: 3 }, Segment { start: 6, length: 2 }]);
    }

    #[test]
    fn newline_forces_a_break_regardless_of_width() {
        let font = tiny_font();
        let segments = wrap("a\nbb", &font, false, 1000);
        assert_eq!(segments, vec![Segment { start: 0, length: 1 }, Segment { start: 2, length: 2 }]);
    }

    #[test]
    fn bold_adds_one_pixel_per_glyph() {
        let font = tiny_font();
        // "aa" at 4px/glyph is 8px plain, 10px bold; width 9 fits plain
        // (one segment) but not bold (splits).
        let plain = wrap("aa", &font, false, 9);
        let bold = wrap("aa", &font, true, 9);
        assert_eq!(plain.len(), 1);
        assert_eq!(bold.len(), 2);
    }
}
