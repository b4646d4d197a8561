/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Navigation history (§4.7): "a packed byte buffer of null-terminated
//! URL strings with a moving write pointer; back/forward walk the packed
//! buffer by scanning for nulls. Inserting a new entry truncates
//! anything after the current position."

/// How many bytes the packed buffer is allowed to grow to before the
/// oldest entries are dropped from the front — not named by the spec,
/// which only describes the scan/truncate mechanics, but an unbounded
/// buffer would contradict the engine's whole "constrained target"
/// design note.
const MAX_BUFFER_BYTES: usize = 8 * 1024;

#[derive(Default)]
pub struct HistoryRing {
    buffer: Vec<u8>,
    /// Byte offset one past the end of the current entry's terminator —
    /// the "moving write pointer".
    write_pos: usize,
    /// 0-based index, among entries in `buffer[..write_pos]`, of the
    /// entry currently displayed.
    current: usize,
}

impl HistoryRing {
    pub fn new() -> Self {
        HistoryRing::default()
    }

    fn live_entries(&self) -> impl Iterator<Item = &str> {
        self.buffer[..self.write_pos]
            .split(|&b| b == 0)
            .filter(|s| !s.is_empty())
            .map(|s| std::str::from_utf8(s).unwrap_or(""))
    }

    pub fn current(&self) -> Option<&str> {
        self.live_entries().nth(self.current)
    }

    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.live_entries().nth(self.current + 1).is_some()
    }

    /// Scans back one entry, per §4.7's "back ... walk the packed buffer
    /// by scanning for nulls".
    pub fn go_back(&mut self) -> Option<&str> {
        if !self.can_go_back() {
            return None;
        }
        self.current -= 1;
        self.current()
    }

    pub fn go_forward(&mut self) -> Option<&str> {
        if !self.can_go_forward() {
            return None;
        }
        self.current += 1;
        self.current()
    }

    /// Appends a fresh entry, truncating anything after the current
    /// position first (§4.7: "Inserting a new entry truncates anything
    /// after the current position").
    pub fn push(&mut self, url: &str) {
        let keep_upto = self
            .live_entries()
            .take(self.current + 1)
            .map(|e| e.len() + 1)
            .sum::<usize>();
        self.buffer.truncate(keep_upto);
        self.write_pos = keep_upto;
        self.buffer.extend_from_slice(url.as_bytes());
        self.buffer.push(0);
        self.write_pos = self.buffer.len();
        self.current = self.live_entries().count().saturating_sub(1);
        if self.buffer.len() > MAX_BUFFER_BYTES {
            self.compact();
        }
    }

    /// Drops the oldest entry to bound buffer growth; the "moving write
    /// pointer" simply restarts from zero over the surviving entries.
    fn compact(&mut self) {
        if let Some(first_null) = self.buffer.iter().position(|&b| b == 0) {
            let drop_bytes = first_null + 1;
            self.buffer.drain(..drop_bytes);
            self.write_pos = self.buffer.len();
            self.current = self.current.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_current_round_trips() {
        let mut history = HistoryRing::new();
        history.push("http://h.com/a");
        assert_eq!(history.current(), Some("http://h.com/a"));
    }

    #[test]
    fn back_and_forward_walk_the_buffer() {
        let mut history = HistoryRing::new();
        history.push("http://h.com/a");
        history.push("http://h.com/b");
        history.push("http://h.com/c");
        assert_eq!(history.current(), Some("http://h.com/c"));
        assert_eq!(history.go_back(), Some("http://h.com/b"));
        assert_eq!(history.go_back(), Some("http://h.com/a"));
        assert!(!history.can_go_back());
        assert_eq!(history.go_forward(), Some("http://h.com/b"));
        assert_eq!(history.go_forward(), Some("http://h.com/c"));
        assert!(!history.can_go_forward());
    }

    #[test]
    fn pushing_after_going_back_truncates_the_forward_branch() {
        let mut history = HistoryRing::new();
        history.push("http://h.com/a");
        history.push("http://h.com/b");
        history.go_back();
        history.push("http://h.com/c");
        assert_eq!(history.current(), Some("http://h.com/c"));
        assert!(!history.can_go_forward());
        assert_eq!(history.go_back(), Some("http://h.com/a"));
    }
}
