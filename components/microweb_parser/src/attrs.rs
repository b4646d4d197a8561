/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Splits a tag's raw attribute string into `name=value` pairs. Values may
//! be double-quoted, single-quoted, or bare; a bare attribute with no `=`
//! (e.g. `checked`) is recorded with an empty value.

pub struct Attrs {
    pairs: Vec<(String, String)>,
}

impl Attrs {
    pub fn parse(raw: &str) -> Attrs {
        let mut pairs = Vec::new();
        let bytes = raw.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let name_start = i;
            while i < bytes.len() && bytes[i] != b'=' && !bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i == name_start {
                break;
            }
            let name = raw[name_start..i].to_ascii_lowercase();
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let value = if i < bytes.len() && bytes[i] == b'=' {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                    let quote = bytes[i];
                    i += 1;
                    let start = i;
                    while i < bytes.len() && bytes[i] != quote {
                        i += 1;
                    }
                    let value = raw[start..i].to_string();
                    if i < bytes.len() {
                        i += 1;
                    }
                    value
                } else {
                    let start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                        i += 1;
                    }
                    raw[start..i].to_string()
                }
            } else {
                String::new()
            };
            pairs.push((name, value));
        }
        Attrs { pairs }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn has(&self, name: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_and_bare_attributes() {
        let attrs = Attrs::parse("type=\"checkbox\" checked name='agree'");
        assert_eq!(attrs.get("type"), Some("checkbox"));
        assert!(attrs.has("checked"));
        assert_eq!(attrs.get("name"), Some("agree"));
    }

    #[test]
    fn unquoted_value_stops_at_whitespace() {
        let attrs = Attrs::parse("width=100 height=50");
        assert_eq!(attrs.get("width"), Some("100"));
        assert_eq!(attrs.get("height"), Some("50"));
    }
}
