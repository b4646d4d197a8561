/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The fixed character entity table `ParseAmpersandEscape` matches against
//! (§4.4). Matching is case-sensitive, as in the reference markup this
//! engine targets.

/// Looks up a bare entity name (without the leading `&` or trailing `;`)
/// and returns its ASCII-best-effort substitution, or `None` if the name
/// isn't in the fixed table — the caller then emits the raw `&name;`
/// sequence unchanged.
pub fn lookup(name: &str) -> Option<char> {
    Some(match name {
        "quot" => '"',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "nbsp" => ' ',
        "pound" => '#',
        "brvbar" => '|',
        "uml" => '"',
        "not" => '!',
        "cent" => 'c',
        "copy" => 'c',
        "reg" => 'r',
        "laquo" => '<',
        "raquo" => '>',
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_entities_resolve() {
        assert_eq!(lookup("amp"), Some('&'));
        assert_eq!(lookup("nbsp"), Some(' '));
    }

    #[test]
    fn unknown_entity_returns_none() {
        assert_eq!(lookup("frobnicate"), None);
    }
}
