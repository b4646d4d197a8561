/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The closed set of node kinds (§4.3). `CheckBox` is not named in the
//! spec's own one-line enumeration of the set but is required by the same
//! section's interactive-kind writeup and by Form's submission walk
//! (`CheckBox (checked only)`); `SPEC_FULL.md`/`DESIGN.md` record this as a
//! resolved Open Question rather than an invention.

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
    Section,
    Text,
    SubText,
    Image,
    Break,
    Style,
    Link,
    Block,
    Button,
    TextField,
    CheckBox,
    Form,
    StatusBar,
    ScrollBar,
    Table,
    TableRow,
    TableCell,
    Select,
    Option,
    List,
    ListItem,
}

impl NodeKind {
    /// Non-visual kinds never occupy screen space and are exempt from the
    /// "size must be nonzero after layout" invariant (§8).
    pub fn is_non_visual(self) -> bool {
        matches!(self, NodeKind::Section | NodeKind::Style | NodeKind::Form)
    }
}
