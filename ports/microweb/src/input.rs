/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The input driver contract (§6): polled mouse state, cursor show/hide
//! and shape, and a non-blocking keyboard read. §1 places the actual
//! mouse/keyboard device drivers out of scope — this crate states the
//! contract and ships a driver with no device behind it, the same way a
//! headless port would stand in until a real backend is wired in.

use microweb_draw::CursorShape;

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct MouseButtons: u8 {
        const LEFT = 0b001;
        const RIGHT = 0b010;
        const MIDDLE = 0b100;
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MouseState {
    pub buttons: MouseButtons,
    pub x: i32,
    pub y: i32,
}

/// A 16-bit key code: ASCII in the low byte, or an extended scancode in
/// the high byte with the low byte zero (§6).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyCode(pub u16);

pub trait InputDriver {
    fn poll_mouse(&mut self) -> MouseState;
    fn show_cursor(&mut self);
    fn hide_cursor(&mut self);
    fn set_cursor_shape(&mut self, shape: CursorShape);
    /// Non-blocking: `None` if no key is pending.
    fn get_key(&mut self) -> Option<KeyCode>;
}

/// The driver this workspace ships without a real device behind it: the
/// mouse never moves, no key is ever pending. A port wiring in a real
/// pointing device and keyboard implements [`InputDriver`] directly
/// against whatever platform APIs it has.
#[derive(Default)]
pub struct NullInputDriver {
    cursor_visible: bool,
    cursor_shape: Option<CursorShape>,
}

impl InputDriver for NullInputDriver {
    fn poll_mouse(&mut self) -> MouseState {
        MouseState { buttons: MouseButtons::empty(), x: 0, y: 0 }
    }

    fn show_cursor(&mut self) {
        self.cursor_visible = true;
    }

    fn hide_cursor(&mut self) {
        self.cursor_visible = false;
    }

    fn set_cursor_shape(&mut self, shape: CursorShape) {
        self.cursor_shape = Some(shape);
    }

    fn get_key(&mut self) -> Option<KeyCode> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_driver_reports_an_idle_mouse_and_no_pending_key() {
        let mut driver = NullInputDriver::default();
        assert_eq!(driver.poll_mouse(), MouseState { buttons: MouseButtons::empty(), x: 0, y: 0 });
        assert!(driver.get_key().is_none());
    }
}
