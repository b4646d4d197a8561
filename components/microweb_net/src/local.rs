/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! Local-file loading for `file://` URLs and the "bare → local first"
//! classification of §4.8. Reading a file from disk never needs to
//! suspend, unlike the HTTP/TCP transport, so this driver always reports
//! `Finished` (or `Error`) the tick after `create_request`.

use std::collections::HashMap;
use std::fs;

use crate::driver::{NetworkDriver, RequestHandle, RequestState};
use crate::page_url::PageUrl;

struct Slot {
    state: RequestState,
    bytes: Vec<u8>,
    pos: usize,
}

#[derive(Default)]
pub struct LocalFileDriver {
    slots: HashMap<u32, Slot>,
    next_id: u32,
}

impl LocalFileDriver {
    pub fn new() -> Self {
        LocalFileDriver::default()
    }

    /// Whether a bare path resolves to an existing local file, per §4.8's
    /// "bare → local first" rule.
    pub fn exists(path: &std::path::Path) -> bool {
        path.is_file()
    }
}

impl NetworkDriver for LocalFileDriver {
    fn create_request(&mut self, url: &PageUrl) -> RequestHandle {
        let id = self.next_id;
        self.next_id += 1;
        let slot = match url.to_file_path() {
            Some(path) => match fs::read(&path) {
                Ok(bytes) => Slot { state: RequestState::Finished, bytes, pos: 0 },
                Err(e) => Slot { state: RequestState::Error(e.to_string()), bytes: Vec::new(), pos: 0 },
            },
            None => Slot {
                state: RequestState::Error("not a file:// URL".to_string()),
                bytes: Vec::new(),
                pos: 0,
            },
        };
        self.slots.insert(id, slot);
        RequestHandle(id)
    }

    fn state(&mut self, handle: RequestHandle) -> RequestState {
        self.slots.get(&handle.0).map(|s| s.state.clone()).unwrap_or(RequestState::Stopped)
    }

    fn read_data(&mut self, handle: RequestHandle, buf: &mut [u8]) -> usize {
        let Some(slot) = self.slots.get_mut(&handle.0) else {
            return 0;
        };
        let remaining = &slot.bytes[slot.pos..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        slot.pos += n;
        n
    }

    fn location(&mut self, _handle: RequestHandle) -> Option<String> {
        None
    }

    fn stop(&mut self, handle: RequestHandle) {
        if let Some(slot) = self.slots.get_mut(&handle.0) {
            slot.state = RequestState::Stopped;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_an_existing_file_fully() {
        let dir = std::env::temp_dir();
        let path = dir.join("microweb_net_local_test.htm");
        fs::write(&path, b"<html>hi</html>").unwrap();
        let url = PageUrl::parse(&format!("file://{}", path.display())).unwrap();
        let mut driver = LocalFileDriver::new();
        let handle = driver.create_request(&url);
        assert_eq!(driver.state(handle), RequestState::Finished);
        let mut buf = [0u8; 64];
        let n = driver.read_data(handle, &mut buf);
        assert_eq!(&buf[..n], b"<html>hi</html>");
        fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_reports_error_state() {
        let url = PageUrl::parse("file:///no/such/file.htm").unwrap();
        let mut driver = LocalFileDriver::new();
        let handle = driver.create_request(&url);
        assert!(matches!(driver.state(handle), RequestState::Error(_)));
    }
}
