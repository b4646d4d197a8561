/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The two-slot load coordinator (§4.8): `pageLoadTask` for the current
//! page, `pageContentLoadTask` for an image or similar sub-resource.
//! `open_url` implements the cancellation sequence of §5: stop both
//! tasks, report that a reset is needed, and start the fresh page load —
//! the arena reset, renderer dirty-set reset, and scroll-position zeroing
//! themselves are the caller's job (`microweb_mem`/`microweb_render` own
//! that state, not this crate).

use std::time::Duration;

use crate::driver::NetworkDriver;
use crate::load_task::{LoadTask, DEFAULT_HTTP_TIMEOUT, DEFAULT_IMAGE_TIMEOUT};

pub struct LoadCoordinator<D: NetworkDriver> {
    pub page: LoadTask<D>,
    pub content: LoadTask<D>,
}

impl<D: NetworkDriver> LoadCoordinator<D> {
    pub fn new(page_driver: D, content_driver: D) -> Self {
        LoadCoordinator {
            page: LoadTask::new(page_driver, DEFAULT_HTTP_TIMEOUT),
            content: LoadTask::new(content_driver, DEFAULT_IMAGE_TIMEOUT),
        }
    }

    pub fn with_timeouts(page_driver: D, content_driver: D, page_timeout: Duration, content_timeout: Duration) -> Self {
        LoadCoordinator {
            page: LoadTask::new(page_driver, page_timeout),
            content: LoadTask::new(content_driver, content_timeout),
        }
    }

    /// §5's cancellation sequence for a user-initiated `OpenURL`: both
    /// load tasks are stopped before the page task restarts on `raw`.
    /// Returns `()`; the caller is expected to have already performed (or
    /// perform immediately after) the arena reset, renderer dirty-set
    /// reset, and scroll zeroing this navigation also requires.
    pub fn open_url(&mut self, raw: &str) {
        self.page.stop();
        self.content.stop();
        self.page.load(raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{RequestHandle, RequestState};
    use crate::page_url::PageUrl;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockDriver {
        bodies: HashMap<u32, Vec<u8>>,
        next: u32,
    }

    impl NetworkDriver for MockDriver {
        fn create_request(&mut self, _url: &PageUrl) -> RequestHandle {
            let id = self.next;
            self.next += 1;
            self.bodies.insert(id, b"<html>page</html>".to_vec());
            RequestHandle(id)
        }
        fn state(&mut self, _handle: RequestHandle) -> RequestState {
            RequestState::Finished
        }
        fn read_data(&mut self, handle: RequestHandle, buf: &mut [u8]) -> usize {
            if let Some(body) = self.bodies.get_mut(&handle.0) {
                let n = body.len().min(buf.len());
                buf[..n].copy_from_slice(&body[..n]);
                body.drain(..n);
                n
            } else {
                0
            }
        }
        fn location(&mut self, _handle: RequestHandle) -> Option<String> {
            None
        }
        fn stop(&mut self, _handle: RequestHandle) {}
    }

    #[test]
    fn open_url_replaces_the_page_task_and_stops_the_content_task() {
        let mut coordinator = LoadCoordinator::new(MockDriver::default(), MockDriver::default());
        coordinator.open_url("http://h.com/first");
        assert_eq!(coordinator.page.url().unwrap().as_str(), "http://h.com/first");
        coordinator.content.load("http://h.com/image.gif");
        coordinator.open_url("http://h.com/second");
        assert_eq!(coordinator.page.url().unwrap().as_str(), "http://h.com/second");
        assert!(coordinator.content.url().is_none());
    }
}
