/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The network driver contract (§6): DNS, connect, header parsing
//! (chunked transfer and `Content-Length`) and redirect exposure are the
//! transport's job. The specific HTTP/TCP implementation is deliberately
//! out of scope per §1 ("Deliberately OUT of scope ... the specific
//! HTTP/TCP transport") — this module only states the contract a real
//! transport (or a test double) must satisfy.

use crate::page_url::PageUrl;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RequestHandle(pub u32);

/// The states a network driver's request moves through (§6's exact list,
/// plus an `Error` payload since a disposition per §7 needs the driver's
/// status string).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RequestState {
    Stopped,
    Connecting,
    Downloading,
    Finished,
    Error(String),
    UnsupportedHttps,
}

/// A network transport. Implementors own DNS resolution, connection
/// setup, and response header parsing; `§4.8`'s redirect-following reads
/// [`location`](NetworkDriver::location) once [`state`](NetworkDriver::state)
/// reaches [`RequestState::Finished`].
pub trait NetworkDriver {
    fn create_request(&mut self, url: &PageUrl) -> RequestHandle;

    fn state(&mut self, handle: RequestHandle) -> RequestState;

    /// Non-blocking: returns however many bytes are ready right now (may
    /// be zero), per §5's "no operation blocks on I/O".
    fn read_data(&mut self, handle: RequestHandle, buf: &mut [u8]) -> usize;

    /// The redirect target, once a response's status line was one of
    /// 301/302/307/308 and its `Location` header parsed. Only meaningful
    /// once `state` reports `Finished`.
    fn location(&mut self, handle: RequestHandle) -> Option<String>;

    fn stop(&mut self, handle: RequestHandle);
}
