/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! The load-task coordinator (§4.8) and its network contract (§6). The
//! specific HTTP/TCP transport is out of scope per §1 — this crate
//! states the [`NetworkDriver`] contract a port supplies and owns
//! everything else: URL classification, `file://`/bare-path local
//! loading, HTTPS rejection, redirect-following, and timeouts.

mod coordinator;
mod driver;
mod load_task;
mod local;
mod page_url;
mod tcp;

pub use coordinator::LoadCoordinator;
pub use driver::{NetworkDriver, RequestHandle, RequestState};
pub use load_task::{LoadTask, DEFAULT_HTTP_TIMEOUT, DEFAULT_IMAGE_TIMEOUT};
pub use local::LocalFileDriver;
pub use page_url::{classify, normalize_url, PageUrl, UrlClass, UrlError};
pub use tcp::TcpNetworkDriver;
