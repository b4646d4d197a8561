/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! One load slot (§4.8): `Load(url)` / `HasContent()` / `GetContent` /
//! `Stop()`. `§4.8` defines two independent slots — `pageLoadTask` and
//! `pageContentLoadTask` — both built from this same generic task over
//! whatever [`NetworkDriver`] the port supplies, plus the always-present
//! [`LocalFileDriver`] for `file://`/bare URLs.

use std::time::{Duration, Instant};

use crate::driver::{NetworkDriver, RequestHandle, RequestState};
use crate::local::LocalFileDriver;
use crate::page_url::{PageUrl, UrlClass};

/// §5: "HTTP requests time out after 20 seconds of silence (configurable)".
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(20);
/// §5: "Image passive-data connection opens time out after 10 seconds."
pub const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(10);
/// A guard against a redirect loop ping-ponging forever; not named by the
/// spec, which only describes following a single Location header.
const MAX_REDIRECTS: u8 = 10;

enum Slot {
    Idle,
    /// `§4.8`: "https:// is rejected: the engine synthesizes a minimal
    /// in-memory HTML 'HTTPS unsupported' page containing a link to the
    /// same URL via a rewriting proxy."
    SynthesizedHttps { bytes: Vec<u8>, pos: usize },
    Remote { handle: RequestHandle, last_activity: Instant, redirects: u8 },
    Failed(String),
}

pub struct LoadTask<D: NetworkDriver> {
    local: LocalFileDriver,
    driver: D,
    slot: Slot,
    url: Option<PageUrl>,
    timeout: Duration,
    /// A user-configurable proxy URL the synthesized HTTPS page links
    /// through, per `§4.8`.
    https_proxy_template: String,
}

impl<D: NetworkDriver> LoadTask<D> {
    pub fn new(driver: D, timeout: Duration) -> Self {
        LoadTask {
            local: LocalFileDriver::new(),
            driver,
            slot: Slot::Idle,
            url: None,
            timeout,
            https_proxy_template: "https-proxy:{url}".to_string(),
        }
    }

    pub fn with_https_proxy_template(mut self, template: impl Into<String>) -> Self {
        self.https_proxy_template = template.into();
        self
    }

    pub fn url(&self) -> Option<&PageUrl> {
        self.url.as_ref()
    }

    /// Starts loading `raw`, classifying it per `§4.8`. Any in-flight
    /// request is stopped first.
    pub fn load(&mut self, raw: &str) {
        self.stop();
        let class = crate::page_url::classify(raw);
        let resolved = match class {
            UrlClass::Bare => {
                if let Ok(candidate) = std::env::current_dir().map(|d| d.join(raw)) {
                    if LocalFileDriver::exists(&candidate) {
                        PageUrl::parse(&format!("file://{}", candidate.display()))
                    } else {
                        PageUrl::assume_http(raw)
                    }
                } else {
                    PageUrl::assume_http(raw)
                }
            }
            _ => PageUrl::parse(raw),
        };
        let url = match resolved {
            Ok(url) => url,
            Err(e) => {
                self.slot = Slot::Failed(format!("bad URL: {e}"));
                return;
            }
        };
        self.start(url);
    }

    fn start(&mut self, url: PageUrl) {
        match url.class() {
            UrlClass::Https => {
                let proxied = self.https_proxy_template.replace("{url}", url.as_str());
                let html = format!(
                    "<html><head><title>HTTPS unsupported</title></head><body>\
                     <p>HTTPS is not supported.</p>\
                     <p><a href=\"{proxied}\">Open via proxy</a></p></body></html>"
                );
                self.slot = Slot::SynthesizedHttps { bytes: html.into_bytes(), pos: 0 };
            }
            UrlClass::File => {
                let handle = self.local.create_request(&url);
                self.slot = Slot::Remote { handle, last_activity: Instant::now(), redirects: 0 };
            }
            UrlClass::Http | UrlClass::Bare => {
                let handle = self.driver.create_request(&url);
                self.slot = Slot::Remote { handle, last_activity: Instant::now(), redirects: 0 };
            }
        }
        self.url = Some(url);
    }

    /// §4.8's `HasContent()`: are there bytes ready to read right now?
    pub fn has_content(&mut self) -> bool {
        self.poll();
        match &self.slot {
            Slot::SynthesizedHttps { bytes, pos } => pos < &bytes.len(),
            Slot::Remote { .. } => self.remote_has_content(),
            Slot::Idle | Slot::Failed(_) => false,
        }
    }

    fn remote_has_content(&mut self) -> bool {
        let Slot::Remote { handle, .. } = &self.slot else { return false };
        let handle = *handle;
        let is_local = matches!(self.url.as_ref().map(|u| u.class()), Some(UrlClass::File));
        let state = if is_local { self.local.state(handle) } else { self.driver.state(handle) };
        matches!(state, RequestState::Downloading | RequestState::Finished)
    }

    /// §4.8's `GetContent(buf, n)`: returns the number of bytes actually
    /// read, `0` meaning "nothing ready yet" (suspend) unless the task has
    /// reached a terminal error, in which case it stays `0` forever.
    pub fn get_content(&mut self, buf: &mut [u8]) -> usize {
        self.poll();
        match &mut self.slot {
            Slot::SynthesizedHttps { bytes, pos } => {
                let remaining = &bytes[*pos..];
                let n = remaining.len().min(buf.len());
                buf[..n].copy_from_slice(&remaining[..n]);
                *pos += n;
                n
            }
            Slot::Remote { handle, .. } => {
                let handle = *handle;
                let is_local = matches!(self.url.as_ref().map(|u| u.class()), Some(UrlClass::File));
                let n = if is_local { self.local.read_data(handle, buf) } else { self.driver.read_data(handle, buf) };
                if n > 0 {
                    if let Slot::Remote { last_activity, .. } = &mut self.slot {
                        *last_activity = Instant::now();
                    }
                }
                n
            }
            Slot::Idle | Slot::Failed(_) => 0,
        }
    }

    /// Checks for a terminal error (timeout, network failure, redirect
    /// target exhaustion), per §7's disposition table.
    pub fn error(&self) -> Option<&str> {
        match &self.slot {
            Slot::Failed(msg) => Some(msg.as_str()),
            _ => None,
        }
    }

    pub fn stop(&mut self) {
        if let Slot::Remote { handle, .. } = &self.slot {
            let handle = *handle;
            let is_local = matches!(self.url.as_ref().map(|u| u.class()), Some(UrlClass::File));
            if is_local {
                self.local.stop(handle);
            } else {
                self.driver.stop(handle);
            }
        }
        self.slot = Slot::Idle;
        self.url = None;
    }

    /// Advances redirect-following and timeout bookkeeping; called at the
    /// top of every public accessor so callers never need to remember to
    /// tick this themselves.
    fn poll(&mut self) {
        let Slot::Remote { handle, last_activity, redirects } = &self.slot else { return };
        let (handle, last_activity, redirects) = (*handle, *last_activity, *redirects);
        let is_local = matches!(self.url.as_ref().map(|u| u.class()), Some(UrlClass::File));
        let state = if is_local { self.local.state(handle) } else { self.driver.state(handle) };
        match state {
            RequestState::Error(msg) => self.slot = Slot::Failed(msg),
            RequestState::UnsupportedHttps => {
                if let Some(url) = self.url.clone() {
                    self.start(url);
                }
            }
            RequestState::Finished if !is_local => {
                // §4.8: "Redirects are followed for HTTP status
                // 301/302/307/308 by restarting the load task with the
                // Location header value."
                if let Some(location) = self.driver.location(handle) {
                    if redirects >= MAX_REDIRECTS {
                        self.slot = Slot::Failed("too many redirects".to_string());
                        return;
                    }
                    let base = self.url.clone();
                    let next = base.as_ref().and_then(|b| b.resolve(&location).ok()).or_else(|| PageUrl::parse(&location).ok());
                    if let Some(next) = next {
                        self.driver.stop(handle);
                        self.start(next);
                        if let Slot::Remote { redirects: r, .. } = &mut self.slot {
                            *r = redirects + 1;
                        }
                    } else {
                        self.slot = Slot::Failed(format!("bad redirect target: {location}"));
                    }
                }
            }
            RequestState::Connecting | RequestState::Downloading => {
                if last_activity.elapsed() > self.timeout {
                    self.driver.stop(handle);
                    self.slot = Slot::Failed("timed out".to_string());
                }
            }
            RequestState::Stopped | RequestState::Finished => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MockDriver {
        states: HashMap<u32, RequestState>,
        bodies: HashMap<u32, Vec<u8>>,
        locations: HashMap<u32, String>,
        next_push: u32,
        next_handle: u32,
    }

    impl MockDriver {
        fn push(&mut self, state: RequestState, body: &[u8], location: Option<&str>) -> u32 {
            let id = self.next_push;
            self.next_push += 1;
            self.states.insert(id, state);
            self.bodies.insert(id, body.to_vec());
            if let Some(l) = location {
                self.locations.insert(id, l.to_string());
            }
            id
        }
    }

    impl NetworkDriver for MockDriver {
        fn create_request(&mut self, _url: &PageUrl) -> RequestHandle {
            let id = self.next_handle;
            self.next_handle += 1;
            RequestHandle(id)
        }
        fn state(&mut self, handle: RequestHandle) -> RequestState {
            self.states.get(&handle.0).cloned().unwrap_or(RequestState::Stopped)
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
        fn location(&mut self, handle: RequestHandle) -> Option<String> {
            self.locations.get(&handle.0).cloned()
        }
        fn stop(&mut self, handle: RequestHandle) {
            self.states.insert(handle.0, RequestState::Stopped);
        }
    }

    #[test]
    fn https_url_yields_a_synthesized_unsupported_page() {
        let driver = MockDriver::default();
        let mut task = LoadTask::new(driver, DEFAULT_HTTP_TIMEOUT);
        task.load("https://h.com/secure");
        assert!(task.has_content());
        let mut buf = [0u8; 4096];
        let n = task.get_content(&mut buf);
        let page = std::str::from_utf8(&buf[..n]).unwrap();
        assert!(page.contains("HTTPS is not supported"));
        assert!(page.contains("https-proxy:https://h.com/secure"));
    }

    #[test]
    fn plain_http_request_reads_through_to_the_mock_body() {
        let mut driver = MockDriver::default();
        driver.push(RequestState::Finished, b"<html>ok</html>", None);
        let mut task = LoadTask::new(driver, DEFAULT_HTTP_TIMEOUT);
        task.load("http://h.com/");
        assert!(task.has_content());
        let mut buf = [0u8; 64];
        let n = task.get_content(&mut buf);
        assert_eq!(&buf[..n], b"<html>ok</html>");
    }

    #[test]
    fn a_301_response_is_followed_to_its_location() {
        let mut driver = MockDriver::default();
        driver.push(RequestState::Finished, b"", Some("http://example.org/x"));
        let mut task = LoadTask::new(driver, DEFAULT_HTTP_TIMEOUT);
        task.load("http://h.com/old");
        task.has_content();
        assert_eq!(task.url().unwrap().as_str(), "http://example.org/x");
    }

    #[test]
    fn stop_discards_the_in_flight_request() {
        let driver = MockDriver::default();
        let mut task = LoadTask::new(driver, DEFAULT_HTTP_TIMEOUT);
        task.load("http://h.com/");
        task.stop();
        assert!(task.url().is_none());
        assert!(!task.has_content());
    }
}
