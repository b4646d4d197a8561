/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at http://mozilla.org/MPL/2.0/. */

//! `PageUrl`: a thin newtype over `url::Url`, mirroring `ServoUrl` in the
//! teacher's `components/url` — the load-task coordinator (§4.8) deals
//! exclusively in `PageUrl`s rather than raw strings.

use std::fmt;

use url::Url;

#[derive(Debug)]
pub enum UrlError {
    Parse(url::ParseError),
}

impl fmt::Display for UrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlError::Parse(e) => write!(f, "malformed URL: {e}"),
        }
    }
}

impl std::error::Error for UrlError {}

impl From<url::ParseError> for UrlError {
    fn from(e: url::ParseError) -> Self {
        UrlError::Parse(e)
    }
}

/// How `§4.8`'s `Load(url)` classifies a raw string before handing it to a
/// transport: `file://` and bare (scheme-less) strings are resolved
/// locally, `http(s)://` go to the network driver contract.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UrlClass {
    Http,
    Https,
    File,
    /// No recognized scheme: tried as a local file path first, falling
    /// back to `http://` if no such file exists (§4.8: "bare → local
    /// first, else http").
    Bare,
}

/// Classifies a raw URL/path string without needing it to parse as an
/// absolute URL first (a bare local path like `index.htm` is not one).
pub fn classify(raw: &str) -> UrlClass {
    let lower = raw.trim();
    if let Some(rest) = strip_scheme(lower, "https") {
        let _ = rest;
        return UrlClass::Https;
    }
    if let Some(rest) = strip_scheme(lower, "http") {
        let _ = rest;
        return UrlClass::Http;
    }
    if strip_scheme(lower, "file").is_some() {
        return UrlClass::File;
    }
    UrlClass::Bare
}

fn strip_scheme<'a>(raw: &'a str, scheme: &str) -> Option<&'a str> {
    let prefix_len = scheme.len();
    if raw.len() > prefix_len + 3
        && raw[..prefix_len].eq_ignore_ascii_case(scheme)
        && &raw[prefix_len..prefix_len + 3] == "://"
    {
        Some(&raw[prefix_len + 3..])
    } else {
        None
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct PageUrl(Url);

impl PageUrl {
    pub fn parse(raw: &str) -> Result<PageUrl, UrlError> {
        Ok(PageUrl(Url::parse(raw)?))
    }

    /// Builds an `http://` URL out of a bare path, per `§4.8`'s "else
    /// http" fallback.
    pub fn assume_http(raw: &str) -> Result<PageUrl, UrlError> {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            PageUrl::parse(raw)
        } else {
            PageUrl::parse(&format!("http://{raw}"))
        }
    }

    pub fn class(&self) -> UrlClass {
        match self.0.scheme() {
            "https" => UrlClass::Https,
            "http" => UrlClass::Http,
            "file" => UrlClass::File,
            _ => UrlClass::Bare,
        }
    }

    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    pub fn port(&self) -> u16 {
        self.0.port_or_known_default().unwrap_or(80)
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.0.query()
    }

    /// Returns the filesystem path a `file://` URL names, for the local
    /// load task.
    pub fn to_file_path(&self) -> Option<std::path::PathBuf> {
        self.0.to_file_path().ok()
    }

    /// Resolves `href` against this URL as a base, per `§4.3`'s link
    /// href handling and `§8`'s `normalize_url` idempotence property.
    pub fn resolve(&self, href: &str) -> Result<PageUrl, UrlError> {
        Ok(PageUrl(self.0.join(href)?))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Normalizes `raw` by parsing and re-serializing it: `url::Url::parse`
/// already collapses `../`/`./` dot-segments and percent-encodes per
/// WHATWG, so re-parsing its own output is a no-op — the idempotence
/// property `§8` asks for.
pub fn normalize_url(raw: &str) -> Result<String, UrlError> {
    Ok(Url::parse(raw)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_schemes() {
        assert_eq!(classify("http://h.com/"), UrlClass::Http);
        assert_eq!(classify("https://h.com/"), UrlClass::Https);
        assert_eq!(classify("file:///tmp/x.htm"), UrlClass::File);
        assert_eq!(classify("index.htm"), UrlClass::Bare);
        assert_eq!(classify("../other.htm"), UrlClass::Bare);
    }

    #[test]
    fn resolve_joins_relative_links_against_the_page_url() {
        let page = PageUrl::parse("http://h.com/p/q.html").unwrap();
        let link = page.resolve("/foo").unwrap();
        assert_eq!(link.as_str(), "http://h.com/foo");
    }

    #[test]
    fn resolve_collapses_dot_segments() {
        let page = PageUrl::parse("http://h.com/a/b/q.html").unwrap();
        let link = page.resolve("../c.htm").unwrap();
        assert_eq!(link.as_str(), "http://h.com/a/c.htm");
    }

    #[test]
    fn normalize_url_is_idempotent() {
        let once = normalize_url("http://h.com/a/../b/./c.htm").unwrap();
        let twice = normalize_url(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn assume_http_only_prefixes_scheme_less_input() {
        let a = PageUrl::assume_http("example.com/x").unwrap();
        assert_eq!(a.as_str(), "http://example.com/x");
        let b = PageUrl::assume_http("https://example.com/x").unwrap();
        assert_eq!(b.as_str(), "https://example.com/x");
    }
}
