//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The core
//! builds `HttpRequest` values and parses `HttpResponse` values without ever
//! touching the network. Whoever implements `Transport` executes the GET and
//! hands back status, headers and body, including non-2xx statuses: the
//! response normalizer, not the transport, decides success or failure.

use crate::error::Result;

/// A GET request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub uri: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// The request URI with the value of the `key` parameter replaced, for
    /// logging.
    pub fn redacted_uri(&self) -> String {
        let Some((base, query)) = self.uri.split_once('?') else {
            return self.uri.clone();
        };
        let redacted: Vec<String> = query
            .split('&')
            .map(|pair| match pair.split_once('=') {
                Some(("key", _)) => "key=REDACTED".to_string(),
                _ => pair.to_string(),
            })
            .collect();
        format!("{base}?{}", redacted.join("&"))
    }

    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Executes a single GET round-trip.
///
/// Implementations must return non-2xx responses as `Ok`; only failures to
/// obtain a response at all (connection refused, unreadable body) are errors,
/// reported as `GeocodeError::Transport`.
pub trait Transport {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).get(request)
    }
}

pub(crate) fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
