//! Transport-agnostic HTTP exchange types.
//!
//! The host application owns the actual HTTP client (and the request
//! signing scheme); upload components only build `HttpRequest` values
//! and interpret `HttpResponse` values.

use std::collections::HashMap;

use serde::de::DeserializeOwned;

/// HTTP method for an upload request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A request to the remote upload surface.
///
/// `path` is relative to the API host (or an absolute URL when a
/// transfer targets a specific upload server). The body is always raw
/// bytes; JSON payloads are serialized by the caller.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Creates a GET request with no body.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Creates a POST request carrying `body`.
    pub fn post(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            headers: Vec::new(),
            body,
        }
    }

    /// Adds a header (builder style).
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a batch of headers.
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }
}

/// A response from the remote upload surface.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response with no headers.
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body,
        }
    }

    /// Adds a header (builder style, used mostly by tests).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Deserializes the body as JSON into the given type.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Returns `true` for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_collects_headers() {
        let req = HttpRequest::post("/upload/photo/", vec![1, 2, 3])
            .header("Offset", "0")
            .header("X-Entity-Length", "3");
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.headers.len(), 2);
        assert_eq!(req.body, vec![1, 2, 3]);
    }

    #[test]
    fn response_header_lookup_is_case_insensitive() {
        let resp = HttpResponse::new(201, Vec::new()).with_header("Range", "0-99/1000");
        assert_eq!(resp.header("range"), Some("0-99/1000"));
        assert_eq!(resp.header("RANGE"), Some("0-99/1000"));
        assert_eq!(resp.header("X-Missing"), None);
    }

    #[test]
    fn response_json_parses_body() {
        let resp = HttpResponse::new(200, br#"{"offset": 4096}"#.to_vec());
        #[derive(serde::Deserialize)]
        struct Offset {
            offset: u64,
        }
        let parsed: Offset = resp.json().unwrap();
        assert_eq!(parsed.offset, 4096);
        assert!(resp.is_success());
    }

    #[test]
    fn non_2xx_is_not_success() {
        assert!(!HttpResponse::new(400, Vec::new()).is_success());
        assert!(!HttpResponse::new(511, Vec::new()).is_success());
        assert!(HttpResponse::new(201, Vec::new()).is_success());
    }
}
