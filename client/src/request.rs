use bytes::Bytes;
use http::HeaderValue;
use http::Method;
use reqwest::header::HeaderMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn new(method: Method, url: String) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn with_body(mut self, body: Bytes, content_type: &'static str) -> Self {
        self.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static(content_type),
        );
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Appends `key=value` query pairs to the request URL.
    pub fn with_query<K, V>(mut self, pairs: &[(K, V)]) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in pairs {
            let separator = if self.url.contains('?') { '&' } else { '?' };
            self.url = format!(
                "{}{separator}{}={}",
                self.url,
                key.as_ref(),
                encode_query_value(value.as_ref())
            );
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct Response {
    pub status: http::StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn with_query_appends_and_encodes_pairs() {
        let req = Request::new(Method::GET, "https://example.com/runs".to_string())
            .with_query(&[("per_page", "100"), ("created", ">=2021-10-12")]);

        assert_eq!(
            req.url,
            "https://example.com/runs?per_page=100&created=%3E%3D2021-10-12"
        );
    }

    #[test]
    fn with_body_sets_content_type() {
        let req = Request::new(Method::POST, "https://example.com/_bulk".to_string())
            .with_body(Bytes::from_static(b"{}\n"), "application/x-ndjson");

        assert_eq!(
            req.headers
                .get(http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/x-ndjson")
        );
        assert_eq!(req.body.as_deref(), Some(&b"{}\n"[..]));
    }
}
