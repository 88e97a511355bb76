// Remote call description, independent of any concrete endpoint

use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

/// Default per-attempt timeout for remote calls (30s)
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Request payload variants
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    /// Raw bytes with their content type (document uploads)
    Bytes(Vec<u8>, String),
}

/// Everything the executor needs to make one remote call
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
}

impl RequestSpec {
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn json_body(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn bytes_body(mut self, bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Bytes(bytes, content_type.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let spec = RequestSpec::get("https://example.com/api");
        assert_eq!(spec.method, Method::GET);
        assert_eq!(spec.timeout, DEFAULT_CALL_TIMEOUT);
        assert!(spec.headers.is_empty());
        assert!(spec.query.is_empty());
        assert!(spec.body.is_none());
    }

    #[test]
    fn test_builder_accumulates() {
        let spec = RequestSpec::post("https://example.com/api")
            .header("X-Trace", "abc")
            .query_param("page", "2")
            .query_param("s", "dune")
            .json_body(json!({"k": "v"}))
            .timeout(Duration::from_secs(5));

        assert_eq!(spec.query.len(), 2);
        assert_eq!(spec.headers[0].0, "X-Trace");
        assert!(matches!(spec.body, Some(RequestBody::Json(_))));
        assert_eq!(spec.timeout, Duration::from_secs(5));
    }
}
