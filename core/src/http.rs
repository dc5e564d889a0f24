//! HTTP transport types exchanged with an [`HttpExecutor`](crate::HttpExecutor).
//!
//! # Design
//! These types describe one HTTP exchange as plain data. The deferred request
//! builds an `HttpRequest` when it is first observed and hands it to the
//! executor; the executor answers with an `HttpResponse` or a transport
//! error. Nothing in this module touches the network.

use std::fmt;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::request::RequestId;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully composed request, ready for an executor.
///
/// `query` is already normalized (no `null` values) and `body` is `None`
/// whenever the descriptor's body counts as empty.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub request_id: RequestId,
    pub method: HttpMethod,
    pub base_url: String,
    pub path: String,
    pub query: Map<String, Value>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl HttpRequest {
    /// Base address joined with the path, without the query string.
    pub fn url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.path.starts_with('/') {
            format!("{base}{}", self.path)
        } else {
            format!("{base}/{}", self.path)
        }
    }

    /// Query parameters rendered as wire strings.
    ///
    /// Strings are sent verbatim; every other JSON value uses its JSON text.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .iter()
            .map(|(key, value)| {
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), rendered)
            })
            .collect()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Executors return the raw body text; the deferred request parses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Parse the body as JSON.
    ///
    /// An empty body yields `null`. A body that is not JSON is passed
    /// through as a JSON string rather than rejected.
    pub fn json_body(&self) -> Value {
        if self.body.trim().is_empty() {
            return Value::Null;
        }
        serde_json::from_str(&self.body).unwrap_or_else(|_| Value::String(self.body.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(base_url: &str, path: &str) -> HttpRequest {
        HttpRequest {
            request_id: RequestId::new(),
            method: HttpMethod::Get,
            base_url: base_url.to_string(),
            path: path.to_string(),
            query: Map::new(),
            headers: vec![("Authorization".to_string(), "key".to_string())],
            body: None,
            timeout: Duration::from_secs(60),
        }
    }

    #[test]
    fn url_joins_without_double_slash() {
        let req = request("https://api.samplicio.us/", "/Core/v1/BusinessUnits/All");
        assert_eq!(req.url(), "https://api.samplicio.us/Core/v1/BusinessUnits/All");
    }

    #[test]
    fn url_inserts_missing_slash() {
        let req = request("http://localhost:3000", "Core/v1/BusinessUnits/All");
        assert_eq!(req.url(), "http://localhost:3000/Core/v1/BusinessUnits/All");
    }

    #[test]
    fn query_pairs_render_scalars() {
        let mut req = request("http://localhost", "/x");
        req.query.insert("name".to_string(), json!("abc"));
        req.query.insert("page".to_string(), json!(2));
        req.query.insert("open".to_string(), json!(true));
        let mut pairs = req.query_pairs();
        pairs.sort();
        assert_eq!(
            pairs,
            vec![
                ("name".to_string(), "abc".to_string()),
                ("open".to_string(), "true".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = request("http://localhost", "/x");
        assert_eq!(req.header("authorization"), Some("key"));
        assert_eq!(req.header("accept"), None);
    }

    #[test]
    fn empty_body_parses_to_null() {
        let resp = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        };
        assert_eq!(resp.json_body(), Value::Null);
    }

    #[test]
    fn non_json_body_passes_through_as_string() {
        let resp = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: "plain text".to_string(),
        };
        assert_eq!(resp.json_body(), json!("plain text"));
    }

    #[test]
    fn json_body_is_parsed() {
        let resp = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: r#"{"ResultCount":1,"Surveys":[{"SurveyNumber":7}]}"#.to_string(),
        };
        assert_eq!(resp.json_body()["Surveys"][0]["SurveyNumber"], 7);
    }

    #[test]
    fn method_display() {
        assert_eq!(HttpMethod::default(), HttpMethod::Get);
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
