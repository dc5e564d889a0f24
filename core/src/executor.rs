//! The network capability consumed by deferred requests.
//!
//! # Design
//! `HttpExecutor` performs exactly one exchange per call and reports either a
//! transport error or a response. Status codes are never interpreted here;
//! that is the deferred request's job. `UreqExecutor` is the default
//! implementation: ureq is blocking, so each exchange runs on tokio's
//! blocking pool while the agent's connection pool is shared across them.

use std::fmt;

use async_trait::async_trait;
use ureq::http::Response;
use ureq::{Agent, Body, RequestBuilder};

use crate::error::{TransportError, TransportErrorKind};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Executes requests through one shared ureq agent, so idle connections
/// are pooled across exchanges.
#[derive(Clone)]
pub struct UreqExecutor {
    agent: Agent,
}

impl UreqExecutor {
    pub fn new() -> Self {
        // 4xx/5xx come back as data; the caller decides what counts as success.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Run one exchange on the current thread.
    pub fn execute_blocking(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = &self.agent;
        let url = request.url();
        let body = match &request.body {
            Some(value) => Some(serde_json::to_vec(value).map_err(|e| {
                TransportError::new(TransportErrorKind::Other, format!("body serialization failed: {e}"))
            })?),
            None => None,
        };

        let result = match (request.method, body) {
            (HttpMethod::Get, None) => decorate(agent.get(&url), request).call(),
            (HttpMethod::Get, Some(bytes)) => decorate(agent.get(&url), request)
                .force_send_body()
                .content_type("application/json")
                .send(&bytes[..]),
            (HttpMethod::Delete, None) => decorate(agent.delete(&url), request).call(),
            (HttpMethod::Delete, Some(bytes)) => decorate(agent.delete(&url), request)
                .force_send_body()
                .content_type("application/json")
                .send(&bytes[..]),
            (HttpMethod::Post, Some(bytes)) => decorate(agent.post(&url), request)
                .content_type("application/json")
                .send(&bytes[..]),
            (HttpMethod::Post, None) => decorate(agent.post(&url), request).send_empty(),
            (HttpMethod::Put, Some(bytes)) => decorate(agent.put(&url), request)
                .content_type("application/json")
                .send(&bytes[..]),
            (HttpMethod::Put, None) => decorate(agent.put(&url), request).send_empty(),
        };

        let response = result.map_err(classify)?;
        into_http_response(response)
    }
}

impl Default for UreqExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqExecutor").finish_non_exhaustive()
    }
}

#[async_trait]
impl HttpExecutor for UreqExecutor {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let executor = self.clone();
        tokio::task::spawn_blocking(move || executor.execute_blocking(&request))
            .await
            .map_err(|e| TransportError::new(TransportErrorKind::Other, e.to_string()))?
    }
}

fn decorate<B>(builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    let mut builder = builder
        .config()
        .timeout_global(Some(request.timeout))
        .build();
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    for (key, value) in request.query_pairs() {
        builder = builder.query(key, value);
    }
    builder
}

fn into_http_response(mut response: Response<Body>) -> Result<HttpResponse, TransportError> {
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    // No size cap: bulk listings can exceed ureq's default limit.
    let bytes = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .map_err(classify)?;
    let body = String::from_utf8_lossy(&bytes).into_owned();
    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}

fn classify(err: ureq::Error) -> TransportError {
    let kind = match &err {
        ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
        ureq::Error::Io(_) | ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => {
            TransportErrorKind::Connection
        }
        _ => TransportErrorKind::Other,
    };
    TransportError::new(kind, err.to_string())
}
