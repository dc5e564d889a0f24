//! Deferred, memoized, single-shot API request.
//!
//! # Design
//! A `DeferredRequest` is created unexecuted. It is configured with the
//! `with_*` builders, then dispatched the first time anything observes it.
//! Dispatch and the caching of the in-flight future happen under one mutex
//! guard, so concurrent observers attach to the same exchange and the
//! executor is called at most once per request.
//!
//! ```text
//! Unstarted --first observation--> Pending(shared future) --completes--> Resolved(Outcome)
//! ```
//!
//! The outcome is a plain tagged value (`Outcome::Success` or
//! `Outcome::Failure`). It is never retried; a failure is terminal.

use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures::future::{self, BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ApiError, FailureKind};
use crate::executor::HttpExecutor;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::session::Session;

/// Status codes that resolve to [`Outcome::Success`].
pub const SUCCESS_STATUS_CODES: [u16; 5] = [200, 201, 202, 204, 304];

/// Only encodings the default executor can decode.
pub const ACCEPT_ENCODING: &str = "gzip";
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.8";

/// Correlation identifier attached to every request, log line and failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Terminal result of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    Failure(ApiError),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// `None` for a success.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(err) => Some(err.kind()),
        }
    }

    pub fn as_result(&self) -> Result<&Value, &ApiError> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(err) => Err(err),
        }
    }

    pub fn into_result(self) -> Result<Value, ApiError> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(err) => Err(err),
        }
    }
}

impl From<Outcome> for Result<Value, ApiError> {
    fn from(outcome: Outcome) -> Self {
        outcome.into_result()
    }
}

/// Observable lifecycle stage of a [`DeferredRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Unstarted,
    Pending,
    Resolved,
}

type SharedOutcome = Shared<BoxFuture<'static, Outcome>>;

enum State {
    Unstarted,
    Pending(SharedOutcome),
    Resolved(Outcome),
}

/// Cloneable handle on a request's outcome.
///
/// Every handle of one request resolves to the same outcome. Handles are
/// `'static` and can be moved into spawned tasks.
#[derive(Clone)]
#[must_use = "an outcome handle does nothing unless awaited"]
pub struct OutcomeHandle {
    inner: SharedOutcome,
}

impl OutcomeHandle {
    fn new(inner: SharedOutcome) -> Self {
        Self { inner }
    }

    fn resolved(outcome: Outcome) -> Self {
        Self::new(future::ready(outcome).boxed().shared())
    }

    /// The outcome, if the exchange has already completed.
    pub fn peek(&self) -> Option<&Outcome> {
        self.inner.peek()
    }
}

impl Future for OutcomeHandle {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl fmt::Debug for OutcomeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutcomeHandle")
            .field("outcome", &self.peek())
            .finish()
    }
}

/// One API call: configured first, executed once on first observation.
pub struct DeferredRequest {
    request_id: RequestId,
    path: String,
    method: HttpMethod,
    query: Map<String, Value>,
    body: Option<Value>,
    headers: Vec<(String, String)>,
    session: Arc<Session>,
    executor: Arc<dyn HttpExecutor>,
    state: Mutex<State>,
}

impl DeferredRequest {
    pub fn new(
        path: impl Into<String>,
        session: Arc<Session>,
        executor: Arc<dyn HttpExecutor>,
    ) -> Self {
        Self {
            request_id: RequestId::new(),
            path: path.into(),
            method: HttpMethod::Get,
            query: Map::new(),
            body: None,
            headers: default_headers(),
            session,
            executor,
            state: Mutex::new(State::Unstarted),
        }
    }

    pub fn id(&self) -> RequestId {
        self.request_id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn query(&self) -> &Map<String, Value> {
        &self.query
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // Configuration. Changes made after dispatch are ignored with a warning.

    /// Replace the query parameters. `null` values are dropped at dispatch.
    pub fn with_query<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let query = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.configure("query", |req| req.query = query)
    }

    pub fn with_body(self, body: impl Into<Value>) -> Self {
        let body = body.into();
        self.configure("body", |req| req.body = Some(body))
    }

    pub fn with_method(self, method: HttpMethod) -> Self {
        self.configure("method", |req| req.method = method)
    }

    /// Add a header, replacing any existing header of the same name.
    ///
    /// `Authorization` always comes from the session: a value set here is
    /// dropped by [`build_request`](Self::build_request).
    pub fn with_header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        self.configure("header", |req| {
            req.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(&name));
            req.headers.push((name, value));
        })
    }

    fn configure(mut self, setting: &'static str, apply: impl FnOnce(&mut Self)) -> Self {
        let unstarted = matches!(
            self.state.get_mut().unwrap_or_else(PoisonError::into_inner),
            State::Unstarted
        );
        if unstarted {
            apply(&mut self);
        } else {
            warn!(
                request_id = %self.request_id,
                setting,
                "request already dispatched; ignoring configuration change"
            );
        }
        self
    }

    pub fn state(&self) -> RequestState {
        match &*self.lock_state() {
            State::Unstarted => RequestState::Unstarted,
            State::Pending(shared) if shared.peek().is_none() => RequestState::Pending,
            State::Pending(_) | State::Resolved(_) => RequestState::Resolved,
        }
    }

    /// Dispatch if nobody has yet, and return a handle on the outcome.
    pub fn subscribe(&self) -> OutcomeHandle {
        let mut state = self.lock_state();
        if let State::Pending(shared) = &*state {
            if let Some(outcome) = shared.peek().cloned() {
                *state = State::Resolved(outcome);
            }
        }
        match &*state {
            State::Resolved(outcome) => OutcomeHandle::resolved(outcome.clone()),
            State::Pending(shared) => OutcomeHandle::new(shared.clone()),
            State::Unstarted => {
                let shared = self.dispatch().shared();
                *state = State::Pending(shared.clone());
                OutcomeHandle::new(shared)
            }
        }
    }

    pub async fn outcome(&self) -> Outcome {
        self.subscribe().await
    }

    /// Execute (or join the execution) and return the success payload.
    pub async fn send(&self) -> Result<Value, ApiError> {
        self.outcome().await.into_result()
    }

    /// Decode the success payload into `T`.
    pub async fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let value = self.send().await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode {
            request_id: self.request_id,
            message: e.to_string(),
        })
    }

    /// Run `f` on the outcome without changing it.
    pub async fn inspect<F>(&self, f: F) -> Outcome
    where
        F: FnOnce(&Outcome),
    {
        let outcome = self.outcome().await;
        f(&outcome);
        outcome
    }

    /// Map a failure through `f`; a success passes through untouched.
    pub async fn recover<F>(&self, f: F) -> Result<Value, ApiError>
    where
        F: FnOnce(ApiError) -> Result<Value, ApiError>,
    {
        self.send().await.or_else(f)
    }

    /// Compose the wire request from the descriptor and the session.
    pub fn build_request(&self) -> HttpRequest {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("authorization"))
            .cloned()
            .collect();
        headers.push((
            "Authorization".to_string(),
            self.session.credential().to_string(),
        ));

        HttpRequest {
            request_id: self.request_id,
            method: self.method,
            base_url: self.session.base_url().to_string(),
            path: self.path.clone(),
            query: normalize_query(&self.query),
            headers,
            body: self.body.clone().filter(|body| !is_empty_body(body)),
            timeout: self.session.request_timeout(),
        }
    }

    fn dispatch(&self) -> BoxFuture<'static, Outcome> {
        let request = self.build_request();
        let executor = Arc::clone(&self.executor);
        async move {
            let request_id = request.request_id;
            debug!(
                request_id = %request_id,
                method = %request.method,
                url = %request.url(),
                query = ?request.query,
                "sending request"
            );
            if let Some(body) = &request.body {
                debug!(request_id = %request_id, body = %body, "request with body");
            }
            match executor.execute(request).await {
                Ok(response) => classify_response(request_id, response),
                Err(source) => {
                    warn!(request_id = %request_id, error = %source, "transport failure");
                    Outcome::Failure(ApiError::Transport { request_id, source })
                }
            }
        }
        .boxed()
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for DeferredRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredRequest")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("body", &self.body)
            .field("state", &self.state())
            .finish()
    }
}

impl IntoFuture for DeferredRequest {
    type Output = Result<Value, ApiError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        async move { self.send().await }.boxed()
    }
}

impl<'a> IntoFuture for &'a DeferredRequest {
    type Output = Result<Value, ApiError>;
    type IntoFuture = BoxFuture<'a, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        self.send().boxed()
    }
}

fn default_headers() -> Vec<(String, String)> {
    [
        ("Connection", "keep-alive"),
        ("Accept", "*/*"),
        ("Accept-Encoding", ACCEPT_ENCODING),
        ("Accept-Language", ACCEPT_LANGUAGE),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Copy every entry whose value is not `null`. Names and values are kept as-is.
pub fn normalize_query(query: &Map<String, Value>) -> Map<String, Value> {
    query
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// `null` and `{}` count as "no body". Empty arrays and strings are sent.
pub fn is_empty_body(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Turn an executor response into an outcome.
pub fn classify_response(request_id: RequestId, response: HttpResponse) -> Outcome {
    debug!(
        request_id = %request_id,
        status = response.status,
        headers = ?response.headers,
        "response received"
    );
    let body = response.json_body();
    if SUCCESS_STATUS_CODES.contains(&response.status) {
        return Outcome::Success(body);
    }
    warn!(request_id = %request_id, status = response.status, "invalid status code");
    Outcome::Failure(ApiError::InvalidStatus {
        request_id,
        status: response.status,
        headers: response.headers,
        body,
    })
}
