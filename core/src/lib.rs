//! Async client for the survey marketplace REST API.
//!
//! # Overview
//! Every endpoint method on [`LucidClient`] validates its arguments, builds
//! a path and returns a [`DeferredRequest`]. The request is sent the first
//! time it is observed (`.await`, `send`, `outcome`, `subscribe`, ...) and
//! its [`Outcome`] is cached, so observing it again never issues a second
//! call.
//!
//! # Design
//! - The network is an [`HttpExecutor`] capability. [`UreqExecutor`] is the
//!   default; tests plug in recording executors.
//! - Deployment target and credentials live in an immutable [`Session`]
//!   shared by `Arc`; there is no process-wide mutable state.
//! - Response bodies are passed through as `serde_json::Value`; the client
//!   does not model the API's business objects.
//!
//! ```no_run
//! # async fn run() -> Result<(), lucid_core::ApiError> {
//! use lucid_core::{Environment, LucidClient, Session};
//!
//! let client = LucidClient::new(Session::new(Environment::Sandbox).api_key("key"));
//! let question = client.get_question_text(9, 42)?;
//! let payload = question.send().await?;
//! let again = question.send().await?; // cached, no second call
//! assert_eq!(payload, again);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod executor;
pub mod http;
pub mod request;
pub mod session;
pub mod types;
pub mod validate;

pub use client::{LucidClient, DEFAULT_BUNDLES};
pub use error::{ApiError, ConfigError, FailureKind, TransportError, TransportErrorKind, ValidationError};
pub use executor::{HttpExecutor, UreqExecutor};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::{DeferredRequest, Outcome, OutcomeHandle, RequestId, RequestState};
pub use session::{Environment, Session};
pub use types::{ReconcileRequest, SupplierLinkCreate, SupplierLinkUpdate, TrackingType};
pub use validate::{DateArg, PathArg};
