//! Endpoint façade for the survey marketplace API.
//!
//! # Design
//! `LucidClient` holds an immutable [`Session`] and an [`HttpExecutor`],
//! both behind `Arc`s. Every endpoint method validates its identifying
//! arguments, fills a path template and returns one unexecuted
//! [`DeferredRequest`]. Nothing touches the network until the caller
//! observes the request.
//!
//! Endpoints are grouped by API family in the `lookup`, `supply` and
//! `demand` submodules. Methods that cannot fail validation return the
//! request directly; the rest return `Result<DeferredRequest, ValidationError>`.

mod demand;
mod lookup;
mod supply;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::error::ConfigError;
use crate::executor::{HttpExecutor, UreqExecutor};
use crate::http::HttpMethod;
use crate::request::DeferredRequest;
use crate::session::{Environment, Session};

/// Lookup bundles fetched when none are named.
pub const DEFAULT_BUNDLES: [&str; 6] = [
    "CountryLanguages",
    "Industries",
    "SampleTypes",
    "StudyTypes",
    "SupplierLinkTypes",
    "SurveyStatuses",
];

#[derive(Clone)]
pub struct LucidClient {
    session: Arc<Session>,
    executor: Arc<dyn HttpExecutor>,
}

impl LucidClient {
    /// Client using the blocking ureq executor.
    pub fn new(session: Session) -> Self {
        Self::with_executor(session, UreqExecutor::new())
    }

    pub fn with_executor(session: Session, executor: impl HttpExecutor + 'static) -> Self {
        Self {
            session: Arc::new(session),
            executor: Arc::new(executor),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(Session::from_env()?))
    }

    /// Switch deployment target. Requests created earlier keep their session.
    pub fn with_environment(self, environment: Environment) -> Self {
        self.reconfigure(|session| session.environment(environment))
    }

    pub fn with_api_key(self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.reconfigure(|session| session.api_key(api_key))
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.reconfigure(|session| session.timeout(timeout))
    }

    fn reconfigure(mut self, change: impl FnOnce(Session) -> Session) -> Self {
        self.session = Arc::new(change(Session::clone(&self.session)));
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Raw request against `path`, relative to the session's base address.
    pub fn request(&self, path: impl Into<String>) -> DeferredRequest {
        DeferredRequest::new(path, Arc::clone(&self.session), Arc::clone(&self.executor))
    }

    fn write(&self, method: HttpMethod, path: String, body: Value) -> DeferredRequest {
        self.request(path).with_method(method).with_body(body)
    }
}

impl fmt::Debug for LucidClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LucidClient")
            .field("base_url", &self.session.base_url())
            .field("environment", &self.session.current_environment())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TransportError, ValidationError};
    use crate::http::{HttpRequest, HttpResponse};
    use crate::request::RequestState;
    use crate::types::{SupplierLinkCreate, TrackingType};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use serde_json::json;

    struct Offline;

    #[async_trait]
    impl HttpExecutor for Offline {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            Err(TransportError::connection("offline"))
        }
    }

    fn client() -> LucidClient {
        LucidClient::with_executor(Session::default().api_key("key"), Offline)
    }

    fn link(tracking: TrackingType) -> SupplierLinkCreate {
        SupplierLinkCreate {
            supplier_link_type_code: "OWS".to_string(),
            tracking_type_code: tracking,
            default_link: None,
            success_link: None,
            failure_link: None,
            over_quota_link: None,
            quality_termination_link: None,
        }
    }

    #[test]
    fn question_text_path() {
        let req = client().get_question_text(123, 321).unwrap();
        assert_eq!(req.path(), "/Lookup/v1/QuestionLibrary/QuestionById/123/321");
        assert_eq!(req.method(), HttpMethod::Get);
        assert_eq!(req.state(), RequestState::Unstarted);
    }

    #[test]
    fn question_text_requires_both_ids() {
        let err = client().get_question_text(None::<u64>, None::<u64>).unwrap_err();
        assert_eq!(err, ValidationError::MissingArgument("CountryLanguageID"));
        assert!(err.to_string().contains("CountryLanguageID"));

        let err = client().get_question_text(123, None::<u64>).unwrap_err();
        assert_eq!(err, ValidationError::MissingArgument("QuestionID"));
    }

    #[test]
    fn global_definitions_default_bundles() {
        let req = client().get_global_definitions(Vec::<&str>::new());
        assert_eq!(
            req.path(),
            "/Lookup/v1/BasicLookups/BundledLookups/CountryLanguages,Industries,SampleTypes,StudyTypes,SupplierLinkTypes,SurveyStatuses"
        );
    }

    #[test]
    fn global_definitions_named_bundles() {
        let req = client().get_global_definitions(["qwe"]);
        assert_eq!(req.path(), "/Lookup/v1/BasicLookups/BundledLookups/qwe");
        let req = client().get_global_definitions(vec!["qwe".to_string(), "asd".to_string()]);
        assert_eq!(req.path(), "/Lookup/v1/BasicLookups/BundledLookups/qwe,asd");
    }

    #[test]
    fn create_link_posts_payload() {
        let req = client().create_link("1234", 77, &link(TrackingType::S2s)).unwrap();
        assert_eq!(req.path(), "/Supply/v1/SupplierLinks/Create/77/1234");
        assert_eq!(req.method(), HttpMethod::Post);
        assert_eq!(req.body().unwrap()["TrackingTypeCode"], "S2S");
    }

    #[test]
    fn create_link_rejects_unknown_tracking_type() {
        let err = client()
            .create_link("1234", 77, &json!({"SupplierLinkTypeCode": "OWS", "TrackingTypeCode": "COOKIE"}))
            .unwrap_err();
        assert_eq!(err.argument(), "data.TrackingTypeCode");
    }

    #[test]
    fn recently_allocated_surveys_formats_dates() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let req = client().get_recently_allocated_surveys(day, "55").unwrap();
        assert_eq!(
            req.path(),
            "/Supply/v1/Surveys/SupplierAllocations/ByDate/2024-02-29/55"
        );
        let err = client()
            .get_recently_allocated_surveys("29.02.2024", "55")
            .unwrap_err();
        assert_eq!(err.argument(), "date");
    }

    #[test]
    fn demand_qualified_respondents_checks_supplier_first() {
        let err = client()
            .get_demand_qualified_respondents(None::<u64>, None::<&str>)
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingArgument("SupplierCode"));
    }

    #[test]
    fn reconcile_wraps_response_ids() {
        let req = client().reconcile_survey(9, ["a", "b"]).unwrap();
        assert_eq!(req.method(), HttpMethod::Post);
        assert_eq!(req.body(), Some(&json!({"ResponseIDs": ["a", "b"]})));
    }

    #[test]
    fn add_to_group_keeps_supplier_code_type() {
        let req = client().add_to_group(9, 3, 1234).unwrap();
        assert_eq!(req.body(), Some(&json!({"SupplierCode": 1234})));
        let req = client().remove_from_group(9, "1234").unwrap();
        assert_eq!(req.method(), HttpMethod::Put);
        assert_eq!(req.body(), Some(&json!({"SupplierCode": "1234"})));
    }

    #[test]
    fn survey_group_membership_wraps_ids() {
        let req = client()
            .delete_from_demand_survey_group(4, &json!([10, 11]))
            .unwrap();
        assert_eq!(req.method(), HttpMethod::Delete);
        assert_eq!(req.path(), "/Demand/v1/SurveyGroups/4");
        assert_eq!(req.body(), Some(&json!([[10, 11]])));
    }

    #[test]
    fn reconfigured_client_does_not_touch_existing_requests() {
        let client = client();
        let before = client.get_suppliers();
        let client = client
            .with_environment(Environment::Sandbox)
            .with_api_key("other");
        let after = client.get_suppliers();
        assert_eq!(before.session().current_environment(), Some(Environment::Production));
        assert_eq!(before.session().credential(), "key");
        assert_eq!(after.session().base_url(), "https://stg-api.samplicio.us/");
        assert_eq!(after.session().credential(), "other");
    }

    #[test]
    fn each_call_creates_a_fresh_request() {
        let client = client();
        let a = client.get_business_units();
        let b = client.get_business_units();
        assert_ne!(a.id(), b.id());
    }
}
