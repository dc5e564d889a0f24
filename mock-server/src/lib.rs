use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;

/// Credential accepted by [`app`].
pub const MOCK_API_KEY: &str = "mock-api-key";

/// First survey number handed out by the create endpoint.
pub const FIRST_SURVEY_NUMBER: u64 = 100_001;

#[derive(Debug)]
pub struct MockState {
    api_key: String,
    surveys: RwLock<HashMap<u64, Value>>,
    next_survey_number: AtomicU64,
    hits: AtomicUsize,
}

impl MockState {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            surveys: RwLock::new(HashMap::new()),
            next_survey_number: AtomicU64::new(FIRST_SURVEY_NUMBER),
            hits: AtomicUsize::new(0),
        }
    }

    /// Authorized API calls served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub type Db = Arc<MockState>;

pub fn app() -> Router {
    app_with_state(Arc::new(MockState::new(MOCK_API_KEY)))
}

pub fn app_with_state(state: Db) -> Router {
    let api = Router::new()
        .route("/Core/v1/Suppliers/AllWithAccount", get(list_suppliers))
        .route(
            "/Lookup/v1/QuestionLibrary/QuestionById/{country_language}/{question}",
            get(question_by_id),
        )
        .route("/Demand/v1/Surveys/Create", post(create_survey))
        .route("/Demand/v1/Surveys/Update/{survey_number}", put(update_survey))
        .route("/Demand/v1/Surveys/BySurveyNumber/{survey_number}", get(get_survey))
        .route("/Demand/v1/Surveys/BySurveyStatus/{status}", get(surveys_by_status))
        .route(
            "/Demand/v1/SupplierGroups/Delete/{survey_number}/{group}",
            delete(delete_supplier_group),
        )
        .route("/Demand/v1/SurveyGroups/{group}", delete(remove_from_survey_group))
        .route_layer(middleware::from_fn_with_state(state.clone(), authorize));

    api.route("/__hits", get(hits)).with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(listener: TcpListener, state: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn authorize(State(state): State<Db>, request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(state.api_key.as_str());
    if !authorized {
        debug!(uri = %request.uri(), "rejecting unauthorized request");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "Message": "Authorization has been denied for this request." })),
        )
            .into_response();
    }
    state.hits.fetch_add(1, Ordering::SeqCst);
    next.run(request).await
}

#[derive(Debug, Serialize)]
struct Hits {
    hits: usize,
}

async fn hits(State(state): State<Db>) -> Json<Hits> {
    Json(Hits { hits: state.hits() })
}

async fn list_suppliers() -> Json<Value> {
    Json(json!({
        "ResultCount": 2,
        "Suppliers": [
            { "SupplierCode": "1234", "SupplierName": "Panel One" },
            { "SupplierCode": "5678", "SupplierName": "Panel Two" }
        ]
    }))
}

async fn question_by_id(Path((country_language, question)): Path<(u64, u64)>) -> Json<Value> {
    Json(json!({
        "ResultCount": 1,
        "Question": {
            "CountryLanguageID": country_language,
            "QuestionID": question,
            "QuestionText": "What is your age?",
            "QuestionType": "Numeric - Open-end"
        }
    }))
}

async fn create_survey(
    State(state): State<Db>,
    Json(input): Json<Value>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let Some(fields) = input.as_object().filter(|o| o.contains_key("SurveyName")) else {
        return Err(bad_request("SurveyName is required"));
    };
    let survey_number = state.next_survey_number.fetch_add(1, Ordering::SeqCst);
    let mut survey = Value::Object(Map::new());
    merge(&mut survey, Value::Object(fields.clone()));
    merge(
        &mut survey,
        json!({ "SurveyNumber": survey_number }),
    );
    if survey.get("SurveyStatusCode").is_none() {
        merge(&mut survey, json!({ "SurveyStatusCode": "01" }));
    }
    state
        .surveys
        .write()
        .await
        .insert(survey_number, survey.clone());
    Ok((StatusCode::CREATED, Json(json!({ "Survey": survey }))))
}

async fn get_survey(
    State(state): State<Db>,
    Path(survey_number): Path<u64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let surveys = state.surveys.read().await;
    surveys
        .get(&survey_number)
        .map(|survey| Json(json!({ "ResultCount": 1, "Survey": survey })))
        .ok_or_else(not_found)
}

async fn update_survey(
    State(state): State<Db>,
    Path(survey_number): Path<u64>,
    Json(patch): Json<Value>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut surveys = state.surveys.write().await;
    let survey = surveys.get_mut(&survey_number).ok_or_else(not_found)?;
    merge(survey, patch);
    // The survey number is immutable.
    merge(survey, json!({ "SurveyNumber": survey_number }));
    Ok(Json(json!({ "Survey": survey.clone() })))
}

async fn surveys_by_status(
    State(state): State<Db>,
    Path(status): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let surveys = state.surveys.read().await;
    let mut matching: Vec<Value> = surveys
        .values()
        .filter(|survey| survey["SurveyStatusCode"] == status.as_str())
        .cloned()
        .collect();
    matching.sort_by_key(|survey| survey["SurveyNumber"].as_u64());
    Json(json!({
        "ResultCount": matching.len(),
        "Surveys": matching,
        "Query": query
    }))
}

async fn delete_supplier_group(Path((_survey_number, _group)): Path<(u64, u64)>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn remove_from_survey_group(Path(group): Path<u64>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "SurveyGroupID": group, "Removed": body }))
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "Message": message })))
}

fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "ResultCount": 0 })))
}

/// Shallow-merge the fields of `patch` into `target`. Non-object patches are ignored.
pub fn merge(target: &mut Value, patch: Value) {
    if let (Some(target), Value::Object(patch)) = (target.as_object_mut(), patch) {
        for (key, value) in patch {
            target.insert(key, value);
        }
    }
}
