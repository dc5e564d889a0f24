use std::sync::Arc;

use axum::http::{self, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mock_server::{app, app_with_state, MockState, FIRST_SURVEY_NUMBER, MOCK_API_KEY};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, MOCK_API_KEY)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, MOCK_API_KEY)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

async fn create(app: &Router, body: &str) -> Value {
    let resp = app
        .clone()
        .oneshot(json_request("POST", "/Demand/v1/Surveys/Create", body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

// --- auth ---

#[tokio::test]
async fn missing_authorization_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/Core/v1/Suppliers/AllWithAccount")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_authorization_returns_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/Core/v1/Suppliers/AllWithAccount")
                .header(http::header::AUTHORIZATION, "nope")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert!(body["Message"].as_str().unwrap().contains("denied"));
}

// --- lookups ---

#[tokio::test]
async fn suppliers_are_listed() {
    let resp = app()
        .oneshot(get("/Core/v1/Suppliers/AllWithAccount"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["ResultCount"], 2);
    assert_eq!(body["Suppliers"][0]["SupplierCode"], "1234");
}

#[tokio::test]
async fn question_by_id_echoes_ids() {
    let resp = app()
        .oneshot(get("/Lookup/v1/QuestionLibrary/QuestionById/9/42"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["Question"]["CountryLanguageID"], 9);
    assert_eq!(body["Question"]["QuestionID"], 42);
}

#[tokio::test]
async fn question_by_id_rejects_non_numeric_ids() {
    let resp = app()
        .oneshot(get("/Lookup/v1/QuestionLibrary/QuestionById/abc/42"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- surveys ---

#[tokio::test]
async fn create_survey_assigns_number_and_status() {
    let app = app();
    let body = create(&app, r#"{"SurveyName":"Brand tracker","CPI":1.5}"#).await;
    assert_eq!(body["Survey"]["SurveyNumber"], FIRST_SURVEY_NUMBER);
    assert_eq!(body["Survey"]["SurveyStatusCode"], "01");
    assert_eq!(body["Survey"]["CPI"], 1.5);
}

#[tokio::test]
async fn create_survey_without_name_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/Demand/v1/Surveys/Create", r#"{"CPI":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_unknown_survey_returns_404() {
    let resp = app()
        .oneshot(get("/Demand/v1/Surveys/BySurveyNumber/1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_survey_merges_fields() {
    let app = app();
    create(&app, r#"{"SurveyName":"Before"}"#).await;
    let uri = format!("/Demand/v1/Surveys/Update/{FIRST_SURVEY_NUMBER}");
    let resp = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &uri,
            r#"{"SurveyName":"After","SurveyNumber":1,"SurveyStatusCode":"03"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["Survey"]["SurveyName"], "After");
    assert_eq!(body["Survey"]["SurveyNumber"], FIRST_SURVEY_NUMBER);

    let resp = app
        .oneshot(get("/Demand/v1/Surveys/BySurveyStatus/03?page=2"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["ResultCount"], 1);
    assert_eq!(body["Query"], json!({ "page": "2" }));
}

#[tokio::test]
async fn update_unknown_survey_returns_404() {
    let resp = app()
        .oneshot(json_request("PUT", "/Demand/v1/Surveys/Update/5", r#"{"SurveyName":"x"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- groups ---

#[tokio::test]
async fn delete_supplier_group_returns_204() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/Demand/v1/SupplierGroups/Delete/7/3")
                .header(http::header::AUTHORIZATION, MOCK_API_KEY)
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn delete_from_survey_group_reads_body() {
    let resp = app()
        .oneshot(json_request("DELETE", "/Demand/v1/SurveyGroups/4", "[[10,11]]"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["Removed"], json!([[10, 11]]));
}

// --- hit counter ---

#[tokio::test]
async fn hits_count_authorized_calls_only() {
    let state = Arc::new(MockState::new(MOCK_API_KEY));
    let app = app_with_state(state.clone());
    app.clone()
        .oneshot(get("/Core/v1/Suppliers/AllWithAccount"))
        .await
        .unwrap();
    app.clone()
        .oneshot(
            Request::builder()
                .uri("/Core/v1/Suppliers/AllWithAccount")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(state.hits(), 1);

    let resp = app
        .oneshot(Request::builder().uri("/__hits").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(resp).await, json!({ "hits": 1 }));
}
