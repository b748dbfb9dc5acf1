//! End-to-end integration tests for the registry API.
//!
//! These tests start a real Axum server on a random port against the
//! in-memory store and drive it over HTTP, covering the full request path:
//! routing, JSON (de)serialization, referential checks, the cascade delete,
//! and the dashboard aggregation.

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{Value, json};

use docket::testing::memory_db;
use docket::web::server::{AppState, start_server};

struct TestServer {
    base: String,
    http: reqwest::Client,
    state: Arc<AppState>,
}

impl TestServer {
    async fn start() -> Self {
        let state = Arc::new(AppState::new(memory_db()));
        let addr: SocketAddr = "127.0.0.1:0".parse().expect("loopback addr");
        let (bound, _handle) = start_server(addr, Arc::clone(&state))
            .await
            .expect("server should start");
        Self {
            base: format!("http://{bound}/api"),
            http: reqwest::Client::new(),
            state,
        }
    }

    async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.http
            .post(format!("{}{path}", self.base))
            .json(&body)
            .send()
            .await
            .expect("request should complete")
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.http
            .get(format!("{}{path}", self.base))
            .send()
            .await
            .expect("request should complete")
    }

    async fn delete(&self, path: &str) -> reqwest::Response {
        self.http
            .delete(format!("{}{path}", self.base))
            .send()
            .await
            .expect("request should complete")
    }
}

async fn json_body(response: reqwest::Response) -> Value {
    response.json().await.expect("JSON body")
}

async fn create_client(server: &TestServer) -> Value {
    let response = server
        .post(
            "/clients",
            json!({
                "name": "Client One",
                "email": "client1@example.com",
                "phone": "555-1111",
                "address": "123 Main St"
            }),
        )
        .await;
    assert_eq!(response.status(), 200);
    json_body(response).await
}

async fn create_attorney(server: &TestServer) -> Value {
    let response = server
        .post(
            "/users",
            json!({
                "name": "John Attorney",
                "email": "john@law.example",
                "role": "attorney",
                "phone": "555-1234"
            }),
        )
        .await;
    assert_eq!(response.status(), 200);
    json_body(response).await
}

async fn create_case(server: &TestServer, client_id: &str, attorney_id: &str) -> Value {
    let response = server
        .post(
            "/cases",
            json!({
                "case_number": "CV-2026-001",
                "title": "Smith v. Jones",
                "case_type": "civil",
                "client_id": client_id,
                "assigned_attorney": attorney_id,
                "court_name": "Superior Court",
                "judge_name": "Judge Wilson",
                "description": "Contract dispute"
            }),
        )
        .await;
    assert_eq!(response.status(), 200);
    json_body(response).await
}

#[tokio::test]
async fn health_endpoint_responds() {
    let server = TestServer::start().await;
    let response = server.get("/health").await;
    assert_eq!(response.status(), 200);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn case_chain_and_cascade_delete() {
    let server = TestServer::start().await;
    let client = create_client(&server).await;
    let attorney = create_attorney(&server).await;

    // Status was omitted from the request, so the case opens active.
    let case = create_case(
        &server,
        client["id"].as_str().expect("client id"),
        attorney["id"].as_str().expect("attorney id"),
    )
    .await;
    assert_eq!(case["status"], "active");
    let case_id = case["id"].as_str().expect("case id").to_string();

    // Naive timestamp, as the SPA sends them.
    let response = server
        .post(
            "/court-dates",
            json!({
                "case_id": case_id,
                "date": "2099-09-01T10:00:00.000000",
                "court_name": "Superior Court",
                "hearing_type": "Status Conference",
                "priority": "high"
            }),
        )
        .await;
    assert_eq!(response.status(), 200);
    let court_date = json_body(response).await;
    assert_eq!(court_date["priority"], "high");

    let response = server
        .post(
            "/documents",
            json!({
                "case_id": case_id,
                "filename": "complaint.pdf",
                "category": "pleading",
                "file_data": "ZmlsaW5nIGNvbnRlbnRz",
                "file_type": "application/pdf",
                "uploaded_by": attorney["id"]
            }),
        )
        .await;
    assert_eq!(response.status(), 200);

    let response = server.delete(&format!("/cases/{case_id}")).await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        json_body(response).await["message"],
        "Case deleted successfully"
    );

    assert_eq!(server.get(&format!("/cases/{case_id}")).await.status(), 404);

    let dates = json_body(server.get(&format!("/court-dates/case/{case_id}")).await).await;
    assert_eq!(dates.as_array().expect("array").len(), 0);

    let docs = json_body(server.get(&format!("/documents/case/{case_id}")).await).await;
    assert_eq!(docs.as_array().expect("array").len(), 0);
}

#[tokio::test]
async fn create_case_with_unused_client_id_persists_nothing() {
    let server = TestServer::start().await;
    let attorney = create_attorney(&server).await;

    let response = server
        .post(
            "/cases",
            json!({
                "case_number": "CV-2026-009",
                "title": "Ghost v. Nobody",
                "case_type": "civil",
                "client_id": "b2f6f9a0-0000-0000-0000-000000000000",
                "assigned_attorney": attorney["id"],
                "court_name": "Superior Court"
            }),
        )
        .await;
    assert_eq!(response.status(), 404);
    assert_eq!(response.text().await.expect("body"), "Client not found");

    let cases = json_body(server.get("/cases").await).await;
    assert_eq!(cases.as_array().expect("array").len(), 0);
}

#[tokio::test]
async fn court_date_and_document_require_existing_case() {
    let server = TestServer::start().await;

    let response = server
        .post(
            "/court-dates",
            json!({
                "case_id": "missing",
                "date": "2099-09-01T10:00:00",
                "court_name": "Superior Court",
                "hearing_type": "Trial"
            }),
        )
        .await;
    assert_eq!(response.status(), 404);

    let response = server
        .post(
            "/documents",
            json!({
                "case_id": "missing",
                "filename": "late.pdf",
                "category": "motion",
                "file_data": "ZmlsaW5nIGNvbnRlbnRz",
                "file_type": "application/pdf",
                "uploaded_by": "someone"
            }),
        )
        .await;
    assert_eq!(response.status(), 404);

    let dates = json_body(server.get("/court-dates").await).await;
    assert_eq!(dates.as_array().expect("array").len(), 0);
}

#[tokio::test]
async fn partial_update_keeps_unsupplied_fields() {
    let server = TestServer::start().await;
    let client = create_client(&server).await;
    let attorney = create_attorney(&server).await;
    let case = create_case(
        &server,
        client["id"].as_str().expect("client id"),
        attorney["id"].as_str().expect("attorney id"),
    )
    .await;
    let case_id = case["id"].as_str().expect("case id");

    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let response = server
        .http
        .put(format!("{}/cases/{case_id}", server.base))
        .json(&json!({"title": "Smith v. Jones - Updated", "status": "settled"}))
        .send()
        .await
        .expect("request should complete");
    assert_eq!(response.status(), 200);
    let updated = json_body(response).await;

    assert_eq!(updated["title"], "Smith v. Jones - Updated");
    assert_eq!(updated["status"], "settled");
    assert_eq!(updated["case_number"], case["case_number"]);
    assert_eq!(updated["court_name"], case["court_name"]);
    assert_eq!(updated["judge_name"], case["judge_name"]);
    assert_eq!(updated["created_at"], case["created_at"]);
    let before: chrono::DateTime<chrono::Utc> = case["updated_at"]
        .as_str()
        .expect("updated_at")
        .parse()
        .expect("timestamp");
    let after: chrono::DateTime<chrono::Utc> = updated["updated_at"]
        .as_str()
        .expect("updated_at")
        .parse()
        .expect("timestamp");
    assert!(after > before);
}

#[tokio::test]
async fn invalid_enum_values_are_unprocessable() {
    let server = TestServer::start().await;
    let response = server
        .post(
            "/users",
            json!({
                "name": "Mx. Nobody",
                "email": "nobody@law.example",
                "role": "janitor"
            }),
        )
        .await;
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn dashboard_reflects_live_state() {
    let server = TestServer::start().await;
    let client = create_client(&server).await;
    let attorney = create_attorney(&server).await;
    let case = create_case(
        &server,
        client["id"].as_str().expect("client id"),
        attorney["id"].as_str().expect("attorney id"),
    )
    .await;

    // One hearing inside the 30-day window, one far outside it.
    let soon = (chrono::Utc::now() + chrono::Duration::days(5))
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let far = (chrono::Utc::now() + chrono::Duration::days(90))
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    for date in [&soon, &far] {
        let response = server
            .post(
                "/court-dates",
                json!({
                    "case_id": case["id"],
                    "date": date,
                    "court_name": "Superior Court",
                    "hearing_type": "Hearing"
                }),
            )
            .await;
        assert_eq!(response.status(), 200);
    }

    let stats = json_body(server.get("/dashboard/stats").await).await;
    assert_eq!(stats["total_cases"], 1);
    assert_eq!(stats["active_cases"], 1);
    assert_eq!(stats["upcoming_court_dates"], 2);
    assert_eq!(stats["total_clients"], 1);

    let upcoming = json_body(server.get("/dashboard/upcoming-dates").await).await;
    let upcoming = upcoming.as_array().expect("array");
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0]["case_title"], "Smith v. Jones");
    assert_eq!(upcoming[0]["case_number"], "CV-2026-001");
}

#[tokio::test]
async fn graceful_shutdown_stops_the_listener() {
    let server = TestServer::start().await;
    assert_eq!(server.get("/health").await.status(), 200);

    server.state.shutdown().await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let result = server.http.get(format!("{}/health", server.base)).send().await;
    assert!(result.is_err() || result.is_ok_and(|r| !r.status().is_success()));
}
