//! Axum HTTP server for the case registry API.
//!
//! All routes live under `/api`. Handlers stay thin: plain reads go straight
//! to the store, anything with referential or cascade semantics goes through
//! `crate::registry`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use chrono::Utc;
use tokio::sync::{RwLock, oneshot};
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::{CaseRecord, ClientRecord, CourtDateRecord, Database, DocumentRecord, UserRecord};
use crate::error::{DatabaseError, ServerError};
use crate::registry::dashboard::{DashboardStats, UpcomingCourtDate};
use crate::registry::{RegistryError, cases, court_dates, dashboard, documents};
use crate::web::types::*;

/// Request bodies are small JSON payloads, except document uploads.
const BODY_LIMIT: usize = 1024 * 1024;
/// Document uploads carry base64 file content.
const DOCUMENT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Shared state for all API handlers.
pub struct AppState {
    /// Store handle, threaded into every handler.
    pub db: Arc<dyn Database>,
    /// Shutdown signal sender, armed by `start_server`.
    shutdown_tx: RwLock<Option<oneshot::Sender<()>>>,
}

impl AppState {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self {
            db,
            shutdown_tx: RwLock::new(None),
        }
    }

    /// Ask the server to stop accepting connections and drain.
    pub async fn shutdown(&self) {
        if let Some(tx) = self.shutdown_tx.write().await.take() {
            let _ = tx.send(());
        }
    }
}

/// Start the registry HTTP server.
///
/// Binds `addr` (useful with port 0), spawns the accept loop, and returns
/// the bound address plus the serve task handle. The task finishes after
/// [`AppState::shutdown`] fires and in-flight requests drain.
pub async fn start_server(
    addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<(SocketAddr, JoinHandle<()>), ServerError> {
    let listener =
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::StartupFailed {
                name: "registry api".to_string(),
                reason: format!("failed to bind {addr}: {e}"),
            })?;
    let bound_addr = listener
        .local_addr()
        .map_err(|e| ServerError::StartupFailed {
            name: "registry api".to_string(),
            reason: format!("failed to read local addr: {e}"),
        })?;

    let api = Router::new()
        .route("/api/health", get(health_handler))
        // Users
        .route("/api/users", post(create_user_handler).get(list_users_handler))
        .route("/api/users/{id}", get(get_user_handler))
        // Clients
        .route(
            "/api/clients",
            post(create_client_handler).get(list_clients_handler),
        )
        .route("/api/clients/{id}", get(get_client_handler))
        // Cases
        .route("/api/cases", post(create_case_handler).get(list_cases_handler))
        .route(
            "/api/cases/{id}",
            get(get_case_handler)
                .put(update_case_handler)
                .delete(delete_case_handler),
        )
        // Court dates
        .route(
            "/api/court-dates",
            post(create_court_date_handler).get(list_court_dates_handler),
        )
        .route(
            "/api/court-dates/case/{case_id}",
            get(list_court_dates_by_case_handler),
        )
        .route("/api/court-dates/{id}", delete(delete_court_date_handler))
        // Documents
        .route(
            "/api/documents",
            post(create_document_handler).layer(DefaultBodyLimit::max(DOCUMENT_BODY_LIMIT)),
        )
        .route(
            "/api/documents/case/{case_id}",
            get(list_documents_by_case_handler),
        )
        .route("/api/documents/{id}", delete(delete_document_handler))
        // Dashboard
        .route("/api/dashboard/stats", get(dashboard_stats_handler))
        .route("/api/dashboard/upcoming-dates", get(upcoming_dates_handler));

    // The registry fronts a separately-served SPA, so cross-origin access
    // stays permissive.
    let app = api
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::clone(&state));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    *state.shutdown_tx.write().await = Some(shutdown_tx);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("registry api shutting down");
            })
            .await
        {
            tracing::error!("registry api server error: {e}");
        }
    });

    Ok((bound_addr, handle))
}

// --- Error mapping ---

fn not_found(what: &'static str) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("{what} not found"))
}

fn database_error(err: DatabaseError) -> (StatusCode, String) {
    tracing::error!(error = %err, "store operation failed");
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

fn registry_error(err: RegistryError) -> (StatusCode, String) {
    match err {
        RegistryError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        RegistryError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()),
        RegistryError::Database(db_err) => database_error(db_err),
    }
}

// --- Health ---

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// --- Users ---

async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<UserRecord>, (StatusCode, String)> {
    let user = state
        .db
        .create_user(&req.into())
        .await
        .map_err(database_error)?;
    Ok(Json(user))
}

async fn list_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserRecord>>, (StatusCode, String)> {
    let users = state.db.list_users().await.map_err(database_error)?;
    Ok(Json(users))
}

async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserRecord>, (StatusCode, String)> {
    state
        .db
        .get_user(&id)
        .await
        .map_err(database_error)?
        .map(Json)
        .ok_or_else(|| not_found("User"))
}

// --- Clients ---

async fn create_client_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateClientRequest>,
) -> Result<Json<ClientRecord>, (StatusCode, String)> {
    let client = state
        .db
        .create_client(&req.into())
        .await
        .map_err(database_error)?;
    Ok(Json(client))
}

async fn list_clients_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ClientRecord>>, (StatusCode, String)> {
    let clients = state.db.list_clients().await.map_err(database_error)?;
    Ok(Json(clients))
}

async fn get_client_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ClientRecord>, (StatusCode, String)> {
    state
        .db
        .get_client(&id)
        .await
        .map_err(database_error)?
        .map(Json)
        .ok_or_else(|| not_found("Client"))
}

// --- Cases ---

async fn create_case_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCaseRequest>,
) -> Result<Json<CaseRecord>, (StatusCode, String)> {
    let case = cases::create_case(state.db.as_ref(), req.into())
        .await
        .map_err(registry_error)?;
    Ok(Json(case))
}

async fn list_cases_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CaseRecord>>, (StatusCode, String)> {
    let cases = state.db.list_cases().await.map_err(database_error)?;
    Ok(Json(cases))
}

async fn get_case_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CaseRecord>, (StatusCode, String)> {
    state
        .db
        .get_case(&id)
        .await
        .map_err(database_error)?
        .map(Json)
        .ok_or_else(|| not_found("Case"))
}

async fn update_case_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCaseRequest>,
) -> Result<Json<CaseRecord>, (StatusCode, String)> {
    let case = cases::update_case(state.db.as_ref(), &id, req.into())
        .await
        .map_err(registry_error)?;
    Ok(Json(case))
}

async fn delete_case_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    cases::delete_case(state.db.as_ref(), &id)
        .await
        .map_err(registry_error)?;
    Ok(Json(MessageResponse {
        message: "Case deleted successfully",
    }))
}

// --- Court dates ---

async fn create_court_date_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCourtDateRequest>,
) -> Result<Json<CourtDateRecord>, (StatusCode, String)> {
    let court_date = court_dates::create_court_date(state.db.as_ref(), req.into())
        .await
        .map_err(registry_error)?;
    Ok(Json(court_date))
}

async fn list_court_dates_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CourtDateRecord>>, (StatusCode, String)> {
    let court_dates = state.db.list_court_dates().await.map_err(database_error)?;
    Ok(Json(court_dates))
}

async fn list_court_dates_by_case_handler(
    State(state): State<Arc<AppState>>,
    Path(case_id): Path<String>,
) -> Result<Json<Vec<CourtDateRecord>>, (StatusCode, String)> {
    let court_dates = state
        .db
        .list_court_dates_for_case(&case_id)
        .await
        .map_err(database_error)?;
    Ok(Json(court_dates))
}

async fn delete_court_date_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    court_dates::delete_court_date(state.db.as_ref(), &id)
        .await
        .map_err(registry_error)?;
    Ok(Json(MessageResponse {
        message: "Court date deleted successfully",
    }))
}

// --- Documents ---

async fn create_document_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<Json<DocumentRecord>, (StatusCode, String)> {
    let document = documents::create_document(state.db.as_ref(), req.into())
        .await
        .map_err(registry_error)?;
    Ok(Json(document))
}

async fn list_documents_by_case_handler(
    State(state): State<Arc<AppState>>,
    Path(case_id): Path<String>,
) -> Result<Json<Vec<DocumentRecord>>, (StatusCode, String)> {
    let documents = state
        .db
        .list_documents_for_case(&case_id)
        .await
        .map_err(database_error)?;
    Ok(Json(documents))
}

async fn delete_document_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    documents::delete_document(state.db.as_ref(), &id)
        .await
        .map_err(registry_error)?;
    Ok(Json(MessageResponse {
        message: "Document deleted successfully",
    }))
}

// --- Dashboard ---

async fn dashboard_stats_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardStats>, (StatusCode, String)> {
    let stats = dashboard::stats(state.db.as_ref(), Utc::now())
        .await
        .map_err(registry_error)?;
    Ok(Json(stats))
}

async fn upcoming_dates_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UpcomingCourtDate>>, (StatusCode, String)> {
    let upcoming = dashboard::upcoming_court_dates(state.db.as_ref(), Utc::now())
        .await
        .map_err(registry_error)?;
    Ok(Json(upcoming))
}
