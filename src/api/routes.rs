use std::sync::Arc;

use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};

use super::handlers;
use crate::domain::FixedPoint;
use crate::engine::AtmProcessor;
use crate::storage::{ConcurrentAccountStore, InMemoryTransactionLog, PersistenceMode};

/// Processor behind the HTTP service
pub type AtmService = AtmProcessor<
    FixedPoint,
    ConcurrentAccountStore<FixedPoint>,
    InMemoryTransactionLog<FixedPoint>,
    PersistenceMode,
>;

#[derive(Clone)]
pub struct AppState {
    pub atm: Arc<AtmService>,
}

impl AppState {
    pub fn new(atm: AtmService) -> Self {
        Self { atm: Arc::new(atm) }
    }
}

/// Full application router, every route nested under `/api`
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/insertCard", post(handlers::insert_card))
        .route("/verifyBiometric", post(handlers::verify_biometric))
        .route("/verifyPin", post(handlers::verify_pin))
        .route("/transaction", post(handlers::transaction))
        .route("/balance/:card_number", get(handlers::balance))
        .route("/transactions", get(handlers::transactions))
        .route("/transactions/export", get(handlers::export_transactions))
        .route("/ejectCard", post(handlers::eject_card))
        .route("/status", get(handlers::status))
        .route("/accounts", get(handlers::accounts))
        .route("/accounts/add", post(handlers::add_account))
        .route(
            "/accounts/delete/:card_number",
            delete(handlers::delete_account),
        );

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn(cors_middleware))
        .with_state(state)
}

/// Permissive CORS; preflight requests are answered without routing
async fn cors_middleware(req: Request, next: Next) -> Response {
    let mut resp = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    let headers = resp.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,POST,DELETE,OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("content-type"),
    );
    resp
}
