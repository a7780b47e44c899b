use crate::errors::AppError;
use crate::models::{Customer, CustomerCandidate, DeleteResponse};
use crate::openapi::ApiDoc;
use crate::services::CustomerService;
use crate::ui;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Collection and item operations over customers.
    pub customers: CustomerService,
}

/// Builds the full application: API (at `/` and `/api`), UI pages, docs and health.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(ui::list_page))
        .route("/customers/:id/view", get(ui::detail_page))
        .merge(customer_routes())
        .nest("/api", customer_routes())
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// The REST surface over the customer collection.
pub fn customer_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/",
            get(missing_customer_id)
                .put(missing_customer_id)
                .delete(missing_customer_id),
        )
        .route(
            "/customers/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

/// Reads a candidate from a raw body.
///
/// The content type is not checked: browser `fetch` calls often post JSON as
/// text/plain. An empty body is an empty candidate and fails validation.
fn parse_candidate(body: &Bytes) -> Result<CustomerCandidate, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CustomerCandidate::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Unreadable request body: {}", e);
        AppError::BadRequest("Request body must be a JSON object".to_string())
    })
}

/// Health check endpoint.
///
/// Returns the service status, version and whether the database pool has been
/// established yet. Never triggers a connect.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    let database = if state.customers.storage().is_ready() {
        "connected"
    } else {
        "not connected"
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "database": database,
        })),
    )
}

/// GET /customers
#[utoipa::path(
    get,
    path = "/customers",
    tag = "customers",
    responses(
        (status = 200, description = "All customers, newest first", body = [Customer]),
        (status = 500, description = "Storage unavailable"),
    )
)]
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Customer>>, AppError> {
    tracing::info!("GET /customers");
    Ok(Json(state.customers.list_all().await?))
}

/// POST /customers
///
/// Validates the body and stores a new customer.
#[utoipa::path(
    post,
    path = "/customers",
    tag = "customers",
    request_body = CustomerCandidate,
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 400, description = "Missing or invalid field"),
        (status = 409, description = "Member number already in use"),
        (status = 500, description = "Storage unavailable"),
    )
)]
pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    tracing::info!("POST /customers");
    let candidate = parse_candidate(&body)?;
    let customer = state.customers.create(&candidate).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /customers/{id}
#[utoipa::path(
    get,
    path = "/customers/{id}",
    tag = "customers",
    params(("id" = String, Path, description = "Customer identifier (UUID)")),
    responses(
        (status = 200, description = "The customer", body = Customer),
        (status = 400, description = "Malformed identifier"),
        (status = 404, description = "No customer with this identifier"),
        (status = 500, description = "Storage unavailable"),
    )
)]
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Customer>, AppError> {
    tracing::info!("GET /customers/{}", id);
    Ok(Json(state.customers.get_one(&id).await?))
}

/// PUT /customers/{id}
///
/// Replaces all four mutable fields.
#[utoipa::path(
    put,
    path = "/customers/{id}",
    tag = "customers",
    request_body = CustomerCandidate,
    params(("id" = String, Path, description = "Customer identifier (UUID)")),
    responses(
        (status = 200, description = "Updated customer", body = Customer),
        (status = 400, description = "Malformed identifier or invalid field"),
        (status = 404, description = "No customer with this identifier"),
        (status = 409, description = "Member number already in use"),
        (status = 500, description = "Storage unavailable"),
    )
)]
pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Customer>, AppError> {
    tracing::info!("PUT /customers/{}", id);
    // Identifier problems take precedence over body problems
    crate::services::parse_customer_id(&id)?;
    let candidate = parse_candidate(&body)?;
    Ok(Json(state.customers.update_one(&id, &candidate).await?))
}

/// DELETE /customers/{id}
#[utoipa::path(
    delete,
    path = "/customers/{id}",
    tag = "customers",
    params(("id" = String, Path, description = "Customer identifier (UUID)")),
    responses(
        (status = 200, description = "Customer removed", body = DeleteResponse),
        (status = 400, description = "Malformed identifier"),
        (status = 404, description = "No customer with this identifier"),
        (status = 500, description = "Storage unavailable"),
    )
)]
pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    tracing::info!("DELETE /customers/{}", id);
    state.customers.delete_one(&id).await?;
    Ok(Json(DeleteResponse { ok: true }))
}

/// Item routes hit with an empty identifier.
async fn missing_customer_id() -> AppError {
    AppError::InvalidIdentifier(String::new())
}
