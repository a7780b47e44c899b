use crate::handlers;
use crate::models::{Customer, CustomerCandidate, DeleteResponse};
use utoipa::OpenApi;

/// OpenAPI document for the customer API, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(title = "Customer Records API", description = "Create, list, view, edit and delete customer records"),
    paths(
        handlers::list_customers,
        handlers::create_customer,
        handlers::get_customer,
        handlers::update_customer,
        handlers::delete_customer,
    ),
    components(schemas(Customer, CustomerCandidate, DeleteResponse)),
    tags((name = "customers", description = "Customer collection and item operations"))
)]
pub struct ApiDoc;
