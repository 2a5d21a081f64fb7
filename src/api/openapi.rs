//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Book Library API",
        version = "0.1.0",
        description = "Book catalog with search, sort and pagination"
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::list_books,
        books::book_details,
        books::book_details_by_query,
        books::show_create,
        books::submit_create,
        books::show_edit,
        books::show_edit_by_query,
        books::submit_edit,
        books::submit_edit_by_form,
        books::show_delete,
        books::show_delete_by_query,
        books::submit_delete,
    ),
    components(
        schemas(
            // Books
            crate::models::book::Book,
            crate::models::book::DeleteConfirmation,
            crate::models::form::BookForm,
            crate::models::form::BookFormState,
            crate::models::form::RejectionKind,
            crate::models::listing::BookPage,
            crate::models::listing::SortLinks,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
