//! Book catalog endpoints

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    error::AppResult,
    models::{
        listing::lenient, Book, BookForm, BookFormState, BookPage, DeleteConfirmation, ListQuery,
        RejectionKind,
    },
    services::catalog::{DeleteOutcome, SubmitOutcome},
    AppState,
};

/// Where successful submissions land
pub const BOOKS_PATH: &str = "/books";

/// Optional query-string parameters of the show endpoints
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShowParams {
    /// Book id, when not given in the path
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i32>,
    /// Set after a failed delete
    #[serde(rename = "saveChangesError", alias = "save_changes_error")]
    #[serde(default, deserialize_with = "lenient")]
    pub save_changes_error: Option<bool>,
}

impl ShowParams {
    fn retrying(&self) -> bool {
        self.save_changes_error.unwrap_or(false)
    }
}

pub fn delete_retry_path(id: i32) -> String {
    format!("{}/delete/{}?saveChangesError=true", BOOKS_PATH, id)
}

impl IntoResponse for SubmitOutcome {
    fn into_response(self) -> Response {
        match self {
            SubmitOutcome::Saved { .. } => Redirect::to(BOOKS_PATH).into_response(),
            SubmitOutcome::Rejected(form) => {
                let status = match form.rejection {
                    Some(RejectionKind::PersistenceFailed) => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, Json(form)).into_response()
            }
        }
    }
}

impl IntoResponse for DeleteOutcome {
    fn into_response(self) -> Response {
        match self {
            DeleteOutcome::Removed | DeleteOutcome::AlreadyGone => {
                Redirect::to(BOOKS_PATH).into_response()
            }
            DeleteOutcome::Failed { id } => Redirect::to(&delete_retry_path(id)).into_response(),
        }
    }
}

/// List books with search, sort and pagination
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of books", body = BookPage)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<BookPage>> {
    let page = state.services.catalog.list(&query).await?;
    Ok(Json(page))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/details/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_details(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.details(Some(id)).await?;
    Ok(Json(book))
}

/// Get book details by `?id=`
#[utoipa::path(
    get,
    path = "/books/details",
    tag = "books",
    params(ShowParams),
    responses(
        (status = 200, description = "Book details", body = Book),
        (status = 400, description = "Missing book id"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_details_by_query(
    State(state): State<AppState>,
    Query(params): Query<ShowParams>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.details(params.id).await?;
    Ok(Json(book))
}

/// Empty form for a new book
#[utoipa::path(
    get,
    path = "/books/create",
    tag = "books",
    responses(
        (status = 200, description = "Empty form", body = BookFormState)
    )
)]
pub async fn show_create(State(state): State<AppState>) -> Json<BookFormState> {
    Json(state.services.catalog.create_form())
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books/create",
    tag = "books",
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Book created, redirect to the list"),
        (status = 422, description = "Invalid fields", body = BookFormState),
        (status = 503, description = "Book could not be saved", body = BookFormState)
    )
)]
pub async fn submit_create(
    State(state): State<AppState>,
    Form(raw): Form<HashMap<String, String>>,
) -> SubmitOutcome {
    state.services.catalog.create(&raw).await
}

/// Form pre-filled with a stored book
#[utoipa::path(
    get,
    path = "/books/edit/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Filled form", body = BookFormState),
        (status = 404, description = "Book not found")
    )
)]
pub async fn show_edit(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookFormState>> {
    let form = state.services.catalog.edit_form(Some(id)).await?;
    Ok(Json(form))
}

/// Form pre-filled with the book named by `?id=`
#[utoipa::path(
    get,
    path = "/books/edit",
    tag = "books",
    params(ShowParams),
    responses(
        (status = 200, description = "Filled form", body = BookFormState),
        (status = 400, description = "Missing book id"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn show_edit_by_query(
    State(state): State<AppState>,
    Query(params): Query<ShowParams>,
) -> AppResult<Json<BookFormState>> {
    let form = state.services.catalog.edit_form(params.id).await?;
    Ok(Json(form))
}

/// Replace the book named in the path
#[utoipa::path(
    post,
    path = "/books/edit/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID, used when the form has none")),
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Book updated, redirect to the list"),
        (status = 422, description = "Invalid fields", body = BookFormState),
        (status = 503, description = "Book could not be saved", body = BookFormState)
    )
)]
pub async fn submit_edit(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Form(mut raw): Form<HashMap<String, String>>,
) -> SubmitOutcome {
    fill_missing_id(&mut raw, id);
    state.services.catalog.edit(&raw).await
}

/// Replace the book named by the form's `id` field
#[utoipa::path(
    post,
    path = "/books/edit",
    tag = "books",
    request_body(content = BookForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Book updated, redirect to the list"),
        (status = 422, description = "Invalid fields", body = BookFormState),
        (status = 503, description = "Book could not be saved", body = BookFormState)
    )
)]
pub async fn submit_edit_by_form(
    State(state): State<AppState>,
    Form(raw): Form<HashMap<String, String>>,
) -> SubmitOutcome {
    state.services.catalog.edit(&raw).await
}

/// Path id stands in for an absent or blank form id
fn fill_missing_id(raw: &mut HashMap<String, String>, id: i32) {
    let blank = raw.get("id").map_or(true, |v| v.trim().is_empty());
    if blank {
        raw.insert("id".to_string(), id.to_string());
    }
}

/// Ask for delete confirmation
#[utoipa::path(
    get,
    path = "/books/delete/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID"), ShowParams),
    responses(
        (status = 200, description = "Book to delete", body = DeleteConfirmation),
        (status = 404, description = "Book not found")
    )
)]
pub async fn show_delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<ShowParams>,
) -> AppResult<Json<DeleteConfirmation>> {
    let confirmation = state
        .services
        .catalog
        .delete_confirmation(Some(id), params.retrying())
        .await?;
    Ok(Json(confirmation))
}

/// Ask for delete confirmation of the book named by `?id=`
#[utoipa::path(
    get,
    path = "/books/delete",
    tag = "books",
    params(ShowParams),
    responses(
        (status = 200, description = "Book to delete", body = DeleteConfirmation),
        (status = 400, description = "Missing book id"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn show_delete_by_query(
    State(state): State<AppState>,
    Query(params): Query<ShowParams>,
) -> AppResult<Json<DeleteConfirmation>> {
    let confirmation = state
        .services
        .catalog
        .delete_confirmation(params.id, params.retrying())
        .await?;
    Ok(Json(confirmation))
}

/// Delete a book
#[utoipa::path(
    post,
    path = "/books/delete/{id}",
    tag = "books",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 303, description = "Redirect to the list, or back to the confirmation with saveChangesError=true")
    )
)]
pub async fn submit_delete(State(state): State<AppState>, Path(id): Path<i32>) -> DeleteOutcome {
    state.services.catalog.delete(id).await
}
