//! API integration tests

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use book_library::{
    api::create_router,
    config::AppConfig,
    models::NewBook,
    repository::{memory::MemoryBookRepository, BookRepository, Repository},
    AppState,
};

fn app(store: Arc<MemoryBookRepository>) -> Router {
    create_router(AppState::new(AppConfig::default(), Repository::new(store)))
}

/// Store holding Dune (1965) and Dune Messiah (1969), ids 1 and 2
async fn dune_store() -> Arc<MemoryBookRepository> {
    let store = Arc::new(MemoryBookRepository::new());
    for (title, year) in [("Dune", 1965), ("Dune Messiah", 1969)] {
        store
            .add(&NewBook {
                title: title.to_string(),
                author: "Herbert".to_string(),
                isbn: "0441013597".to_string(),
                year: Some(year),
                rating: 8,
                ..NewBook::default()
            })
            .await
            .expect("Failed to seed store");
    }
    store
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone()
        .oneshot(request)
        .await
        .expect("Failed to send request")
}

async fn get(app: &Router, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_form(app: &Router, uri: &str, form: &str) -> Response {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    send(app, request).await
}

async fn json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Failed to parse response")
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION]
        .to_str()
        .expect("Invalid location header")
}

fn titles(body: &Value) -> Vec<String> {
    body["books"]
        .as_array()
        .expect("No books array")
        .iter()
        .map(|b| b["title"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let app = app(Arc::new(MemoryBookRepository::new()));

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["status"], "healthy");

    let response = get(&app, "/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["books"], 0);
}

#[tokio::test]
async fn test_root_redirects_to_list() {
    let app = app(Arc::new(MemoryBookRepository::new()));

    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/books");
}

#[tokio::test]
async fn test_search_and_sort() {
    let app = app(dune_store().await);

    let response = get(&app, "/books?searchString=Dune&sortOrder=year_desc").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json(response).await;
    assert_eq!(titles(&body), vec!["Dune Messiah", "Dune"]);
    assert_eq!(body["current_sort"], "year_desc");
    assert_eq!(body["current_filter"], "Dune");
    assert_eq!(body["sort_links"]["year"], "year_asc");
    assert_eq!(body["sort_links"]["title"], "");

    let body = json(get(&app, "/books?searchString=Herbert").await).await;
    assert_eq!(titles(&body), vec!["Dune", "Dune Messiah"]);
    assert_eq!(body["sort_links"]["title"], "title_desc");
}

#[tokio::test]
async fn test_paging_keeps_filter() {
    let store = Arc::new(MemoryBookRepository::new());
    for i in 0..23 {
        store
            .add(&NewBook {
                title: format!("Book {:02}", i),
                author: (if i % 2 == 0 { "Even" } else { "Odd" }).to_string(),
                isbn: "1".to_string(),
                rating: 5,
                ..NewBook::default()
            })
            .await
            .unwrap();
    }
    let app = app(store);

    let body = json(get(&app, "/books?currentFilter=Even&page=2").await).await;
    assert_eq!(body["total"], 12);
    assert_eq!(body["page"], 2);
    assert_eq!(titles(&body), vec!["Book 20", "Book 22"]);

    let body = json(get(&app, "/books?searchString=Even&page=2").await).await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["books"].as_array().map(Vec::len), Some(10));

    let body = json(get(&app, "/books?page=40").await).await;
    assert_eq!(body["page"], 3);
    assert_eq!(body["has_next_page"], false);
}

#[tokio::test]
async fn test_blank_or_garbage_page_shows_first_page() {
    let app = app(dune_store().await);

    for uri in ["/books?page=", "/books?page=abc", "/books?searchString=&page="] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        let body = json(response).await;
        assert_eq!(body["page"], 1, "{}", uri);
        assert_eq!(body["total"], 2, "{}", uri);
    }
}

#[tokio::test]
async fn test_blank_query_id_is_missing_id() {
    let app = app(dune_store().await);

    let response = get(&app, "/books/details?id=").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(response).await["error"], "BadValue");

    let response = get(&app, "/books/delete?id=2&saveChangesError=").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json(response).await["error_message"].is_null());
}

#[tokio::test]
async fn test_details() {
    let app = app(dune_store().await);

    assert_eq!(get(&app, "/books/details").await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get(&app, "/books/details/99").await.status(), StatusCode::NOT_FOUND);

    let response = get(&app, "/books/details/2").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json(response).await["title"], "Dune Messiah");

    let response = get(&app, "/books/details?id=1").await;
    assert_eq!(json(response).await["title"], "Dune");

    let response = get(&app, "/books/edit?id=2").await;
    assert_eq!(json(response).await["values"]["title"], "Dune Messiah");
}

#[tokio::test]
async fn test_create_form_is_empty() {
    let app = app(Arc::new(MemoryBookRepository::new()));

    let body = json(get(&app, "/books/create").await).await;
    assert!(body["values"]["title"].is_null());
    assert!(body["rejection"].is_null());
}

#[tokio::test]
async fn test_create_without_title_is_rejected() {
    let store = Arc::new(MemoryBookRepository::new());
    let app = app(store.clone());

    let response = post_form(&app, "/books/create", "author=Herbert&isbn=0441013597&rating=8").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json(response).await;
    assert_eq!(body["rejection"], "validation_failed");
    assert!(body["errors"]["title"].is_array());
    assert_eq!(body["values"]["author"], "Herbert");
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_create_redirects_to_list() {
    let store = Arc::new(MemoryBookRepository::new());
    let app = app(store.clone());

    let response = post_form(
        &app,
        "/books/create",
        "title=Dune&author=Herbert&isbn=0441013597&year=1965&rating=9&wishlist=true&role=admin",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/books");

    let stored = store.find_by_id(1).await.unwrap().expect("Book not stored");
    assert_eq!(stored.title, "Dune");
    assert!(stored.wishlist);
}

#[tokio::test]
async fn test_create_with_title_and_rating_only() {
    let store = Arc::new(MemoryBookRepository::new());
    let app = app(store.clone());

    let response = post_form(&app, "/books/create", "title=Dune&rating=9").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let stored = store.find_by_id(1).await.unwrap().expect("Book not stored");
    assert_eq!(stored.title, "Dune");
    assert_eq!(stored.author, "");
    assert_eq!(stored.isbn, "");
    assert_eq!(stored.rating, 9);
}

#[tokio::test]
async fn test_create_store_failure() {
    let store = Arc::new(MemoryBookRepository::new());
    store.set_writes_failing(true);
    let app = app(store.clone());

    let response = post_form(&app, "/books/create", "title=Dune&author=Herbert&isbn=1&rating=9").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = json(response).await;
    assert_eq!(body["rejection"], "persistence_failed");
    assert_eq!(body["form_errors"][0], "Error. Could not save book");
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_edit_round_trip() {
    let store = dune_store().await;
    let app = app(store.clone());

    let body = json(get(&app, "/books/edit/1").await).await;
    assert_eq!(body["values"]["title"], "Dune");
    assert_eq!(body["values"]["id"], "1");

    let response = post_form(
        &app,
        "/books/edit/1",
        "title=Dune&author=Frank+Herbert&isbn=0441013597&rating=10&taken=on",
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let stored = store.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(stored.author, "Frank Herbert");
    assert_eq!(stored.rating, 10);
    assert_eq!(stored.year, None);
    assert!(stored.taken);
}

#[tokio::test]
async fn test_edit_path_id_replaces_blank_form_id() {
    let store = dune_store().await;
    let app = app(store.clone());

    let response = post_form(&app, "/books/edit/2", "id=&title=Messiah&author=Herbert&rating=6").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let stored = store.find_by_id(2).await.unwrap().unwrap();
    assert_eq!(stored.title, "Messiah");
    assert_eq!(stored.rating, 6);
}

#[tokio::test]
async fn test_edit_invalid_year_is_rejected() {
    let store = dune_store().await;
    let app = app(store.clone());

    let response = post_form(
        &app,
        "/books/edit",
        "id=1&title=Dune&author=Herbert&isbn=0441013597&rating=10&year=soon",
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json(response).await["errors"]["year"].is_array());
    assert_eq!(store.find_by_id(1).await.unwrap().unwrap().year, Some(1965));
}

#[tokio::test]
async fn test_delete_flow() {
    let store = dune_store().await;
    let app = app(store.clone());

    let body = json(get(&app, "/books/delete/1").await).await;
    assert_eq!(body["book"]["title"], "Dune");
    assert!(body["error_message"].is_null());

    let response = post_form(&app, "/books/delete/1", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/books");
    assert!(store.find_by_id(1).await.unwrap().is_none());
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_delete_unknown_id_is_harmless() {
    let store = dune_store().await;
    let app = app(store.clone());

    let response = post_form(&app, "/books/delete/42", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/books");
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_delete_failure_returns_to_confirmation() {
    let store = dune_store().await;
    store.set_writes_failing(true);
    let app = app(store.clone());

    let response = post_form(&app, "/books/delete/1", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let retry = location(&response).to_string();
    assert_eq!(retry, "/books/delete/1?saveChangesError=true");
    assert!(store.find_by_id(1).await.unwrap().is_some());

    let body = json(get(&app, &retry).await).await;
    assert_eq!(body["book"]["id"], 1);
    assert_eq!(
        body["error_message"],
        "Delete failed. Try again, and if the problem persists see your system administrator."
    );
}

#[tokio::test]
async fn test_openapi_document() {
    let app = app(Arc::new(MemoryBookRepository::new()));

    let response = get(&app, "/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(json(response).await["paths"]["/books"].is_object());
}
