//! HTTP integration tests, driving the router over the in-memory store

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use tower::ServiceExt;

use booklist_server::{
    api::create_router,
    config::AppConfig,
    models::{Book, BookFields},
    repository::{BookStore, InMemoryBooksRepository},
    AppError, AppResult, AppState,
};

fn app() -> (Router, Arc<InMemoryBooksRepository>) {
    let store = Arc::new(InMemoryBooksRepository::new());
    let state = AppState::new(AppConfig::default(), store.clone());
    (create_router(state), store)
}

/// Store whose every round-trip fails, as when the database is unreachable
struct UnreachableStore;

fn store_down<T>() -> AppResult<T> {
    Err(AppError::Database(sqlx::Error::PoolTimedOut))
}

#[async_trait]
impl BookStore for UnreachableStore {
    async fn find_by_id(&self, _id: i32) -> AppResult<Option<Book>> {
        store_down()
    }

    async fn find_and_count(&self, _search: &str, _limit: i64, _offset: i64) -> AppResult<(Vec<Book>, i64)> {
        store_down()
    }

    async fn create(&self, _fields: &BookFields) -> AppResult<Book> {
        store_down()
    }

    async fn update(&self, _id: i32, _fields: &BookFields) -> AppResult<Option<Book>> {
        store_down()
    }

    async fn destroy(&self, _id: i32) -> AppResult<bool> {
        store_down()
    }

    async fn ping(&self) -> AppResult<()> {
        store_down()
    }
}

fn unreachable_app() -> Router {
    create_router(AppState::new(AppConfig::default(), Arc::new(UnreachableStore)))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

async fn create(app: &Router, body: &str) -> String {
    let response = app.clone().oneshot(post_form("/books/new", body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    location(&response).to_string()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = app();

    let response = app.oneshot(get("/health")).await.unwrap();
    assert!(response.status().is_success());

    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_readiness() {
    let (app, _) = app();
    let response = app.oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = unreachable_app().oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "unavailable");
}

#[tokio::test]
async fn test_store_failure_renders_error_page() {
    let response = unreachable_app()
        .oneshot(post_form("/books/new", "title=Dune&author=Frank+Herbert"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let html = body_text(response).await;
    assert!(html.contains("500"));
    assert!(!html.contains("Dune"));
    assert!(!html.contains("Frank Herbert"));
}

#[tokio::test]
async fn test_root_redirects_to_catalog() {
    let (app, _) = app();

    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/books");
}

#[tokio::test]
async fn test_create_then_show() {
    let (app, store) = app();

    let path = create(&app, "title=Dune&author=Frank+Herbert&genre=Science+Fiction&year=1965").await;
    assert_eq!(path, "/books/1");

    let book = store.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(book.title, "Dune");
    assert_eq!(book.author, "Frank Herbert");
    assert_eq!(book.genre.as_deref(), Some("Science Fiction"));
    assert_eq!(book.year, Some(1965));

    let response = app.oneshot(get(&path)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("value=\"Dune\""));
    assert!(html.contains("value=\"1965\""));
}

#[tokio::test]
async fn test_create_keeps_submitted_text() {
    let (app, store) = app();

    create(&app, "title=+Dune+&author=Frank+Herbert+&genre=+Sci-Fi").await;

    let book = store.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(book.title, " Dune ");
    assert_eq!(book.author, "Frank Herbert ");
    assert_eq!(book.genre.as_deref(), Some(" Sci-Fi"));
}

#[tokio::test]
async fn test_create_long_title() {
    let (app, store) = app();
    let title = "A".repeat(300);

    create(&app, &format!("title={}&author=Anon", title)).await;

    let book = store.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(book.title, title);
}

#[tokio::test]
async fn test_new_book_form() {
    let (app, _) = app();

    let response = app.oneshot(get("/books/new")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("action=\"/books/new\""));
}

#[tokio::test]
async fn test_create_with_empty_fields() {
    let (app, store) = app();

    let response = app
        .oneshot(post_form("/books/new", "title=&author=&genre=Poetry"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Title is required"));
    assert!(html.contains("Author is required"));
    assert!(html.contains("value=\"Poetry\""));

    let (_, count) = store.find_and_count("", 6, 0).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_create_with_missing_fields() {
    let (app, _) = app();

    let response = app.oneshot(post_form("/books/new", "genre=Poetry")).await.unwrap();
    let html = body_text(response).await;
    assert!(html.contains("Please provide a value for &quot;Title&quot;"));
    assert!(html.contains("Please provide a value for &quot;Author&quot;"));
}

#[tokio::test]
async fn test_listing_is_sorted() {
    let (app, _) = app();
    create(&app, "title=Walden&author=Thoreau").await;
    create(&app, "title=Beloved&author=Morrison").await;
    create(&app, "title=Middlemarch&author=Eliot").await;

    let response = app.oneshot(get("/books")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    let beloved = html.find("Beloved").unwrap();
    let middlemarch = html.find("Middlemarch").unwrap();
    let walden = html.find("Walden").unwrap();
    assert!(beloved < middlemarch && middlemarch < walden);
    assert!(!html.contains("class=\"pagination\""));
}

#[tokio::test]
async fn test_pagination() {
    let (app, _) = app();
    for i in 0..13 {
        create(&app, &format!("title=Volume+{:02}&author=Anon", i)).await;
    }

    let response = app.clone().oneshot(get("/books?page=3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Volume 12"));
    assert!(!html.contains("Volume 11"));
    assert!(html.contains("/books?page=3&amp;search="));

    let response = app.clone().oneshot(get("/books?page=4")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!body_text(response).await.contains("Volume"));

    let response = app.clone().oneshot(get("/books?page=5")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_text(response).await;
    assert!(html.contains("Page Not Found"));
    assert!(!html.contains("Volume"));

    let response = app.oneshot(get("/books?page=0")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_page_past_last_full_page() {
    let (app, _) = app();
    for i in 0..12 {
        create(&app, &format!("title=Volume+{:02}&author=Anon", i)).await;
    }

    let response = app.clone().oneshot(get("/books?page=3")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!body_text(response).await.contains("Volume"));

    let response = app.oneshot(get("/books?page=4")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_by_genre() {
    let (app, _) = app();
    create(&app, "title=Dune&author=Frank+Herbert&genre=Science+Fiction&year=1965").await;
    create(&app, "title=Emma&author=Jane+Austen&genre=Romance&year=1815").await;
    create(&app, "title=Hamlet&author=Shakespeare&genre=Tragedy&year=1603").await;

    let response = app.clone().oneshot(post_form("/books", "search=roman")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Emma"));
    assert!(!html.contains("Dune"));
    assert!(!html.contains("Hamlet"));

    // the term travels in the query string, not in server state
    let response = app.oneshot(get("/books")).await.unwrap();
    let html = body_text(response).await;
    assert!(html.contains("Dune") && html.contains("Emma") && html.contains("Hamlet"));
}

#[tokio::test]
async fn test_search_by_year_in_query() {
    let (app, _) = app();
    create(&app, "title=Dune&author=Frank+Herbert&year=1965").await;
    create(&app, "title=Emma&author=Jane+Austen&year=1815").await;

    let response = app.oneshot(get("/books?search=196")).await.unwrap();
    let html = body_text(response).await;
    assert!(html.contains("Dune"));
    assert!(!html.contains("Emma"));
    assert!(html.contains("value=\"196\""));
}

#[tokio::test]
async fn test_update() {
    let (app, store) = app();
    let path = create(&app, "title=Emma&author=Austen").await;

    let response = app
        .clone()
        .oneshot(post_form(&path, "title=Emma&author=Jane+Austen&year=1815"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), path);

    let book = store.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(book.author, "Jane Austen");
    assert_eq!(book.year, Some(1815));
}

#[tokio::test]
async fn test_update_with_empty_title() {
    let (app, store) = app();
    let path = create(&app, "title=Emma&author=Austen").await;

    let response = app.oneshot(post_form(&path, "title=&author=Someone+Else")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Title is required"));
    assert!(html.contains("value=\"Someone Else\""));
    assert!(html.contains("action=\"/books/1\""));

    let book = store.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(book.author, "Austen");
}

#[tokio::test]
async fn test_unknown_book() {
    let (app, store) = app();
    create(&app, "title=Emma&author=Austen").await;

    let response = app.clone().oneshot(get("/books/42")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(post_form("/books/42", "title=Other&author=Other"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get("/books/not-a-number")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let book = store.find_by_id(1).await.unwrap().unwrap();
    assert_eq!(book.title, "Emma");
}

#[tokio::test]
async fn test_delete() {
    let (app, _) = app();
    let path = create(&app, "title=Emma&author=Austen").await;

    let response = app.clone().oneshot(get(&format!("{}/delete", path))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Are you sure"));

    let response = app
        .clone()
        .oneshot(post_form(&format!("{}/delete", path), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), "/books");

    let response = app.clone().oneshot(get(&path)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get(&format!("{}/delete", path))).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.is_empty());
}

#[tokio::test]
async fn test_delete_unknown_book() {
    let (app, _) = app();

    let response = app.oneshot(post_form("/books/9/delete", "")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.is_empty());
}

#[tokio::test]
async fn test_unknown_path() {
    let (app, _) = app();

    let response = app.oneshot(get("/shelves")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Page Not Found"));
}
