//! Book catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};

use crate::{
    error::{AppError, AppResult},
    models::{BookForm, BookQuery, SearchForm},
    services::catalog::SaveOutcome,
    views, AppState,
};

/// Catalog root, relative to the site root
pub const CATALOG_ROOT: &str = "/books";

fn book_path(id: i32) -> String {
    format!("{}/{}", CATALOG_ROOT, id)
}

/// 302 redirect
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Ids that do not parse cannot name a stored book
fn parse_id(raw: &str) -> Option<i32> {
    raw.parse().ok()
}

fn unknown_book(raw: &str) -> AppError {
    AppError::BadRequest(format!("No book with id {}", raw))
}

/// Site root redirects to the catalog
pub async fn root() -> Response {
    found(CATALOG_ROOT)
}

/// List books, filtered by the `search` query parameter
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Response> {
    render_listing(&state, query.search_term(), query.page_number()).await
}

/// Submit the search box; the listing page comes from the query string
pub async fn search_books(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
    Form(form): Form<SearchForm>,
) -> AppResult<Response> {
    let search = form.search.unwrap_or_default();
    render_listing(&state, &search, query.page_number()).await
}

async fn render_listing(state: &AppState, search: &str, page: i64) -> AppResult<Response> {
    match state.services.catalog.list_books(search, page).await? {
        Some(page) => Ok(views::index(&page)?.into_response()),
        None => Ok((StatusCode::NOT_FOUND, views::page_not_found()?).into_response()),
    }
}

/// Blank creation form
pub async fn new_book_form() -> AppResult<Html<String>> {
    views::new_book(&BookForm::default(), None)
}

/// Create a new book
pub async fn create_book(
    State(state): State<AppState>,
    Form(form): Form<BookForm>,
) -> AppResult<Response> {
    match state.services.catalog.create_book(&form).await? {
        SaveOutcome::Saved(book) => Ok(found(&book_path(book.id))),
        SaveOutcome::Rejected(failure) => Ok(views::new_book(&form, Some(&failure))?.into_response()),
    }
}

/// Edit form for an existing book
pub async fn edit_book_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let book = match parse_id(&id) {
        Some(book_id) => state.services.catalog.get_book(book_id).await?,
        None => None,
    }
    .ok_or_else(|| unknown_book(&id))?;

    views::update_book(&BookForm::from(&book), None)
}

/// Update an existing book
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(mut form): Form<BookForm>,
) -> AppResult<Response> {
    let book_id = parse_id(&id).ok_or_else(|| unknown_book(&id))?;

    match state.services.catalog.update_book(book_id, &form).await? {
        Some(SaveOutcome::Saved(book)) => Ok(found(&book_path(book.id))),
        Some(SaveOutcome::Rejected(failure)) => {
            form.id = Some(book_id);
            Ok(views::update_book(&form, Some(&failure))?.into_response())
        }
        None => Err(unknown_book(&id)),
    }
}

/// Delete confirmation page
pub async fn delete_book_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let Some(book_id) = parse_id(&id) else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    match state.services.catalog.get_book(book_id).await? {
        Some(book) => Ok(views::delete_book(&book)?.into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}

/// Delete a book and return to the listing
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let Some(book_id) = parse_id(&id) else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    if state.services.catalog.delete_book(book_id).await? {
        Ok(found(CATALOG_ROOT))
    } else {
        Ok(StatusCode::NOT_FOUND.into_response())
    }
}

/// Fallback for unknown paths
pub async fn page_not_found() -> AppResult<Response> {
    Ok((StatusCode::NOT_FOUND, views::page_not_found()?).into_response())
}
