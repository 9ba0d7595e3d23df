//! HTML views.
//!
//! Templates live as standalone files under `templates/` and are embedded at
//! compile time, so the binary carries everything it needs to render. All
//! templates end in `.html` and are therefore auto-escaped by minijinja.

use axum::{http::StatusCode, response::Html};
use minijinja::{context, Environment};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::{
    error::AppResult,
    models::{Book, BookForm, BookPage, ValidationFailure},
};

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("book_form.html", include_str!("../templates/book_form.html")),
    ("new_book.html", include_str!("../templates/new_book.html")),
    ("update_book.html", include_str!("../templates/update_book.html")),
    ("delete_book.html", include_str!("../templates/delete_book.html")),
    ("page_not_found.html", include_str!("../templates/page_not_found.html")),
    ("error.html", include_str!("../templates/error.html")),
];

static ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    for &(name, source) in TEMPLATES {
        // A broken template surfaces as a render error for that page only
        if let Err(e) = env.add_template(name, source) {
            tracing::error!("Failed to load template {}: {:?}", name, e);
        }
    }
    env
});

fn render<S: Serialize>(name: &str, ctx: S) -> Result<Html<String>, minijinja::Error> {
    let html = ENV.get_template(name)?.render(ctx)?;
    Ok(Html(html))
}

/// Book listing with pagination and search box
pub fn index(page: &BookPage) -> AppResult<Html<String>> {
    Ok(render(
        "index.html",
        context! {
            title => "Books",
            books => &page.books,
            number_of_pages => page.number_of_pages,
            page => page.page,
            search => &page.search,
        },
    )?)
}

/// Creation form, blank or filled with a rejected submission
pub fn new_book(book: &BookForm, errors: Option<&ValidationFailure>) -> AppResult<Html<String>> {
    Ok(render(
        "new_book.html",
        context! { title => "New Book", book, errors },
    )?)
}

/// Edit form for an existing book
pub fn update_book(book: &BookForm, errors: Option<&ValidationFailure>) -> AppResult<Html<String>> {
    Ok(render(
        "update_book.html",
        context! { title => "Update Book", book, errors },
    )?)
}

/// Delete confirmation
pub fn delete_book(book: &Book) -> AppResult<Html<String>> {
    Ok(render(
        "delete_book.html",
        context! { title => "Delete Book", book },
    )?)
}

/// Shown for unknown paths and listing pages out of range
pub fn page_not_found() -> AppResult<Html<String>> {
    Ok(render(
        "page_not_found.html",
        context! { title => "Page Not Found" },
    )?)
}

/// Generic error page; returns the raw template error so callers rendering
/// an `AppError` can fall back without recursing.
pub fn error_page(status: StatusCode, message: &str) -> Result<Html<String>, minijinja::Error> {
    render(
        "error.html",
        context! {
            title => "Error",
            status => status.as_u16(),
            reason => status.canonical_reason().unwrap_or("Error"),
            message,
        },
    )
}
