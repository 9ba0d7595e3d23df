//! Repository layer: the book store seam and its implementations

pub mod books;
pub mod memory;

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{Book, BookFields},
};

pub use books::BooksRepository;
pub use memory::InMemoryBooksRepository;

/// Persistence operations the catalog relies on.
///
/// Implementations never validate: callers hand over already checked
/// [`BookFields`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Look a book up by primary key
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>>;

    /// Books where title, author, genre or year contain `search`, ordered by
    /// title, together with the total number of matches.
    async fn find_and_count(&self, search: &str, limit: i64, offset: i64) -> AppResult<(Vec<Book>, i64)>;

    /// Insert a new book and return it with its assigned id
    async fn create(&self, fields: &BookFields) -> AppResult<Book>;

    /// Overwrite an existing book; `None` when no book has this id
    async fn update(&self, id: i32, fields: &BookFields) -> AppResult<Option<Book>>;

    /// Remove a book; `false` when no book has this id
    async fn destroy(&self, id: i32) -> AppResult<bool>;

    /// Cheap round-trip used by the readiness check
    async fn ping(&self) -> AppResult<()>;
}

/// Escape LIKE wildcards so the search term matches literally
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
