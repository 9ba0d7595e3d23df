//! Catalog management service

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{
        book::{page_count, BOOKS_PER_PAGE},
        Book, BookForm, BookPage, ValidationFailure,
    },
    repository::BookStore,
};

/// Result of a create or update attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved(Book),
    Rejected(ValidationFailure),
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn BookStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// One page of books matching `search`.
    ///
    /// `page` is 1-based. Returns `None` when the page index is negative or
    /// exceeds the number of pages.
    pub async fn list_books(&self, search: &str, page: i64) -> AppResult<Option<BookPage>> {
        let index = page.saturating_sub(1);
        tracing::debug!("Listing books: search={:?} page={}", search, page);

        if index < 0 {
            return Ok(None);
        }

        let offset = index.saturating_mul(BOOKS_PER_PAGE);
        let (books, count) = self.store.find_and_count(search, BOOKS_PER_PAGE, offset).await?;
        let number_of_pages = page_count(count);

        if index > number_of_pages {
            return Ok(None);
        }

        Ok(Some(BookPage {
            books,
            number_of_pages,
            page,
            search: search.to_string(),
        }))
    }

    /// Get a book by ID
    pub async fn get_book(&self, id: i32) -> AppResult<Option<Book>> {
        self.store.find_by_id(id).await
    }

    /// Validate a submission and persist it as a new book
    pub async fn create_book(&self, form: &BookForm) -> AppResult<SaveOutcome> {
        let fields = match form.validate_fields() {
            Ok(fields) => fields,
            Err(failure) => return Ok(SaveOutcome::Rejected(failure)),
        };

        let book = self.store.create(&fields).await?;
        tracing::info!("Created book id={} title={:?}", book.id, book.title);
        Ok(SaveOutcome::Saved(book))
    }

    /// Validate a submission and apply it to an existing book.
    ///
    /// Returns `None` when no book has this id; nothing is written then.
    pub async fn update_book(&self, id: i32, form: &BookForm) -> AppResult<Option<SaveOutcome>> {
        if self.store.find_by_id(id).await?.is_none() {
            return Ok(None);
        }

        let fields = match form.validate_fields() {
            Ok(fields) => fields,
            Err(failure) => return Ok(Some(SaveOutcome::Rejected(failure))),
        };

        let updated = self.store.update(id, &fields).await?;
        if let Some(ref book) = updated {
            tracing::info!("Updated book id={}", book.id);
        }
        Ok(updated.map(SaveOutcome::Saved))
    }

    /// Delete a book; `false` when no book has this id
    pub async fn delete_book(&self, id: i32) -> AppResult<bool> {
        let deleted = self.store.destroy(id).await?;
        if deleted {
            tracing::info!("Deleted book id={}", id);
        }
        Ok(deleted)
    }

    /// Check the store is reachable
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}
