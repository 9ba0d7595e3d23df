//! In-memory book store, used by tests and local demos

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::BookStore;
use crate::{
    error::AppResult,
    models::{Book, BookFields},
};

#[derive(Default)]
struct Shelf {
    last_id: i32,
    books: BTreeMap<i32, Book>,
}

#[derive(Default)]
pub struct InMemoryBooksRepository {
    shelf: RwLock<Shelf>,
}

impl InMemoryBooksRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(book: &Book, needle: &str) -> bool {
    let contains = |value: &str| value.to_lowercase().contains(needle);
    contains(&book.title)
        || contains(&book.author)
        || book.genre.as_deref().is_some_and(contains)
        || book.year.is_some_and(|y| contains(&y.to_string()))
}

#[async_trait]
impl BookStore for InMemoryBooksRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        Ok(self.shelf.read().await.books.get(&id).cloned())
    }

    async fn find_and_count(&self, search: &str, limit: i64, offset: i64) -> AppResult<(Vec<Book>, i64)> {
        let needle = search.to_lowercase();
        let shelf = self.shelf.read().await;

        let mut found: Vec<&Book> = shelf.books.values().filter(|b| matches(b, &needle)).collect();
        found.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));

        let total = found.len() as i64;
        let books = found
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();

        Ok((books, total))
    }

    async fn create(&self, fields: &BookFields) -> AppResult<Book> {
        let mut shelf = self.shelf.write().await;
        shelf.last_id += 1;

        let now = Utc::now();
        let book = Book {
            id: shelf.last_id,
            title: fields.title.clone(),
            author: fields.author.clone(),
            genre: fields.genre.clone(),
            year: fields.year,
            created_at: now,
            updated_at: now,
        };
        shelf.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn update(&self, id: i32, fields: &BookFields) -> AppResult<Option<Book>> {
        let mut shelf = self.shelf.write().await;
        let Some(book) = shelf.books.get_mut(&id) else {
            return Ok(None);
        };

        book.title = fields.title.clone();
        book.author = fields.author.clone();
        book.genre = fields.genre.clone();
        book.year = fields.year;
        book.updated_at = Utc::now();
        Ok(Some(book.clone()))
    }

    async fn destroy(&self, id: i32) -> AppResult<bool> {
        Ok(self.shelf.write().await.books.remove(&id).is_some())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
