//! PostgreSQL book store

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};

use super::{escape_like, BookStore};
use crate::{
    error::AppResult,
    models::{Book, BookFields},
};

const SEARCH_CLAUSE: &str = r#"
    title ILIKE $1
    OR author ILIKE $1
    OR genre ILIKE $1
    OR CAST(year AS TEXT) ILIKE $1
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, genre, year, created_at, updated_at FROM books WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }

    async fn find_and_count(&self, search: &str, limit: i64, offset: i64) -> AppResult<(Vec<Book>, i64)> {
        let pattern = format!("%{}%", escape_like(search));

        let count_query = format!("SELECT COUNT(*) FROM books WHERE {}", SEARCH_CLAUSE);
        let total: i64 = sqlx::query_scalar(&count_query)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await?;

        let select_query = format!(
            r#"
            SELECT id, title, author, genre, year, created_at, updated_at
            FROM books
            WHERE {}
            ORDER BY title ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
            SEARCH_CLAUSE
        );

        let books = sqlx::query_as::<_, Book>(&select_query)
            .bind(&pattern)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    async fn create(&self, fields: &BookFields) -> AppResult<Book> {
        let now = Utc::now();

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, genre, year, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, author, genre, year, created_at, updated_at
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.author)
        .bind(&fields.genre)
        .bind(fields.year)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(book)
    }

    async fn update(&self, id: i32, fields: &BookFields) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = $1,
                author = $2,
                genre = $3,
                year = $4,
                updated_at = $5
            WHERE id = $6
            RETURNING id, title, author, genre, year, created_at, updated_at
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.author)
        .bind(&fields.genre)
        .bind(fields.year)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    async fn destroy(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
