//! Book model, submitted form and validation rules

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationErrors};

/// Number of books shown on a listing page
pub const BOOKS_PER_PAGE: i64 = 6;

/// Field names in declaration order
const FIELDS: [&str; 4] = ["title", "author", "genre", "year"];

/// Persisted book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values accepted by the store on create or update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub year: Option<i32>,
}

/// Raw submission of the create / update forms.
///
/// Every field stays optional text so that a rejected submission can be
/// shown back to the user exactly as it was entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct BookForm {
    /// Present only when re-rendering the edit form
    #[serde(default, skip_deserializing)]
    pub id: Option<i32>,
    #[validate(
        required(message = "Please provide a value for \"Title\""),
        length(min = 1, message = "Title is required")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "Please provide a value for \"Author\""),
        length(min = 1, message = "Author is required")
    )]
    pub author: Option<String>,
    pub genre: Option<String>,
    pub year: Option<String>,
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            id: Some(book.id),
            title: Some(book.title.clone()),
            author: Some(book.author.clone()),
            genre: book.genre.clone(),
            year: book.year.map(|y| y.to_string()),
        }
    }
}

impl BookForm {
    /// Check the required-field rules and convert into storable values.
    ///
    /// Text is stored exactly as submitted; trimming only decides emptiness.
    pub fn validate_fields(&self) -> Result<BookFields, ValidationFailure> {
        // Whitespace-only values count as empty
        let trimmed = Self {
            id: self.id,
            title: self.title.as_deref().map(|s| s.trim().to_string()),
            author: self.author.as_deref().map(|s| s.trim().to_string()),
            genre: self.genre.clone(),
            year: self.year.clone(),
        };

        let mut failure = match trimmed.validate() {
            Ok(()) => ValidationFailure::default(),
            Err(errors) => ValidationFailure::from(errors),
        };

        let year = match self.year.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<i32>() {
                Ok(year) => Some(year),
                Err(_) => {
                    failure.add("year", "Year must be a whole number");
                    None
                }
            },
        };

        if !failure.is_empty() {
            return Err(failure);
        }

        Ok(BookFields {
            title: self.title.clone().unwrap_or_default(),
            author: self.author.clone().unwrap_or_default(),
            genre: self.genre.clone().filter(|g| !g.trim().is_empty()),
            year,
        })
    }
}

fn field_rank(name: &str) -> usize {
    FIELDS.iter().position(|f| *f == name).unwrap_or(FIELDS.len())
}

/// Per-field validation messages, ordered by field declaration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationFailure {
    fields: IndexMap<String, Vec<String>>,
}

impl ValidationFailure {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
        self.fields
            .sort_by(|a, _, b, _| field_rank(a).cmp(&field_rank(b)));
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages attached to one field
    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// All messages, in field order
    pub fn all_messages(&self) -> Vec<&str> {
        self.fields
            .values()
            .flat_map(|messages| messages.iter().map(String::as_str))
            .collect()
    }
}

impl From<ValidationErrors> for ValidationFailure {
    fn from(errors: ValidationErrors) -> Self {
        let mut failure = Self::default();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for \"{}\"", field));
                failure.add(&field.to_string(), message);
            }
        }
        failure
    }
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.all_messages().join("; "))
    }
}

/// Listing parameters carried in the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookQuery {
    /// 1-based page number
    pub page: Option<String>,
    pub search: Option<String>,
}

impl BookQuery {
    /// Requested page, 1 when absent. Text that is not a number resolves to
    /// 0, which is never a valid page.
    pub fn page_number(&self) -> i64 {
        match self.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(raw) => raw.parse().unwrap_or(0),
        }
    }

    pub fn search_term(&self) -> &str {
        self.search.as_deref().unwrap_or_default()
    }
}

/// Search box submission
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchForm {
    pub search: Option<String>,
}

/// One page of matching books
#[derive(Debug, Clone, Serialize)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub number_of_pages: i64,
    /// 1-based
    pub page: i64,
    pub search: String,
}

/// Number of pages needed for `count` matching books
pub fn page_count(count: i64) -> i64 {
    (count + BOOKS_PER_PAGE - 1) / BOOKS_PER_PAGE
}
