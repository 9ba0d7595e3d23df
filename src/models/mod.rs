//! Data models for Booklist

pub mod book;

// Re-export commonly used types
pub use book::{Book, BookFields, BookForm, BookPage, BookQuery, SearchForm, ValidationFailure};
