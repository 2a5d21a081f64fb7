//! Data models for the book library

pub mod book;
pub mod form;
pub mod listing;

// Re-export commonly used types
pub use book::{Book, DeleteConfirmation, NewBook};
pub use form::{BookForm, BookFormState, BookSubmission, FieldErrors, RejectionKind};
pub use listing::{BookPage, ListQuery, SortKey, SortLinks, SortOrder};
