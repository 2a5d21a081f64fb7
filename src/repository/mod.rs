//! Repository layer for book persistence

pub mod books;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use thiserror::Error;

use crate::models::{Book, NewBook, SortOrder};

/// Failure raised by the backing store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One page of a query result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number
    pub page: i64,
    pub size: i64,
}

impl PageWindow {
    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0) * self.size
    }
}

/// Filter, order and window applied to the book collection.
///
/// Built by chaining: `BookQuery::new().matching(..).sorted_by(..).paged(..)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookQuery {
    /// Case-sensitive substring matched against title or author
    pub filter: Option<String>,
    pub sort: SortOrder,
    pub window: Option<PageWindow>,
}

impl BookQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty filters match everything
    pub fn matching(mut self, filter: Option<&str>) -> Self {
        self.filter = filter.filter(|f| !f.is_empty()).map(str::to_string);
        self
    }

    pub fn sorted_by(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn paged(mut self, page: i64, size: i64) -> Self {
        self.window = Some(PageWindow { page, size });
        self
    }
}

/// Typed access to the stored books
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a book, returning the id assigned by the store
    async fn add(&self, book: &NewBook) -> StoreResult<i32>;

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Book>>;

    /// Overwrite every field of the stored book with the same id.
    /// Returns false when no such book exists.
    async fn update(&self, book: &Book) -> StoreResult<bool>;

    /// Returns false when no such book exists
    async fn remove(&self, id: i32) -> StoreResult<bool>;

    /// Number of books matching the query filter, ignoring its window
    async fn count(&self, query: &BookQuery) -> StoreResult<i64>;

    async fn query(&self, query: &BookQuery) -> StoreResult<Vec<Book>>;
}

/// Main repository struct handed to the services
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookRepository>,
}

impl Repository {
    pub fn new(books: Arc<dyn BookRepository>) -> Self {
        Self { books }
    }

    /// Repository backed by PostgreSQL
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self::new(Arc::new(books::PgBookRepository::new(pool)))
    }

    /// Repository kept in process memory
    pub fn in_memory() -> Self {
        Self::new(Arc::new(memory::MemoryBookRepository::new()))
    }
}
