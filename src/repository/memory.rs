//! In-memory book repository, used for tests and local runs without a database.
//! Matching and ordering follow the PostgreSQL repository exactly.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BookQuery, BookRepository, StoreError, StoreResult};
use crate::models::{Book, NewBook, SortKey, SortOrder};

struct Shelf {
    next_id: i32,
    books: BTreeMap<i32, Book>,
}

pub struct MemoryBookRepository {
    shelf: RwLock<Shelf>,
    writes_failing: AtomicBool,
}

impl Default for MemoryBookRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBookRepository {
    pub fn new() -> Self {
        Self {
            shelf: RwLock::new(Shelf {
                next_id: 1,
                books: BTreeMap::new(),
            }),
            writes_failing: AtomicBool::new(false),
        }
    }

    /// Test hook: make every add/update/remove fail as if the store were
    /// down. Reads keep working. Never called by the server itself.
    pub fn set_writes_failing(&self, failing: bool) {
        self.writes_failing.store(failing, AtomicOrdering::SeqCst);
    }

    /// Number of stored books, for test assertions
    pub async fn len(&self) -> usize {
        self.shelf.read().await.books.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.writes_failing.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable("writes are disabled".to_string()));
        }
        Ok(())
    }
}

fn matches(book: &Book, filter: Option<&str>) -> bool {
    match filter {
        Some(f) => book.title.contains(f) || book.author.contains(f),
        None => true,
    }
}

/// Byte-order strings, `None` below any year, ties by id
fn compare(sort: SortOrder, a: &Book, b: &Book) -> Ordering {
    let ordering = match sort.key() {
        SortKey::Title => a.title.cmp(&b.title),
        SortKey::Author => a.author.cmp(&b.author),
        SortKey::Rating => a.rating.cmp(&b.rating),
        SortKey::Year => a.year.cmp(&b.year),
    };
    let ordering = if sort.is_descending() {
        ordering.reverse()
    } else {
        ordering
    };
    ordering.then(a.id.cmp(&b.id))
}

#[async_trait]
impl BookRepository for MemoryBookRepository {
    async fn add(&self, book: &NewBook) -> StoreResult<i32> {
        self.check_writable()?;
        let mut shelf = self.shelf.write().await;
        let id = shelf.next_id;
        shelf.next_id += 1;
        shelf.books.insert(id, book.clone().with_id(id));
        Ok(id)
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Book>> {
        Ok(self.shelf.read().await.books.get(&id).cloned())
    }

    async fn update(&self, book: &Book) -> StoreResult<bool> {
        self.check_writable()?;
        let mut shelf = self.shelf.write().await;
        match shelf.books.get_mut(&book.id) {
            Some(stored) => {
                *stored = book.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: i32) -> StoreResult<bool> {
        self.check_writable()?;
        Ok(self.shelf.write().await.books.remove(&id).is_some())
    }

    async fn count(&self, query: &BookQuery) -> StoreResult<i64> {
        let shelf = self.shelf.read().await;
        let total = shelf
            .books
            .values()
            .filter(|b| matches(b, query.filter.as_deref()))
            .count();
        Ok(total as i64)
    }

    async fn query(&self, query: &BookQuery) -> StoreResult<Vec<Book>> {
        let shelf = self.shelf.read().await;
        let mut books: Vec<Book> = shelf
            .books
            .values()
            .filter(|b| matches(b, query.filter.as_deref()))
            .cloned()
            .collect();
        books.sort_by(|a, b| compare(query.sort, a, b));

        if let Some(window) = query.window {
            let offset = usize::try_from(window.offset()).unwrap_or(0);
            let size = usize::try_from(window.size).unwrap_or(0);
            books = books.into_iter().skip(offset).take(size).collect();
        }
        Ok(books)
    }
}
