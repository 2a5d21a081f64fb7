//! PostgreSQL book repository.
//!
//! Every call runs on a connection checked out of the pool for that call
//! only; the pool guard hands it back on all exit paths.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{BookQuery, BookRepository, StoreResult};
use crate::models::{Book, NewBook, SortKey, SortOrder};

const BOOK_COLUMNS: &str =
    "id, title, author, isbn, image, year, description, wishlist, finish, taken, rating";

/// `strpos` keeps the match case-sensitive and free of LIKE wildcards
const FILTER_CLAUSE: &str =
    "($1::text IS NULL OR strpos(title, $1) > 0 OR strpos(author, $1) > 0)";

/// Text columns compare bytewise; NULL years sort lowest; id breaks ties.
fn order_clause(sort: SortOrder) -> String {
    let column = match sort.key() {
        SortKey::Title => r#"title COLLATE "C""#,
        SortKey::Author => r#"author COLLATE "C""#,
        SortKey::Rating => "rating",
        SortKey::Year => "year",
    };
    let direction = if sort.is_descending() {
        "DESC NULLS LAST"
    } else {
        "ASC NULLS FIRST"
    };
    format!("{} {}, id ASC", column, direction)
}

#[derive(Clone)]
pub struct PgBookRepository {
    pool: Pool<Postgres>,
}

impl PgBookRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for PgBookRepository {
    async fn add(&self, book: &NewBook) -> StoreResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (title, author, isbn, image, year, description,
                               wishlist, finish, taken, rating)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.image)
        .bind(book.year)
        .bind(&book.description)
        .bind(book.wishlist)
        .bind(book.finish)
        .bind(book.taken)
        .bind(book.rating)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Option<Book>> {
        let query = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn update(&self, book: &Book) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $2, author = $3, isbn = $4, image = $5, year = $6,
                description = $7, wishlist = $8, finish = $9, taken = $10, rating = $11
            WHERE id = $1
            "#,
        )
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.image)
        .bind(book.year)
        .bind(&book.description)
        .bind(book.wishlist)
        .bind(book.finish)
        .bind(book.taken)
        .bind(book.rating)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, query: &BookQuery) -> StoreResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM books WHERE {}", FILTER_CLAUSE);
        let total = sqlx::query_scalar::<_, i64>(&sql)
            .bind(query.filter.as_deref())
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn query(&self, query: &BookQuery) -> StoreResult<Vec<Book>> {
        // NULL limit and offset mean "no window"
        let sql = format!(
            "SELECT {} FROM books WHERE {} ORDER BY {} LIMIT $2 OFFSET $3",
            BOOK_COLUMNS,
            FILTER_CLAUSE,
            order_clause(query.sort)
        );
        tracing::debug!("Book query: {}", sql);

        let books = sqlx::query_as::<_, Book>(&sql)
            .bind(query.filter.as_deref())
            .bind(query.window.map(|w| w.size))
            .bind(query.window.map(|w| w.offset()))
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }
}
