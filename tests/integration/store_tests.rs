//! The same filter, sort, window and write cases against both book stores

use book_library::{
    models::{Book, NewBook, SortOrder},
    repository::{books::PgBookRepository, memory::MemoryBookRepository, BookQuery, BookRepository},
};
use sqlx::postgres::PgPoolOptions;

fn new_book(title: &str, author: &str, year: Option<i32>, rating: i32) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: author.to_string(),
        isbn: "0000000000".to_string(),
        year,
        rating,
        ..NewBook::default()
    }
}

async fn titles(store: &dyn BookRepository, query: BookQuery) -> Vec<String> {
    store
        .query(&query)
        .await
        .expect("Query failed")
        .into_iter()
        .map(|b| b.title)
        .collect()
}

/// Runs against an empty store
async fn check_store(store: &dyn BookRepository) {
    let mut ids = Vec::new();
    for (title, author, year, rating) in [
        ("Dune", "Herbert", Some(1965), 9),
        ("Emma", "Austen", Some(1815), 7),
        ("dune notes", "Anon", None, 2),
        ("Zebra", "apple", Some(2000), 9),
        ("alpha", "Zed", None, 5),
    ] {
        ids.push(store.add(&new_book(title, author, year, rating)).await.expect("Add failed"));
    }

    // Case-sensitive substring on title or author, no wildcards
    assert_eq!(titles(store, BookQuery::new().matching(Some("Dune"))).await, vec!["Dune"]);
    assert_eq!(
        titles(store, BookQuery::new().matching(Some("une"))).await,
        vec!["Dune", "dune notes"]
    );
    assert_eq!(titles(store, BookQuery::new().matching(Some("Aust"))).await, vec!["Emma"]);
    assert!(titles(store, BookQuery::new().matching(Some("%"))).await.is_empty());
    assert!(titles(store, BookQuery::new().matching(Some("_"))).await.is_empty());
    assert_eq!(store.count(&BookQuery::new().matching(Some("une"))).await.unwrap(), 2);
    assert_eq!(store.count(&BookQuery::new()).await.unwrap(), 5);

    // Byte order, uppercase first
    assert_eq!(
        titles(store, BookQuery::new()).await,
        vec!["Dune", "Emma", "Zebra", "alpha", "dune notes"]
    );
    assert_eq!(
        titles(store, BookQuery::new().sorted_by(SortOrder::AuthorAsc)).await,
        vec!["dune notes", "Emma", "Dune", "alpha", "Zebra"]
    );

    // Missing years lowest, ties by id
    assert_eq!(
        titles(store, BookQuery::new().sorted_by(SortOrder::YearAsc)).await,
        vec!["dune notes", "alpha", "Emma", "Dune", "Zebra"]
    );
    assert_eq!(
        titles(store, BookQuery::new().sorted_by(SortOrder::YearDesc)).await,
        vec!["Zebra", "Dune", "Emma", "dune notes", "alpha"]
    );
    assert_eq!(
        titles(store, BookQuery::new().sorted_by(SortOrder::RatingDesc)).await,
        vec!["Dune", "Zebra", "Emma", "alpha", "dune notes"]
    );

    // Window
    assert_eq!(titles(store, BookQuery::new().paged(2, 2)).await, vec!["Zebra", "alpha"]);
    assert_eq!(titles(store, BookQuery::new().paged(3, 2)).await, vec!["dune notes"]);
    assert!(titles(store, BookQuery::new().paged(4, 2)).await.is_empty());

    // Full-row update
    let replacement = Book {
        id: ids[0],
        title: "Dune".to_string(),
        author: "Frank Herbert".to_string(),
        isbn: String::new(),
        image: None,
        year: None,
        description: Some("Spice".to_string()),
        wishlist: true,
        finish: false,
        taken: true,
        rating: 10,
    };
    assert!(store.update(&replacement).await.unwrap());
    assert_eq!(store.find_by_id(ids[0]).await.unwrap(), Some(replacement.clone()));
    assert!(!store.update(&Book { id: 9999, ..replacement }).await.unwrap());

    // Remove, and ids are not reused
    assert!(store.remove(ids[4]).await.unwrap());
    assert!(!store.remove(ids[4]).await.unwrap());
    assert!(store.find_by_id(ids[4]).await.unwrap().is_none());
    let next = store.add(&new_book("Omega", "X", None, 1)).await.unwrap();
    assert!(!ids.contains(&next));
}

#[tokio::test]
async fn test_memory_store() {
    check_store(&MemoryBookRepository::new()).await;
}

#[tokio::test]
#[ignore] // Run with: DATABASE_URL=postgres://... cargo test -- --ignored (wipes the books table)
async fn test_postgres_store() {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    sqlx::query("TRUNCATE books RESTART IDENTITY")
        .execute(&pool)
        .await
        .expect("Failed to clear books");

    check_store(&PgBookRepository::new(pool)).await;
}
