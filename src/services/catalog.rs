//! Catalog service: list, detail and the create/edit/delete flows.
//!
//! Submissions never fail with an error: validation and store problems come
//! back as a form state to re-display, delete failures as an outcome the
//! caller turns into a redirect.

use std::collections::HashMap;

use crate::{
    error::{AppError, AppResult},
    models::{
        Book, BookForm, BookFormState, BookPage, BookSubmission, DeleteConfirmation, FieldErrors,
        ListQuery, SortLinks, SortOrder,
    },
    repository::{BookQuery, Repository},
};

/// Books per list page
pub const PAGE_SIZE: i64 = 10;

pub const SAVE_FAILED_MESSAGE: &str = "Error. Could not save book";

pub const DELETE_FAILED_MESSAGE: &str =
    "Delete failed. Try again, and if the problem persists see your system administrator.";

/// Result of a create or edit submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Stored; the caller returns to the list
    Saved { id: i32 },
    /// Handed back for correction
    Rejected(BookFormState),
}

/// Result of a delete submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed,
    /// Nothing stored under that id, nothing changed
    AlreadyGone,
    /// The store refused; the record is still there
    Failed { id: i32 },
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// One page of the catalog, filtered and sorted.
    ///
    /// A new search string replaces the carried-over filter and restarts at
    /// page 1. Pages outside `1..=page_count` are clamped into that range.
    pub async fn list(&self, request: &ListQuery) -> AppResult<BookPage> {
        let (filter, requested_page) = match request.search_string.as_deref() {
            Some(search) => (Some(search), 1),
            None => (request.current_filter.as_deref(), request.page.unwrap_or(1)),
        };
        let filter = filter.filter(|f| !f.is_empty());
        let sort = SortOrder::from_token(request.sort_order.as_deref());

        let query = BookQuery::new().matching(filter).sorted_by(sort);
        let total = self.repository.books.count(&query).await?;
        let page_count = ((total + PAGE_SIZE - 1) / PAGE_SIZE).max(1);
        let page = requested_page.clamp(1, page_count);
        if page != requested_page {
            tracing::debug!("Page {} out of range, showing page {}", requested_page, page);
        }

        tracing::debug!(
            "Listing books: filter={:?} sort={:?} page={}/{}",
            filter,
            sort,
            page,
            page_count
        );
        let books = self
            .repository
            .books
            .query(&query.paged(page, PAGE_SIZE))
            .await?;

        Ok(BookPage {
            books,
            page,
            page_count,
            page_size: PAGE_SIZE,
            total,
            has_previous_page: page > 1,
            has_next_page: page < page_count,
            current_sort: sort.as_token().to_string(),
            current_filter: filter.map(str::to_string),
            sort_links: SortLinks::for_current(sort),
        })
    }

    /// Get a book by id
    pub async fn details(&self, id: Option<i32>) -> AppResult<Book> {
        let id = id.ok_or_else(|| AppError::BadRequest("Book id is required".to_string()))?;
        self.repository
            .books
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book {} not found", id)))
    }

    pub fn create_form(&self) -> BookFormState {
        BookFormState::empty()
    }

    /// Create a book from a raw submission. Any submitted id is ignored.
    pub async fn create(&self, raw: &HashMap<String, String>) -> SubmitOutcome {
        let form = BookForm {
            id: None,
            ..BookForm::extract(raw)
        };
        let submission = match form.validate_submission() {
            Ok(submission) => submission,
            Err(errors) => {
                tracing::warn!("Create rejected, invalid fields: {:?}", errors);
                return SubmitOutcome::Rejected(BookFormState::invalid(form, errors));
            }
        };

        match self.repository.books.add(&submission.book).await {
            Ok(id) => {
                tracing::info!("Created book id={} title={:?}", id, submission.book.title);
                SubmitOutcome::Saved { id }
            }
            Err(e) => {
                tracing::error!("Could not save new book: {}", e);
                SubmitOutcome::Rejected(BookFormState::not_saved(form, SAVE_FAILED_MESSAGE))
            }
        }
    }

    /// Form pre-filled with the stored book
    pub async fn edit_form(&self, id: Option<i32>) -> AppResult<BookFormState> {
        let book = self.details(id).await?;
        Ok(BookFormState::for_book(&book))
    }

    /// Replace every field of the stored book named by the submitted id
    pub async fn edit(&self, raw: &HashMap<String, String>) -> SubmitOutcome {
        let form = BookForm::extract(raw);
        let (id, book) = match form.validate_submission() {
            Ok(BookSubmission { id: Some(id), book }) => (id, book),
            other => {
                let mut errors: FieldErrors = other.err().unwrap_or_default();
                if form.id.is_none() {
                    errors.add("id", "The id field is required.");
                }
                tracing::warn!("Edit rejected, invalid fields: {:?}", errors);
                return SubmitOutcome::Rejected(BookFormState::invalid(form, errors));
            }
        };

        match self.repository.books.update(&book.with_id(id)).await {
            Ok(true) => {
                tracing::info!("Updated book id={}", id);
                SubmitOutcome::Saved { id }
            }
            Ok(false) => {
                tracing::warn!("Could not update book id={}: no longer stored", id);
                SubmitOutcome::Rejected(BookFormState::not_saved(form, SAVE_FAILED_MESSAGE))
            }
            Err(e) => {
                tracing::error!("Could not update book id={}: {}", id, e);
                SubmitOutcome::Rejected(BookFormState::not_saved(form, SAVE_FAILED_MESSAGE))
            }
        }
    }

    /// Book to confirm deletion of, with a warning when the last attempt failed
    pub async fn delete_confirmation(
        &self,
        id: Option<i32>,
        save_changes_error: bool,
    ) -> AppResult<DeleteConfirmation> {
        let book = self.details(id).await?;
        Ok(DeleteConfirmation {
            book,
            error_message: save_changes_error.then(|| DELETE_FAILED_MESSAGE.to_string()),
        })
    }

    pub async fn delete(&self, id: i32) -> DeleteOutcome {
        match self.repository.books.remove(id).await {
            Ok(true) => {
                tracing::info!("Deleted book id={}", id);
                DeleteOutcome::Removed
            }
            Ok(false) => {
                tracing::info!("Delete of book id={} skipped, not stored", id);
                DeleteOutcome::AlreadyGone
            }
            Err(e) => {
                tracing::error!("Could not delete book id={}: {}", id, e);
                DeleteOutcome::Failed { id }
            }
        }
    }

    /// Total number of stored books; fails when the store is unreachable
    pub async fn ready(&self) -> AppResult<i64> {
        Ok(self.repository.books.count(&BookQuery::new()).await?)
    }
}
