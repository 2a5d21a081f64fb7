//! Book model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Stored book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    /// Store-assigned identifier, never reused
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    /// Cover image path or URL
    pub image: Option<String>,
    /// Publication year
    pub year: Option<i32>,
    pub description: Option<String>,
    pub wishlist: bool,
    /// Reading completed
    pub finish: bool,
    /// Currently on loan
    pub taken: bool,
    /// Reader's score
    pub rating: i32,
}

/// Book data that passed validation and has no id yet
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct NewBook {
    #[validate(length(min = 1, max = 255, message = "The title field is required (255 characters max)."))]
    pub title: String,
    /// Empty when not given
    #[validate(length(max = 255, message = "The author must be at most 255 characters."))]
    pub author: String,
    /// Empty when not given; not unique
    #[validate(length(max = 20, message = "The isbn must be at most 20 characters."))]
    pub isbn: String,
    #[validate(length(max = 500, message = "The image reference must be at most 500 characters."))]
    pub image: Option<String>,
    pub year: Option<i32>,
    #[validate(length(max = 4000, message = "The description must be at most 4000 characters."))]
    pub description: Option<String>,
    pub wishlist: bool,
    pub finish: bool,
    pub taken: bool,
    pub rating: i32,
}

impl NewBook {
    /// Attach an identifier, producing the full record to store
    pub fn with_id(self, id: i32) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            image: self.image,
            year: self.year,
            description: self.description,
            wishlist: self.wishlist,
            finish: self.finish,
            taken: self.taken,
            rating: self.rating,
        }
    }
}

/// Delete confirmation view data
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeleteConfirmation {
    pub book: Book,
    /// Set when a previous delete attempt failed
    pub error_message: Option<String>,
}
