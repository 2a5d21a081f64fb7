//! Form submission handling: allow-listed field extraction, parsing and
//! re-displayable form state.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use super::book::{Book, NewBook};

/// Fields a submission may bind. Anything else in the raw input is dropped.
pub const BOOK_FIELDS: [&str; 11] = [
    "id",
    "title",
    "author",
    "isbn",
    "image",
    "year",
    "description",
    "wishlist",
    "finish",
    "taken",
    "rating",
];

/// Field-level error messages, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    fn merge_validation(&mut self, errors: &ValidationErrors) {
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("The {} field is invalid ({}).", field, err.code));
                self.add(field.to_string(), message);
            }
        }
    }
}

/// Raw submitted values, one slot per bindable field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookForm {
    pub id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub image: Option<String>,
    pub year: Option<String>,
    pub description: Option<String>,
    pub wishlist: Option<String>,
    pub finish: Option<String>,
    pub taken: Option<String>,
    pub rating: Option<String>,
}

/// A parsed and validated submission
#[derive(Debug, Clone, PartialEq)]
pub struct BookSubmission {
    pub id: Option<i32>,
    pub book: NewBook,
}

impl BookForm {
    /// Copy the allow-listed fields out of a raw submission.
    /// Blank values count as absent.
    pub fn extract(raw: &HashMap<String, String>) -> Self {
        let mut form = Self::default();
        for (name, value) in raw {
            let value = (!value.trim().is_empty()).then(|| value.clone());
            let slot = match name.as_str() {
                "id" => &mut form.id,
                "title" => &mut form.title,
                "author" => &mut form.author,
                "isbn" => &mut form.isbn,
                "image" => &mut form.image,
                "year" => &mut form.year,
                "description" => &mut form.description,
                "wishlist" => &mut form.wishlist,
                "finish" => &mut form.finish,
                "taken" => &mut form.taken,
                "rating" => &mut form.rating,
                other => {
                    tracing::debug!("Ignoring unbound form field '{}'", other);
                    continue;
                }
            };
            *slot = value;
        }
        form
    }

    /// Parse the raw values into typed book data and check field constraints.
    /// All problems are collected, not just the first one.
    pub fn validate_submission(&self) -> Result<BookSubmission, FieldErrors> {
        let mut errors = FieldErrors::default();

        let id = parse_int(&mut errors, "id", self.id.as_deref());
        let year = parse_int(&mut errors, "year", self.year.as_deref());
        let rating = parse_int(&mut errors, "rating", self.rating.as_deref());
        if self.rating.is_none() {
            errors.add("rating", "The rating field is required.");
        }

        let book = NewBook {
            title: self.title.clone().unwrap_or_default(),
            author: self.author.clone().unwrap_or_default(),
            isbn: self.isbn.clone().unwrap_or_default(),
            image: self.image.clone(),
            year,
            description: self.description.clone(),
            wishlist: parse_flag(&mut errors, "wishlist", self.wishlist.as_deref()),
            finish: parse_flag(&mut errors, "finish", self.finish.as_deref()),
            taken: parse_flag(&mut errors, "taken", self.taken.as_deref()),
            rating: rating.unwrap_or_default(),
        };

        if let Err(e) = book.validate() {
            errors.merge_validation(&e);
        }

        if errors.is_empty() {
            Ok(BookSubmission { id, book })
        } else {
            Err(errors)
        }
    }
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            id: Some(book.id.to_string()),
            title: Some(book.title.clone()),
            author: Some(book.author.clone()),
            isbn: Some(book.isbn.clone()),
            image: book.image.clone(),
            year: book.year.map(|y| y.to_string()),
            description: book.description.clone(),
            wishlist: Some(book.wishlist.to_string()),
            finish: Some(book.finish.to_string()),
            taken: Some(book.taken.to_string()),
            rating: Some(book.rating.to_string()),
        }
    }
}

fn parse_int(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> Option<i32> {
    let value = value?;
    match value.trim().parse::<i32>() {
        Ok(v) => Some(v),
        Err(_) => {
            errors.add(field, format!("The value '{}' is not valid for {}.", value, field));
            None
        }
    }
}

/// Checkbox semantics: absent means false.
fn parse_flag(errors: &mut FieldErrors, field: &str, value: Option<&str>) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None => false,
        Some("true" | "on" | "1") => true,
        Some("false" | "off" | "0") => false,
        Some(other) => {
            errors.add(field, format!("The value '{}' is not valid for {}.", other, field));
            false
        }
    }
}

/// Why a submission is being handed back for correction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    ValidationFailed,
    PersistenceFailed,
}

/// Form data for display: the values to show plus any error annotations
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct BookFormState {
    pub values: BookForm,
    /// Field name to messages
    #[schema(value_type = Object)]
    pub errors: FieldErrors,
    /// Messages not tied to a field
    pub form_errors: Vec<String>,
    pub rejection: Option<RejectionKind>,
}

impl BookFormState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn for_book(book: &Book) -> Self {
        Self {
            values: BookForm::from(book),
            ..Self::default()
        }
    }

    pub fn invalid(values: BookForm, errors: FieldErrors) -> Self {
        Self {
            values,
            errors,
            form_errors: Vec::new(),
            rejection: Some(RejectionKind::ValidationFailed),
        }
    }

    pub fn not_saved(values: BookForm, message: impl Into<String>) -> Self {
        Self {
            values,
            errors: FieldErrors::default(),
            form_errors: vec![message.into()],
            rejection: Some(RejectionKind::PersistenceFailed),
        }
    }
}
