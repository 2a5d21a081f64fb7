//! List view types: sort tokens, request parameters and the paged result

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::book::Book;

/// Sortable column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Rating,
    Author,
    Year,
}

/// Sort order selected by the `sortOrder` token.
/// Ascending title is the default and has no token of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    TitleAsc,
    TitleDesc,
    RatingAsc,
    RatingDesc,
    AuthorAsc,
    AuthorDesc,
    YearAsc,
    YearDesc,
}

impl SortOrder {
    /// Unrecognized or absent tokens fall back to ascending title
    pub fn from_token(token: Option<&str>) -> Self {
        match token.unwrap_or_default() {
            "title_desc" => SortOrder::TitleDesc,
            "rating_asc" => SortOrder::RatingAsc,
            "rating_desc" => SortOrder::RatingDesc,
            "author_asc" => SortOrder::AuthorAsc,
            "author_desc" => SortOrder::AuthorDesc,
            "year_asc" => SortOrder::YearAsc,
            "year_desc" => SortOrder::YearDesc,
            _ => SortOrder::TitleAsc,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            SortOrder::TitleAsc => "",
            SortOrder::TitleDesc => "title_desc",
            SortOrder::RatingAsc => "rating_asc",
            SortOrder::RatingDesc => "rating_desc",
            SortOrder::AuthorAsc => "author_asc",
            SortOrder::AuthorDesc => "author_desc",
            SortOrder::YearAsc => "year_asc",
            SortOrder::YearDesc => "year_desc",
        }
    }

    pub fn key(&self) -> SortKey {
        match self {
            SortOrder::TitleAsc | SortOrder::TitleDesc => SortKey::Title,
            SortOrder::RatingAsc | SortOrder::RatingDesc => SortKey::Rating,
            SortOrder::AuthorAsc | SortOrder::AuthorDesc => SortKey::Author,
            SortOrder::YearAsc | SortOrder::YearDesc => SortKey::Year,
        }
    }

    pub fn is_descending(&self) -> bool {
        matches!(
            self,
            SortOrder::TitleDesc | SortOrder::RatingDesc | SortOrder::AuthorDesc | SortOrder::YearDesc
        )
    }
}

/// Token each column header should link to next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SortLinks {
    pub title: String,
    pub rating: String,
    pub author: String,
    pub year: String,
}

impl SortLinks {
    pub fn for_current(current: SortOrder) -> Self {
        // `first` is offered unless it is already the current order
        let toggle = |first: SortOrder, second: SortOrder| {
            let next = if current == first { second } else { first };
            next.as_token().to_string()
        };
        // Any explicit order links title back to the default
        let title = match current {
            SortOrder::TitleAsc => SortOrder::TitleDesc,
            _ => SortOrder::TitleAsc,
        };
        Self {
            title: title.as_token().to_string(),
            rating: toggle(SortOrder::RatingDesc, SortOrder::RatingAsc),
            author: toggle(SortOrder::AuthorDesc, SortOrder::AuthorAsc),
            year: toggle(SortOrder::YearDesc, SortOrder::YearAsc),
        }
    }
}

/// List request parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Sort token, e.g. `year_desc`
    #[serde(rename = "sortOrder", alias = "sort_order")]
    pub sort_order: Option<String>,
    /// Filter carried over from the previous page
    #[serde(rename = "currentFilter", alias = "current_filter")]
    pub current_filter: Option<String>,
    /// New search; resets paging to the first page
    #[serde(rename = "searchString", alias = "search_string")]
    pub search_string: Option<String>,
    /// Page number (default: 1). Blank or non-numeric values count as absent.
    #[serde(default, deserialize_with = "lenient")]
    pub page: Option<i64>,
}

/// Query-string value that reads as `None` when blank or unparseable
/// instead of rejecting the whole request.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|v| v.trim().to_ascii_lowercase().parse().ok()))
}

/// One page of the catalog plus the state needed to rebuild the list controls
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub page: i64,
    pub page_count: i64,
    pub page_size: i64,
    pub total: i64,
    pub has_previous_page: bool,
    pub has_next_page: bool,
    /// Effective sort token (empty for the default order)
    pub current_sort: String,
    /// Effective filter, to be carried as `currentFilter`
    pub current_filter: Option<String>,
    pub sort_links: SortLinks,
}
