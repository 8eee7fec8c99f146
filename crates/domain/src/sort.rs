// crates/domain/src/sort.rs

//! Ordering of a category's article listing.
//!
//! The query string carries one of six names; anything else (or nothing)
//! means newest first.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// `1` or `-1`, as used by document-store sort specs.
    pub fn signum(self) -> i8 {
        match self {
            Direction::Asc => 1,
            Direction::Desc => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    PublishedAt,
    Title,
    AuthorName,
}

impl SortField {
    /// Dotted document path, valid once `author` is dereferenced.
    pub fn path(self) -> &'static str {
        match self {
            SortField::PublishedAt => "publishedAt",
            SortField::Title => "title",
            SortField::AuthorName => "author.name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub field: SortField,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    DateDesc,
    DateAsc,
    TitleAsc,
    TitleDesc,
    AuthorAsc,
    AuthorDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        SortOrder::DateDesc,
        SortOrder::DateAsc,
        SortOrder::TitleAsc,
        SortOrder::TitleDesc,
        SortOrder::AuthorAsc,
        SortOrder::AuthorDesc,
    ];

    /// Total: unknown or absent values become [`SortOrder::DateDesc`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("date_desc") => SortOrder::DateDesc,
            Some("date_asc") => SortOrder::DateAsc,
            Some("title_asc") => SortOrder::TitleAsc,
            Some("title_desc") => SortOrder::TitleDesc,
            Some("author_asc") => SortOrder::AuthorAsc,
            Some("author_desc") => SortOrder::AuthorDesc,
            _ => SortOrder::default(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::DateDesc => "date_desc",
            SortOrder::DateAsc => "date_asc",
            SortOrder::TitleAsc => "title_asc",
            SortOrder::TitleDesc => "title_desc",
            SortOrder::AuthorAsc => "author_asc",
            SortOrder::AuthorDesc => "author_desc",
        }
    }

    pub fn key(self) -> SortKey {
        let (field, direction) = match self {
            SortOrder::DateDesc => (SortField::PublishedAt, Direction::Desc),
            SortOrder::DateAsc => (SortField::PublishedAt, Direction::Asc),
            SortOrder::TitleAsc => (SortField::Title, Direction::Asc),
            SortOrder::TitleDesc => (SortField::Title, Direction::Desc),
            SortOrder::AuthorAsc => (SortField::AuthorName, Direction::Asc),
            SortOrder::AuthorDesc => (SortField::AuthorName, Direction::Desc),
        };
        SortKey { field, direction }
    }
}

/// Map a raw `sort` query value to a concrete field + direction.
pub fn map_sort(raw: Option<&str>) -> SortKey {
    SortOrder::parse(raw).key()
}
