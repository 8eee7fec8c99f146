pub mod content;
pub mod outcome;
pub mod setting;
pub mod sort;

pub use content::{Article, ArticleSummary, Author, Category, Image, Slug, SlugError, Tag};
pub use outcome::{LookupStage, NotFoundCause, Resolution};
pub use setting::{LookupPolicy, Settings};
pub use sort::{map_sort, Direction, SortField, SortKey, SortOrder};
