use serde::{Deserialize, Serialize};

/// One position of the bestseller list, as reported by the primary source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BestsellerEntry {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub rank: Option<i64>,
    pub list_name: Option<String>,
    pub weeks_on_list: Option<i64>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub buy_links: Vec<String>,
}

/// Bibliographic metadata for one ISBN from Open Library. `None` means the
/// payload did not declare the field at all; a declared-but-empty value (for
/// example an empty title string) is kept and overwrites on merge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenLibraryRecord {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub cover_image: Option<String>,
    pub genres: Option<Vec<String>>,
}

/// Volume metadata for one ISBN from Google Books, same declared-field
/// convention as [`OpenLibraryRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoogleBooksRecord {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub page_count: Option<i64>,
    pub genres: Option<Vec<String>>,
    pub language: Option<String>,
    pub average_rating: Option<f64>,
    pub ratings_count: Option<i64>,
    pub cover_image: Option<String>,
}

/// Union of the primary entry and both enrichment overlays, written one per
/// line to `merged.jsonl` by the fetch stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub rank: Option<i64>,
    pub list_name: Option<String>,
    pub weeks_on_list: Option<i64>,
    pub publisher: Option<String>,
    pub published_date: Option<String>,
    pub page_count: Option<i64>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub language: Option<String>,
    pub average_rating: Option<f64>,
    pub ratings_count: Option<i64>,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub buy_links: Vec<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub fetched_at: String,
}

/// Fully defaulted canonical schema, written one per line to `canonical.jsonl`
/// and loaded column-for-column into the `books` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub rank: Option<i64>,
    pub list_name: Option<String>,
    pub weeks_on_list: i64,
    pub publisher: String,
    pub published_date: String,
    pub page_count: i64,
    pub genres: String,
    pub language: String,
    pub average_rating: f64,
    pub ratings_count: i64,
    pub cover_image_url: Option<String>,
    pub buy_links: String,
    pub description: String,
    pub data_source: String,
}
