use crate::formats::{CanonicalBook, MergedBook};

/// Provenance tag stored with every canonical record.
pub const DATA_SOURCE: &str = "NYTimes, OpenLibrary, GoogleBooks";

/// Map a merged record to the canonical schema. Pure and total: every absent
/// field is substituted with its fixed default, so this never fails.
pub fn canonicalize(merged: MergedBook) -> CanonicalBook {
    CanonicalBook {
        title: merged.title.unwrap_or_else(|| "Unknown Title".to_owned()),
        author: merged.author.unwrap_or_else(|| "Unknown Author".to_owned()),
        isbn: merged.isbn,
        rank: merged.rank,
        list_name: merged.list_name,
        weeks_on_list: merged.weeks_on_list.unwrap_or(0),
        publisher: merged
            .publisher
            .unwrap_or_else(|| "Unknown Publisher".to_owned()),
        published_date: merged
            .published_date
            .unwrap_or_else(|| "Unknown Date".to_owned()),
        page_count: merged.page_count.unwrap_or(0),
        genres: merged.genres.join(", "),
        language: merged.language.unwrap_or_else(|| "Unknown".to_owned()),
        average_rating: merged.average_rating.unwrap_or(0.0),
        ratings_count: merged.ratings_count.unwrap_or(0),
        cover_image_url: merged.cover_image,
        buy_links: merged.buy_links.join(", "),
        description: merged
            .description
            .unwrap_or_else(|| "No description available".to_owned()),
        data_source: DATA_SOURCE.to_owned(),
    }
}
