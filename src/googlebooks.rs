use anyhow::Context as _;
use serde::Deserialize;

use crate::config::Config;
use crate::formats::GoogleBooksRecord;

pub fn volumes_endpoint(base_url: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    format!("{base_url}/books/v1/volumes")
}

/// Look up one ISBN on Google Books. The first result's volume metadata is
/// used; `None` on not-found, malformed response or transport error.
pub async fn fetch_by_isbn(
    client: &reqwest::Client,
    config: &Config,
    isbn: &str,
) -> Option<GoogleBooksRecord> {
    match try_fetch_by_isbn(client, config, isbn).await {
        Ok(record) => record,
        Err(err) => {
            tracing::warn!(isbn, error = %format!("{err:#}"), "google books lookup failed");
            None
        }
    }
}

async fn try_fetch_by_isbn(
    client: &reqwest::Client,
    config: &Config,
    isbn: &str,
) -> anyhow::Result<Option<GoogleBooksRecord>> {
    let endpoint = volumes_endpoint(&config.google_books_base_url);
    let query = format!("isbn:{isbn}");

    let response = client
        .get(&endpoint)
        .query(&[
            ("q", query.as_str()),
            ("key", config.google_books_api_key.as_str()),
        ])
        .send()
        .await
        .with_context(|| format!("GET {endpoint}"))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("google books API error ({status})");
    }

    let body: VolumesResponse = response
        .json()
        .await
        .context("parse google books response")?;

    Ok(body
        .items
        .into_iter()
        .next()
        .map(|item| record_from_volume_info(item.volume_info)))
}

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
struct Volume {
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
struct VolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    publisher: Option<String>,
    #[serde(rename = "publishedDate")]
    published_date: Option<String>,
    #[serde(rename = "pageCount")]
    page_count: Option<i64>,
    categories: Option<Vec<String>>,
    language: Option<String>,
    #[serde(rename = "averageRating")]
    average_rating: Option<f64>,
    #[serde(rename = "ratingsCount")]
    ratings_count: Option<i64>,
    #[serde(rename = "imageLinks")]
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
struct ImageLinks {
    thumbnail: Option<String>,
}

fn record_from_volume_info(info: VolumeInfo) -> GoogleBooksRecord {
    GoogleBooksRecord {
        title: info.title,
        author: info.authors.into_iter().next(),
        publisher: info.publisher,
        published_date: info.published_date,
        page_count: info.page_count,
        genres: info.categories,
        language: info.language,
        average_rating: info.average_rating,
        ratings_count: info.ratings_count,
        cover_image: info.image_links.and_then(|links| links.thumbnail),
    }
}
