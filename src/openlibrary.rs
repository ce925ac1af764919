use std::collections::HashMap;

use anyhow::Context as _;
use serde::Deserialize;

use crate::config::Config;
use crate::formats::OpenLibraryRecord;

pub fn books_endpoint(base_url: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    format!("{base_url}/api/books")
}

/// Look up one ISBN on Open Library. Returns `None` on not-found, malformed
/// response or transport error; failures are logged but indistinguishable from
/// missing data to the caller.
pub async fn fetch_by_isbn(
    client: &reqwest::Client,
    config: &Config,
    isbn: &str,
) -> Option<OpenLibraryRecord> {
    match try_fetch_by_isbn(client, config, isbn).await {
        Ok(record) => record,
        Err(err) => {
            tracing::warn!(isbn, error = %format!("{err:#}"), "open library lookup failed");
            None
        }
    }
}

async fn try_fetch_by_isbn(
    client: &reqwest::Client,
    config: &Config,
    isbn: &str,
) -> anyhow::Result<Option<OpenLibraryRecord>> {
    let endpoint = books_endpoint(&config.openlibrary_base_url);
    let bibkey = format!("ISBN:{isbn}");

    let response = client
        .get(&endpoint)
        .query(&[
            ("bibkeys", bibkey.as_str()),
            ("format", "json"),
            ("jscmd", "data"),
        ])
        .send()
        .await
        .with_context(|| format!("GET {endpoint}"))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("open library API error ({status})");
    }

    let mut body: HashMap<String, BookData> = response
        .json()
        .await
        .context("parse open library response")?;

    Ok(body.remove(&bibkey).map(record_from_book_data))
}

#[derive(Debug, Deserialize)]
struct BookData {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<Named>,
    #[serde(default)]
    publishers: Vec<Named>,
    publish_date: Option<String>,
    cover: Option<Cover>,
    subjects: Option<Vec<Named>>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Cover {
    large: Option<String>,
}

fn record_from_book_data(data: BookData) -> OpenLibraryRecord {
    OpenLibraryRecord {
        title: data.title,
        author: data.authors.into_iter().next().and_then(|author| author.name),
        publisher: data
            .publishers
            .into_iter()
            .next()
            .and_then(|publisher| publisher.name),
        published_date: data.publish_date,
        cover_image: data.cover.and_then(|cover| cover.large),
        genres: data.subjects.map(|subjects| {
            subjects
                .into_iter()
                .map(|subject| subject.name.unwrap_or_else(|| "Unknown".to_owned()))
                .collect()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_takes_first_author_and_subject_names() -> anyhow::Result<()> {
        let data: BookData = serde_json::from_str(
            r#"{
              "title": "T",
              "authors": [{ "name": "A1" }, { "name": "A2" }],
              "publishers": [{ "name": "P" }],
              "publish_date": "2001",
              "cover": { "large": "https://covers.example/l.jpg" },
              "subjects": [{ "name": "Fiction" }, { "url": "https://ol.example/s" }]
            }"#,
        )?;

        let record = record_from_book_data(data);
        assert_eq!(record.author.as_deref(), Some("A1"));
        assert_eq!(record.publisher.as_deref(), Some("P"));
        assert_eq!(
            record.genres,
            Some(vec!["Fiction".to_owned(), "Unknown".to_owned()])
        );
        Ok(())
    }

    #[test]
    fn record_declares_absent_fields_as_none() -> anyhow::Result<()> {
        let data: BookData = serde_json::from_str(r#"{ "title": "Only Title" }"#)?;
        let record = record_from_book_data(data);
        assert_eq!(record.title.as_deref(), Some("Only Title"));
        assert_eq!(record.author, None);
        assert_eq!(record.published_date, None);
        assert_eq!(record.genres, None);
        Ok(())
    }
}
