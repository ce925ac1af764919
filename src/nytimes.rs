use anyhow::Context as _;
use serde::Deserialize;

use crate::config::Config;
use crate::formats::BestsellerEntry;

pub fn list_endpoint(base_url: &str) -> String {
    let base_url = base_url.trim_end_matches('/');
    format!("{base_url}/svc/books/v3/lists/current/hardcover-fiction.json")
}

/// Fetch the current bestseller list in rank order. Fail-soft: any transport,
/// HTTP or parse failure is logged and degrades to an empty list.
pub async fn fetch_list(client: &reqwest::Client, config: &Config) -> Vec<BestsellerEntry> {
    match try_fetch_list(client, config).await {
        Ok(entries) => {
            tracing::info!(count = entries.len(), "fetched bestseller list");
            entries
        }
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "bestseller list fetch failed");
            Vec::new()
        }
    }
}

async fn try_fetch_list(
    client: &reqwest::Client,
    config: &Config,
) -> anyhow::Result<Vec<BestsellerEntry>> {
    let endpoint = list_endpoint(&config.nytimes_base_url);
    let response = client
        .get(&endpoint)
        .query(&[("api-key", config.nytimes_api_key.as_str())])
        .send()
        .await
        .with_context(|| format!("GET {endpoint}"))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("bestseller list API error ({status})");
    }

    let body: ListResponse = response
        .json()
        .await
        .context("parse bestseller list response")?;

    Ok(entries_from_response(body))
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    results: ListResults,
}

#[derive(Debug, Deserialize)]
struct ListResults {
    list_name: Option<String>,
    #[serde(default)]
    books: Vec<ListBook>,
}

#[derive(Debug, Deserialize)]
struct ListBook {
    title: Option<String>,
    author: Option<String>,
    primary_isbn13: Option<String>,
    rank: Option<i64>,
    weeks_on_list: Option<i64>,
    publisher: Option<String>,
    description: Option<String>,
    book_image: Option<String>,
    #[serde(default)]
    buy_links: Vec<BuyLink>,
}

#[derive(Debug, Deserialize)]
struct BuyLink {
    url: Option<String>,
}

fn entries_from_response(body: ListResponse) -> Vec<BestsellerEntry> {
    let list_name = body.results.list_name;

    body.results
        .books
        .into_iter()
        .map(|book| BestsellerEntry {
            title: book.title,
            author: book.author,
            isbn: book.primary_isbn13,
            rank: book.rank,
            list_name: list_name.clone(),
            weeks_on_list: book.weeks_on_list,
            publisher: book.publisher,
            description: book.description,
            cover_image: book.book_image,
            buy_links: book.buy_links.into_iter().filter_map(|link| link.url).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_list_order_and_flatten_buy_links() -> anyhow::Result<()> {
        let body: ListResponse = serde_json::from_str(
            r#"{
              "results": {
                "list_name": "Hardcover Fiction",
                "books": [
                  {
                    "title": "First",
                    "author": "A. Author",
                    "primary_isbn13": "9780000000001",
                    "rank": 1,
                    "weeks_on_list": 3,
                    "publisher": "Pub",
                    "description": "d",
                    "book_image": "https://img.example/1.jpg",
                    "buy_links": [
                      { "name": "Shop", "url": "https://shop.example/1" },
                      { "name": "NoUrl" }
                    ]
                  },
                  { "title": "Second", "rank": 2 }
                ]
              }
            }"#,
        )?;

        let entries = entries_from_response(body);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].isbn.as_deref(), Some("9780000000001"));
        assert_eq!(entries[0].list_name.as_deref(), Some("Hardcover Fiction"));
        assert_eq!(entries[0].buy_links, vec!["https://shop.example/1".to_owned()]);
        assert_eq!(entries[1].title.as_deref(), Some("Second"));
        assert_eq!(entries[1].list_name.as_deref(), Some("Hardcover Fiction"));
        assert!(entries[1].buy_links.is_empty());
        Ok(())
    }

    #[test]
    fn list_endpoint_trims_trailing_slash() {
        assert_eq!(
            list_endpoint("http://127.0.0.1:8080/"),
            "http://127.0.0.1:8080/svc/books/v3/lists/current/hardcover-fiction.json"
        );
    }
}
