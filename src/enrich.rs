use std::future::Future;
use std::sync::Arc;

use anyhow::Context as _;

use crate::config::Config;
use crate::formats::{BestsellerEntry, GoogleBooksRecord, MergedBook, OpenLibraryRecord};

/// Enrich every list entry from both metadata sources and merge the results.
///
/// Fan-out is bounded by the available parallelism; a failed lookup degrades
/// to an absent record and never aborts sibling lookups. All lookups complete
/// before any merge happens, and the output keeps the list's original order.
pub async fn enrich_all(
    client: &reqwest::Client,
    config: &Config,
    entries: Vec<BestsellerEntry>,
) -> anyhow::Result<Vec<MergedBook>> {
    let total = entries.len();
    let concurrency = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(total.max(1));
    tracing::info!(entries = total, concurrency, "enrich: fan out lookups");

    let client = client.clone();
    let config = Arc::new(config.clone());
    let isbns = entries
        .iter()
        .map(|entry| entry.isbn.clone())
        .collect::<Vec<_>>();

    let lookups = map_bounded(total, concurrency, move |index| {
        let client = client.clone();
        let config = Arc::clone(&config);
        let isbn = isbns[index].clone();

        async move {
            match isbn.as_deref() {
                Some(isbn) if !isbn.is_empty() => {
                    tokio::join!(
                        crate::openlibrary::fetch_by_isbn(&client, &config, isbn),
                        crate::googlebooks::fetch_by_isbn(&client, &config, isbn),
                    )
                }
                _ => (None, None),
            }
        }
    })
    .await
    .context("enrich list entries")?;

    let fetched_at = chrono::Utc::now().to_rfc3339();
    let merged = entries
        .into_iter()
        .zip(lookups)
        .map(|(entry, (open_library, google_books))| {
            merge(entry, open_library, google_books, &fetched_at)
        })
        .collect();

    Ok(merged)
}

/// Bounded concurrent map over `0..count`: at most `concurrency` tasks run at
/// once, and results land at their input index regardless of completion order.
async fn map_bounded<F, Fut, T>(count: usize, concurrency: usize, f: F) -> anyhow::Result<Vec<T>>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let concurrency = concurrency.max(1);
    let mut join_set = tokio::task::JoinSet::new();
    let mut next_index = 0usize;
    let mut results: Vec<Option<T>> = Vec::with_capacity(count);
    results.resize_with(count, || None);

    while next_index < count || !join_set.is_empty() {
        while next_index < count && join_set.len() < concurrency {
            let index = next_index;
            let task = f(index);
            join_set.spawn(async move { (index, task.await) });
            next_index += 1;
        }

        let Some(joined) = join_set.join_next().await else {
            break;
        };
        let (index, result) = joined.context("join lookup task")?;
        results[index] = Some(result);
    }

    results
        .into_iter()
        .enumerate()
        .map(|(index, result)| {
            result.ok_or_else(|| anyhow::anyhow!("lookup task {index} produced no result"))
        })
        .collect()
}

/// Merge one entry with its two enrichment records.
///
/// A source that answered overwrites exactly the fields its payload declared,
/// and a declared-but-empty value (an empty title string, an empty category
/// list) overwrites too, so a sparse source can erase a valid list value with
/// an empty one. A source that failed outright contributes nothing. Net
/// precedence: Google Books over Open Library over the list entry.
pub fn merge(
    entry: BestsellerEntry,
    open_library: Option<OpenLibraryRecord>,
    google_books: Option<GoogleBooksRecord>,
    fetched_at: &str,
) -> MergedBook {
    let mut merged = MergedBook {
        title: entry.title,
        author: entry.author,
        isbn: entry.isbn,
        rank: entry.rank,
        list_name: entry.list_name,
        weeks_on_list: entry.weeks_on_list,
        publisher: entry.publisher,
        published_date: None,
        page_count: None,
        genres: Vec::new(),
        language: None,
        average_rating: None,
        ratings_count: None,
        cover_image: entry.cover_image,
        buy_links: entry.buy_links,
        description: entry.description,
        fetched_at: fetched_at.to_owned(),
    };

    if let Some(record) = open_library {
        overlay(&mut merged.title, record.title);
        overlay(&mut merged.author, record.author);
        overlay(&mut merged.publisher, record.publisher);
        overlay(&mut merged.published_date, record.published_date);
        overlay(&mut merged.cover_image, record.cover_image);
        if let Some(genres) = record.genres {
            merged.genres = genres;
        }
    }

    if let Some(record) = google_books {
        overlay(&mut merged.title, record.title);
        overlay(&mut merged.author, record.author);
        overlay(&mut merged.publisher, record.publisher);
        overlay(&mut merged.published_date, record.published_date);
        overlay(&mut merged.page_count, record.page_count);
        if let Some(genres) = record.genres {
            merged.genres = genres;
        }
        overlay(&mut merged.language, record.language);
        overlay(&mut merged.average_rating, record.average_rating);
        overlay(&mut merged.ratings_count, record.ratings_count);
        overlay(&mut merged.cover_image, record.cover_image);
    }

    merged
}

fn overlay<T>(target: &mut Option<T>, declared: Option<T>) {
    if declared.is_some() {
        *target = declared;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn entry(title: &str) -> BestsellerEntry {
        BestsellerEntry {
            title: Some(title.to_owned()),
            author: Some("List Author".to_owned()),
            isbn: Some("9780000000001".to_owned()),
            rank: Some(1),
            list_name: Some("Hardcover Fiction".to_owned()),
            weeks_on_list: Some(2),
            publisher: Some("List Publisher".to_owned()),
            description: Some("d".to_owned()),
            cover_image: Some("https://img.example/list.jpg".to_owned()),
            buy_links: vec!["https://shop.example/1".to_owned()],
        }
    }

    #[test]
    fn both_sources_absent_leaves_entry_fields_unchanged() {
        let merged = merge(entry("T"), None, None, "2025-03-01T09:00:00Z");
        assert_eq!(merged.title.as_deref(), Some("T"));
        assert_eq!(merged.author.as_deref(), Some("List Author"));
        assert_eq!(merged.publisher.as_deref(), Some("List Publisher"));
        assert_eq!(merged.cover_image.as_deref(), Some("https://img.example/list.jpg"));
        assert_eq!(merged.buy_links, vec!["https://shop.example/1".to_owned()]);
        assert_eq!(merged.page_count, None);
        assert!(merged.genres.is_empty());
    }

    #[test]
    fn google_books_wins_over_open_library_and_entry() {
        // The entry has a title, Open Library does not declare one, Google
        // Books does: Google Books wins.
        let open_library = OpenLibraryRecord {
            publisher: Some("OL Publisher".to_owned()),
            ..Default::default()
        };
        let google_books = GoogleBooksRecord {
            title: Some("GB Title".to_owned()),
            language: Some("en".to_owned()),
            ..Default::default()
        };

        let merged = merge(entry("T"), Some(open_library), Some(google_books), "");
        assert_eq!(merged.title.as_deref(), Some("GB Title"));
        assert_eq!(merged.language.as_deref(), Some("en"));
        // Google Books did not declare a publisher, so Open Library's stands.
        assert_eq!(merged.publisher.as_deref(), Some("OL Publisher"));
    }

    #[test]
    fn undeclared_fields_keep_the_entry_values() {
        let open_library = OpenLibraryRecord {
            publisher: Some("OL Publisher".to_owned()),
            ..Default::default()
        };

        let merged = merge(entry("T"), Some(open_library), None, "");
        assert_eq!(merged.title.as_deref(), Some("T"));
        assert_eq!(merged.publisher.as_deref(), Some("OL Publisher"));
        assert_eq!(merged.rank, Some(1));
        assert_eq!(merged.description.as_deref(), Some("d"));
    }

    #[test]
    fn declared_empty_value_erases_the_entry_value() {
        // Open Library declared an empty title: the entry's title is erased
        // and the empty value survives into the merged record.
        let open_library = OpenLibraryRecord {
            title: Some(String::new()),
            ..Default::default()
        };

        let merged = merge(entry("T"), Some(open_library), None, "");
        assert_eq!(merged.title.as_deref(), Some(""));
    }

    #[test]
    fn declared_empty_genre_list_erases_prior_genres() {
        let open_library = OpenLibraryRecord {
            genres: Some(vec!["Fiction".to_owned()]),
            ..Default::default()
        };
        let google_books = GoogleBooksRecord {
            genres: Some(Vec::new()),
            ..Default::default()
        };

        let merged = merge(entry("T"), Some(open_library.clone()), Some(google_books), "");
        assert!(merged.genres.is_empty());

        let merged = merge(entry("T"), Some(open_library), None, "");
        assert_eq!(merged.genres, vec!["Fiction".to_owned()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn map_bounded_preserves_index_order_under_reversed_completion() -> anyhow::Result<()> {
        // Later indices finish first; results must still land at their index.
        let results = map_bounded(8, 4, |index| async move {
            tokio::time::sleep(Duration::from_millis(10 * (8 - index) as u64)).await;
            index * 10
        })
        .await?;

        assert_eq!(results, vec![0, 10, 20, 30, 40, 50, 60, 70]);
        Ok(())
    }

    #[tokio::test]
    async fn map_bounded_handles_empty_input() -> anyhow::Result<()> {
        let results: Vec<usize> = map_bounded(0, 4, |index| async move { index }).await?;
        assert!(results.is_empty());
        Ok(())
    }
}
