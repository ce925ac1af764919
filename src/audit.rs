use std::path::PathBuf;

use crate::cli::AuditArgs;
use crate::store::Store;

const CRITICAL_COLUMNS: [&str; 5] = ["title", "author", "isbn", "publisher", "published_date"];

const RANGE_CHECKS: [(&str, &str); 5] = [
    ("rank", "rank < 0"),
    ("weeks_on_list", "weeks_on_list < 0"),
    ("page_count", "page_count < 0"),
    ("average_rating", "average_rating < 0 OR average_rating > 5"),
    ("ratings_count", "ratings_count < 0"),
];

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

/// Outcome of the audit battery, returned to the caller so it can decide
/// whether a failed check should fail the run. The audit stage itself treats
/// every check as advisory.
#[derive(Debug, Clone)]
pub struct QualityReport {
    pub checks: Vec<CheckResult>,
}

impl QualityReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }
}

/// Audit the books database and log each check. Check failures never turn
/// into an `Err`; only a database-level failure does.
pub fn run(args: &AuditArgs) -> anyhow::Result<QualityReport> {
    let db_path = PathBuf::from(&args.db);
    let store = Store::open(&db_path)?;

    let report = run_checks(&store)?;
    for check in &report.checks {
        if check.passed {
            tracing::info!(check = %check.name, detail = %check.detail, "quality check passed");
        } else {
            tracing::warn!(check = %check.name, detail = %check.detail, "quality check failed");
        }
    }

    let failed = report.checks.iter().filter(|check| !check.passed).count();
    tracing::info!(
        checks = report.checks.len(),
        failed,
        "audit: quality checks completed"
    );

    Ok(report)
}

/// Run the fixed check battery against the store's current state. Read-only;
/// each check is independent of the others.
pub fn run_checks(store: &Store) -> anyhow::Result<QualityReport> {
    let mut checks = Vec::new();

    let rows = store.row_count()?;
    checks.push(CheckResult {
        name: "row_count".to_owned(),
        passed: rows > 0,
        detail: format!("{rows} rows"),
    });

    for column in CRITICAL_COLUMNS {
        let missing = store.null_or_empty_count(column)?;
        checks.push(CheckResult {
            name: format!("missing_{column}"),
            passed: missing == 0,
            detail: format!("{missing} rows with null or empty {column}"),
        });
    }

    let duplicates = store.duplicate_isbn_count()?;
    checks.push(CheckResult {
        name: "duplicate_isbn".to_owned(),
        passed: duplicates == 0,
        detail: format!("{duplicates} isbns stored more than once"),
    });

    for (column, condition) in RANGE_CHECKS {
        let invalid = store.out_of_range_count(condition)?;
        checks.push(CheckResult {
            name: format!("range_{column}"),
            passed: invalid == 0,
            detail: format!("{invalid} rows with out-of-range {column}"),
        });
    }

    Ok(QualityReport { checks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::CanonicalBook;

    fn canonical(isbn: &str) -> CanonicalBook {
        CanonicalBook {
            title: "T".to_owned(),
            author: "A".to_owned(),
            isbn: Some(isbn.to_owned()),
            rank: Some(1),
            list_name: Some("Hardcover Fiction".to_owned()),
            weeks_on_list: 2,
            publisher: "P".to_owned(),
            published_date: "2020".to_owned(),
            page_count: 100,
            genres: "Fiction".to_owned(),
            language: "en".to_owned(),
            average_rating: 4.0,
            ratings_count: 10,
            cover_image_url: None,
            buy_links: String::new(),
            description: "d".to_owned(),
            data_source: crate::normalize::DATA_SOURCE.to_owned(),
        }
    }

    #[test]
    fn clean_store_passes_every_check() -> anyhow::Result<()> {
        let mut store = Store::open_in_memory()?;
        store.insert_batch(&[canonical("111"), canonical("222")])?;

        let report = run_checks(&store)?;
        assert!(report.all_passed());
        assert_eq!(report.checks.len(), 12);
        Ok(())
    }

    #[test]
    fn empty_store_fails_only_the_row_count_check() -> anyhow::Result<()> {
        let store = Store::open_in_memory()?;

        let report = run_checks(&store)?;
        let failed: Vec<&str> = report
            .checks
            .iter()
            .filter(|check| !check.passed)
            .map(|check| check.name.as_str())
            .collect();
        assert_eq!(failed, vec!["row_count"]);
        Ok(())
    }

    #[test]
    fn one_row_missing_author_fails_only_the_author_check() -> anyhow::Result<()> {
        let mut store = Store::open_in_memory()?;
        store.insert_batch(&[canonical("111")])?;
        store.connection().execute(
            "UPDATE books SET author = '' WHERE isbn = '111'",
            [],
        )?;

        let report = run_checks(&store)?;
        let author_check = report
            .checks
            .iter()
            .find(|check| check.name == "missing_author")
            .unwrap();
        assert!(!author_check.passed);
        assert!(author_check.detail.starts_with("1 rows"));

        for check in &report.checks {
            if check.name != "missing_author" {
                assert!(check.passed, "unexpected failure: {}", check.name);
            }
        }
        Ok(())
    }

    #[test]
    fn out_of_range_ratings_are_counted_per_column() -> anyhow::Result<()> {
        let mut store = Store::open_in_memory()?;
        store.insert_batch(&[canonical("111"), canonical("222")])?;
        store.connection().execute(
            "UPDATE books SET average_rating = 7.5, page_count = -1 WHERE isbn = '222'",
            [],
        )?;

        let report = run_checks(&store)?;
        let failed: Vec<&str> = report
            .checks
            .iter()
            .filter(|check| !check.passed)
            .map(|check| check.name.as_str())
            .collect();
        assert_eq!(failed, vec!["range_page_count", "range_average_rating"]);
        Ok(())
    }
}
