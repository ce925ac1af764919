use std::fs::OpenOptions;
use std::io::{BufRead as _, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cli::LoadArgs;
use crate::formats::CanonicalBook;
use crate::store::Store;

/// Load stage: insert canonical records into the books database. The batch is
/// one transaction, so a database failure leaves the store unchanged; the
/// failure is logged and surfaced to the caller. Returns the attempted-insert
/// count.
pub fn run(args: LoadArgs) -> anyhow::Result<usize> {
    let canonical_path = PathBuf::from(&args.canonical);
    let db_path = PathBuf::from(&args.db);

    let books = read_canonical_records(&canonical_path).context("read canonical records")?;
    if books.is_empty() {
        tracing::warn!("no canonical records to load");
        return Ok(0);
    }

    let mut store = Store::open(&db_path)?;
    let attempted = match store.insert_batch(&books) {
        Ok(attempted) => attempted,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "database insert failed");
            return Err(err).context("insert canonical records");
        }
    };

    tracing::info!(
        attempted,
        skipped = books.len() - attempted,
        db = %db_path.display(),
        "load: inserted canonical records"
    );
    Ok(attempted)
}

fn read_canonical_records(path: &Path) -> anyhow::Result<Vec<CanonicalBook>> {
    let file = OpenOptions::new()
        .read(true)
        .open(path)
        .with_context(|| format!("open canonical records: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line.context("read canonical jsonl line")?;
        if line.trim().is_empty() {
            continue;
        }
        let record: CanonicalBook =
            serde_json::from_str(&line).context("parse canonical record")?;
        records.push(record);
    }

    Ok(records)
}
