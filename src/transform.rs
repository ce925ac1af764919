use std::fs::OpenOptions;
use std::io::{BufRead as _, BufReader, BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cli::TransformArgs;
use crate::formats::MergedBook;

/// Transform stage: normalize every merged record into the canonical schema
/// and write `canonical.jsonl`.
pub fn run(args: TransformArgs) -> anyhow::Result<()> {
    let merged_path = PathBuf::from(&args.merged);
    let out_path = PathBuf::from(&args.out);
    if out_path.exists() {
        anyhow::bail!("canonical output already exists: {}", out_path.display());
    }

    let merged = read_merged_records(&merged_path).context("read merged records")?;
    if merged.is_empty() {
        tracing::warn!("no merged records to transform");
    }

    let out_file = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&out_path)
        .with_context(|| format!("create canonical output: {}", out_path.display()))?;
    let mut writer = BufWriter::new(out_file);

    let mut count = 0usize;
    for record in merged {
        let canonical = crate::normalize::canonicalize(record);
        serde_json::to_writer(&mut writer, &canonical).context("write canonical record json")?;
        writer
            .write_all(b"\n")
            .context("write canonical record newline")?;
        count += 1;
    }
    writer.flush().context("flush canonical output")?;

    tracing::info!(records = count, out = %out_path.display(), "transform: wrote canonical records");
    Ok(())
}

fn read_merged_records(path: &Path) -> anyhow::Result<Vec<MergedBook>> {
    let file = OpenOptions::new()
        .read(true)
        .open(path)
        .with_context(|| format!("open merged records: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line.context("read merged jsonl line")?;
        if line.trim().is_empty() {
            continue;
        }
        let record: MergedBook = serde_json::from_str(&line).context("parse merged record")?;
        records.push(record);
    }

    Ok(records)
}
