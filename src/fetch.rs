use std::fs::OpenOptions;
use std::io::{BufWriter, Write as _};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;

use crate::cli::FetchArgs;
use crate::config::Config;

/// Fetch stage: pull the bestseller list, enrich it from both metadata
/// sources, and write the merged records to `merged.jsonl`.
pub async fn run(args: FetchArgs, config: &Config) -> anyhow::Result<()> {
    let out_path = PathBuf::from(&args.out);
    if out_path.exists() {
        anyhow::bail!("merged output already exists: {}", out_path.display());
    }
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create merged output dir: {}", parent.display()))?;
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("build http client")?;

    let entries = crate::nytimes::fetch_list(&client, config).await;
    if entries.is_empty() {
        tracing::warn!("no bestseller entries fetched; writing an empty merged list");
    }

    let merged = crate::enrich::enrich_all(&client, config, entries)
        .await
        .context("enrich bestseller entries")?;

    let out_file = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(&out_path)
        .with_context(|| format!("create merged output: {}", out_path.display()))?;
    let mut writer = BufWriter::new(out_file);

    for record in &merged {
        serde_json::to_writer(&mut writer, record).context("write merged record json")?;
        writer
            .write_all(b"\n")
            .context("write merged record newline")?;
    }
    writer.flush().context("flush merged output")?;

    tracing::info!(
        records = merged.len(),
        out = %out_path.display(),
        "fetch: wrote merged records"
    );
    Ok(())
}
