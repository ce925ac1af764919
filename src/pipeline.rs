use std::path::PathBuf;

use anyhow::Context as _;

use crate::cli::{AuditArgs, FetchArgs, LoadArgs, RunArgs, TransformArgs};
use crate::config::Config;

/// Run all four stages in sequence inside a fresh workspace directory,
/// threading each stage's artifact into the next. The audit report stays
/// advisory: failed checks are logged but never fail the run.
pub async fn run(args: RunArgs, config: &Config) -> anyhow::Result<()> {
    let workspace_dir = PathBuf::from(&args.out);
    if workspace_dir.exists() {
        anyhow::bail!(
            "workspace output directory already exists: {}",
            workspace_dir.display()
        );
    }
    std::fs::create_dir_all(&workspace_dir)
        .with_context(|| format!("create workspace dir: {}", workspace_dir.display()))?;

    let merged_path = workspace_dir.join("merged.jsonl");
    let canonical_path = workspace_dir.join("canonical.jsonl");

    tracing::info!(out = %workspace_dir.display(), "run: fetch");
    crate::fetch::run(
        FetchArgs {
            out: merged_path.to_string_lossy().to_string(),
        },
        config,
    )
    .await
    .context("fetch")?;

    tracing::info!("run: transform");
    crate::transform::run(TransformArgs {
        merged: merged_path.to_string_lossy().to_string(),
        out: canonical_path.to_string_lossy().to_string(),
    })
    .context("transform")?;

    tracing::info!("run: load");
    crate::load::run(LoadArgs {
        canonical: canonical_path.to_string_lossy().to_string(),
        db: args.db.clone(),
    })
    .context("load")?;

    tracing::info!("run: audit");
    let report = crate::audit::run(&AuditArgs {
        db: args.db.clone(),
    })
    .context("audit")?;

    if !report.all_passed() {
        tracing::warn!("run: completed with failed quality checks");
    }

    Ok(())
}
