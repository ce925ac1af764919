use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run fetch, transform, load and audit in one workspace directory.
    Run(RunArgs),
    /// Fetch the bestseller list and enrich it from both metadata sources.
    Fetch(FetchArgs),
    /// Normalize merged records into the canonical schema.
    Transform(TransformArgs),
    /// Load canonical records into the books database.
    Load(LoadArgs),
    /// Audit the books database and report data-quality checks.
    Audit(AuditArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Output directory for the pipeline workspace (merged/canonical artifacts).
    #[arg(long)]
    pub out: String,

    /// Path to the SQLite books database (created if missing).
    #[arg(long)]
    pub db: String,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Output file path for `merged.jsonl`.
    #[arg(long)]
    pub out: String,
}

#[derive(Debug, Args)]
pub struct TransformArgs {
    /// Input path to `merged.jsonl` (created by `fetch`).
    #[arg(long)]
    pub merged: String,

    /// Output file path for `canonical.jsonl`.
    #[arg(long)]
    pub out: String,
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// Input path to `canonical.jsonl` (created by `transform`).
    #[arg(long)]
    pub canonical: String,

    /// Path to the SQLite books database (created if missing).
    #[arg(long)]
    pub db: String,
}

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Path to the SQLite books database.
    #[arg(long)]
    pub db: String,
}
