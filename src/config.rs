use anyhow::Context as _;
use url::Url;

pub const NYTIMES_BASE_URL: &str = "https://api.nytimes.com";
pub const OPENLIBRARY_BASE_URL: &str = "https://openlibrary.org";
pub const GOOGLE_BOOKS_BASE_URL: &str = "https://www.googleapis.com";

/// Remote-source credentials and endpoints, read from the environment once at
/// startup and passed into each client by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub nytimes_api_key: String,
    pub google_books_api_key: String,
    pub nytimes_base_url: String,
    pub openlibrary_base_url: String,
    pub google_books_base_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let nytimes_api_key =
            std::env::var("NYTIMES_API_KEY").context("read NYTIMES_API_KEY from environment")?;
        let google_books_api_key = std::env::var("GOOGLE_BOOKS_API_KEY")
            .context("read GOOGLE_BOOKS_API_KEY from environment")?;

        let config = Self {
            nytimes_api_key,
            google_books_api_key,
            nytimes_base_url: base_url_from_env("NYTIMES_BASE_URL", NYTIMES_BASE_URL)?,
            openlibrary_base_url: base_url_from_env("OPENLIBRARY_BASE_URL", OPENLIBRARY_BASE_URL)?,
            google_books_base_url: base_url_from_env(
                "GOOGLE_BOOKS_BASE_URL",
                GOOGLE_BOOKS_BASE_URL,
            )?,
        };

        Ok(config)
    }
}

fn base_url_from_env(var: &str, default: &str) -> anyhow::Result<String> {
    let raw = match std::env::var(var) {
        Ok(value) => value,
        Err(std::env::VarError::NotPresent) => default.to_owned(),
        Err(err) => return Err(err).with_context(|| format!("read {var} from environment")),
    };

    let url = Url::parse(&raw).with_context(|| format!("parse {var}: {raw}"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("{var} must be http/https: {raw}");
    }

    Ok(raw.trim_end_matches('/').to_owned())
}
