// src/fetch/mod.rs

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use std::fs;
use tracing::{debug, info, instrument};
use url::Url;

use crate::schema::Record;

pub mod table;

pub use table::parse_records;

/// Build the blocking HTTP client used for the source page.
pub fn client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ))
        .build()
        .context("building HTTP client")
}

/// Retrieve the document at `url` as text.
///
/// `file://` URLs are read straight from disk; everything else goes over HTTP
/// and a non-success status is an error.
pub fn fetch_document(client: &Client, url: &Url) -> Result<String> {
    if url.scheme() == "file" {
        let path = url
            .to_file_path()
            .map_err(|_| anyhow!("{} is not a valid local file URL", url))?;
        debug!(path = %path.display(), "reading local document");
        return fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()));
    }

    debug!(%url, "fetching document");
    client
        .get(url.clone())
        .send()
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .text()
        .with_context(|| format!("Reading text from {}", url))
}

/// Fetch `source` and parse its first table body into records.
#[instrument(level = "info", skip(client))]
pub fn extract(client: &Client, source: &str) -> Result<Vec<Record>> {
    let url = Url::parse(source).with_context(|| format!("parsing source URL {}", source))?;
    let html = fetch_document(client, &url)?;
    let records = parse_records(&html).with_context(|| format!("extracting table from {}", url))?;
    info!(rows = records.len(), "extracted records");
    Ok(records)
}
