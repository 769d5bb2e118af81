// src/pipeline.rs

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::{
    config::EtlConfig,
    duck::{self, QueryResult},
    fetch,
    history::{ProgressLog, Stage},
    schema::{EnrichedRecord, Record},
    transform, write,
};

/// Everything one run produced, for the caller to print.
#[derive(Debug)]
pub struct RunReport {
    pub extracted: Vec<Record>,
    pub enriched: Vec<EnrichedRecord>,
    pub queries: Vec<(String, QueryResult)>,
}

/// Run extract → transform → CSV → database → queries once.
pub fn run(config: &EtlConfig) -> Result<RunReport> {
    let client = fetch::client()?;
    run_with_client(&client, config)
}

pub fn run_with_client(client: &Client, config: &EtlConfig) -> Result<RunReport> {
    let progress = ProgressLog::new(&config.log_path);
    progress.log(
        Stage::Preliminaries,
        "Preliminaries complete. Initiating ETL process",
    )?;

    // ─── extract ─────────────────────────────────────────────────────
    let extracted = fetch::extract(client, &config.source_url)?;
    progress.log(
        Stage::Extract,
        "Data extraction complete. Initiating Transformation process.",
    )?;

    // ─── transform ───────────────────────────────────────────────────
    let enriched = transform::transform(extracted.clone(), &config.rates_path)?;
    progress.log(
        Stage::Transform,
        "Data transformation complete. Initiating loading process.",
    )?;

    // ─── load: csv ───────────────────────────────────────────────────
    progress.log(Stage::LoadCsv, "Loading data to a CSV file")?;
    write::write_csv(&enriched, &config.csv_path)?;
    progress.log(Stage::LoadCsv, "Data saved to CSV file.")?;

    // ─── load: database ──────────────────────────────────────────────
    let mut conn = duck::open_disk_db(&config.db_path)?;
    progress.log(Stage::Connect, "SQL Connection initiated.")?;

    progress.log(Stage::LoadDb, "Loading data to the database")?;
    duck::replace_table(&mut conn, &config.table_name, &enriched)?;
    let loaded = duck::row_count(&conn, &config.table_name)?;
    info!(stage = Stage::LoadDb.as_str(), table = %config.table_name, rows = loaded, "table loaded");
    progress.log(
        Stage::LoadDb,
        "Data loaded to Database as a table, executing queries",
    )?;

    // ─── queries ─────────────────────────────────────────────────────
    let mut queries = Vec::with_capacity(config.queries.len());
    for sql in &config.queries {
        let result = duck::run_query(&conn, sql)?;
        if result.is_empty() {
            warn!(stage = Stage::Query.as_str(), sql = %sql, "query returned no rows");
        } else {
            info!(stage = Stage::Query.as_str(), sql = %sql, rows = result.len(), "query ran");
        }
        queries.push((sql.clone(), result));
    }

    progress.log(Stage::Complete, "Process Complete")?;
    conn.close()
        .map_err(|(_, e)| e)
        .with_context(|| format!("closing database {}", config.db_path.display()))?;
    progress.log(Stage::Disconnect, "Server connection closed")?;

    Ok(RunReport {
        extracted,
        enriched,
        queries,
    })
}
