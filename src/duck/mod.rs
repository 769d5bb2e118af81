use anyhow::{Context, Result};
use duckdb::{params, types::Value, Connection};
use std::{fmt, path::Path};
use tracing::{debug, info, instrument};

use crate::report::format_table;
use crate::schema::{create_table_sql, quote_ident, EnrichedRecord};

/// Open a DuckDB database on disk at `path`, creating the file if it doesn't exist.
pub fn open_disk_db(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let conn =
        Connection::open(path).with_context(|| format!("opening database {}", path.display()))?;
    Ok(conn)
}

/// Open a DuckDB in‐memory database
pub fn open_mem_db() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    Ok(conn)
}

/// Replace `table_name` with exactly `records`.
///
/// Drop, create and bulk append run in one transaction, so a failure leaves
/// the previous contents in place.
#[instrument(level = "info", skip(conn, records), fields(rows = records.len()))]
pub fn replace_table(
    conn: &mut Connection,
    table_name: &str,
    records: &[EnrichedRecord],
) -> Result<()> {
    let tx = conn.transaction().context("starting transaction")?;

    let ddl = format!(
        "DROP TABLE IF EXISTS {}; {}",
        quote_ident(table_name),
        create_table_sql(table_name, &EnrichedRecord::COLUMNS)
    );
    debug!(sql = %ddl, "recreating table");
    tx.execute_batch(&ddl)
        .with_context(|| format!("recreating table {}", table_name))?;

    {
        let mut appender = tx
            .appender(table_name)
            .with_context(|| format!("opening appender on {}", table_name))?;
        for r in records {
            appender.append_row(params![
                r.name,
                r.mc_usd_billion,
                r.mc_gbp_billion,
                r.mc_eur_billion,
                r.mc_inr_billion
            ])?;
        }
        appender.flush()?;
    }

    tx.commit()
        .with_context(|| format!("committing table {}", table_name))?;
    info!(table = table_name, "table replaced");
    Ok(())
}

/// Number of rows currently in `table_name`.
pub fn row_count(conn: &Connection, table_name: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {};", quote_ident(table_name));
    let count = conn
        .query_row(&sql, [], |r| r.get(0))
        .with_context(|| format!("counting rows in {}", table_name))?;
    Ok(count)
}

/// Column names and rows produced by one query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(render_value).collect())
            .collect();
        f.write_str(&format_table(&self.columns, &rows))
    }
}

/// Execute `sql` verbatim and collect every row.
pub fn run_query(conn: &Connection, sql: &str) -> Result<QueryResult> {
    let mut stmt = conn
        .prepare(sql)
        .with_context(|| format!("preparing query {:?}", sql))?;
    let mut rows = stmt
        .query([])
        .with_context(|| format!("executing query {:?}", sql))?;

    let columns = rows.as_ref().map(|s| s.column_names()).unwrap_or_default();
    let width = columns.len();

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let values = (0..width)
            .map(|i| row.get::<_, Value>(i))
            .collect::<duckdb::Result<Vec<_>>>()
            .with_context(|| format!("reading row {} of {:?}", out.len(), sql))?;
        out.push(values);
    }

    debug!(rows = out.len(), columns = width, "query finished");
    Ok(QueryResult { columns, rows: out })
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::TinyInt(n) => n.to_string(),
        Value::SmallInt(n) => n.to_string(),
        Value::Int(n) => n.to_string(),
        Value::BigInt(n) => n.to_string(),
        Value::HugeInt(n) => n.to_string(),
        Value::UTinyInt(n) => n.to_string(),
        Value::USmallInt(n) => n.to_string(),
        Value::UInt(n) => n.to_string(),
        Value::UBigInt(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::Double(n) => n.to_string(),
        Value::Text(s) => s.clone(),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::column_names;
    use tempfile::tempdir;

    fn bank(name: &str, usd: f64) -> EnrichedRecord {
        EnrichedRecord {
            name: name.into(),
            mc_usd_billion: usd,
            mc_gbp_billion: usd * 0.8,
            mc_eur_billion: usd * 0.5,
            mc_inr_billion: usd * 80.0,
        }
    }

    #[test]
    fn replace_table_creates_typed_columns() -> Result<()> {
        let mut conn = open_mem_db()?;
        replace_table(&mut conn, "banks", &[bank("A", 100.0), bank("B", 200.0)])?;

        assert_eq!(row_count(&conn, "banks")?, 2);
        let result = run_query(&conn, "SELECT * FROM banks")?;
        assert_eq!(result.columns, column_names(&EnrichedRecord::COLUMNS));
        assert_eq!(result.rows[0][0], Value::Text("A".into()));
        assert_eq!(result.rows[0][1], Value::Double(100.0));
        assert_eq!(result.rows[1][2], Value::Double(200.0 * 0.8));
        Ok(())
    }

    #[test]
    fn second_replace_leaves_only_latest_rows() -> Result<()> {
        let tmp = tempdir()?;
        let db_path = tmp.path().join("banks.db");

        {
            let mut conn = open_disk_db(&db_path)?;
            replace_table(
                &mut conn,
                "banks",
                &[bank("Old1", 1.0), bank("Old2", 2.0), bank("Old3", 3.0)],
            )?;
        }

        let mut conn = open_disk_db(&db_path)?;
        replace_table(&mut conn, "banks", &[bank("New", 10.0)])?;

        let tables = run_query(
            &conn,
            "SELECT table_name FROM information_schema.tables WHERE table_name = 'banks'",
        )?;
        assert_eq!(tables.len(), 1);

        let result = run_query(&conn, "SELECT Name FROM banks")?;
        assert_eq!(result.rows, vec![vec![Value::Text("New".into())]]);
        Ok(())
    }

    #[test]
    fn replace_with_no_rows_leaves_empty_table() -> Result<()> {
        let mut conn = open_mem_db()?;
        replace_table(&mut conn, "banks", &[bank("A", 1.0)])?;
        replace_table(&mut conn, "banks", &[])?;
        assert_eq!(row_count(&conn, "banks")?, 0);
        Ok(())
    }

    #[test]
    fn aggregate_and_filter_queries() -> Result<()> {
        let mut conn = open_mem_db()?;
        replace_table(
            &mut conn,
            "Largest_banks_marketcaps",
            &[bank("A", 100.0), bank("B", 300.0), bank("C", 500.0)],
        )?;

        let avg = run_query(
            &conn,
            "SELECT AVG(MC_USD_Billion) FROM Largest_banks_marketcaps",
        )?;
        assert_eq!(avg.rows, vec![vec![Value::Double(300.0)]]);

        let names = run_query(
            &conn,
            "SELECT Name FROM Largest_banks_marketcaps WHERE MC_EUR_Billion > 100 ORDER BY Name",
        )?;
        assert_eq!(names.columns, vec!["Name"]);
        assert_eq!(
            names.rows,
            vec![vec![Value::Text("B".into())], vec![Value::Text("C".into())]]
        );
        Ok(())
    }

    #[test]
    fn bad_sql_and_missing_table_are_errors() -> Result<()> {
        let conn = open_mem_db()?;
        assert!(run_query(&conn, "SELEC nonsense").is_err());
        let err = run_query(&conn, "SELECT * FROM nowhere").unwrap_err();
        assert!(format!("{err:#}").contains("nowhere"));
        Ok(())
    }

    #[test]
    fn query_with_no_matches_keeps_columns() -> Result<()> {
        let mut conn = open_mem_db()?;
        replace_table(&mut conn, "banks", &[bank("A", 100.0)])?;
        let result = run_query(&conn, "SELECT Name FROM banks WHERE MC_USD_Billion > 1000")?;
        assert!(result.is_empty());
        assert_eq!(result.columns, vec!["Name"]);
        Ok(())
    }

    #[test]
    fn display_renders_header_and_rows() -> Result<()> {
        let mut conn = open_mem_db()?;
        replace_table(&mut conn, "banks", &[bank("A", 100.0)])?;
        let text = run_query(&conn, "SELECT Name, MC_USD_Billion FROM banks")?.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].contains("Name") && lines[0].contains("MC_USD_Billion"));
        assert!(lines.last().unwrap().contains("100"));
        Ok(())
    }
}
