pub mod types;

pub use types::{Column, EnrichedRecord, Record, SqlType};

/// Column names of `columns`, in order.
pub fn column_names(columns: &[Column]) -> Vec<String> {
    columns.iter().map(|c| c.name.to_string()).collect()
}

/// Render a `CREATE TABLE` statement for `table_name` with the given columns.
pub fn create_table_sql(table_name: &str, columns: &[Column]) -> String {
    let defs = columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(c.name), c.ty.as_sql()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({});", quote_ident(table_name), defs)
}

/// Quote an SQL identifier, doubling any embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enriched_columns_extend_record_columns() {
        let names = column_names(&EnrichedRecord::COLUMNS);
        assert_eq!(
            names,
            vec![
                "Name",
                "MC_USD_Billion",
                "MC_GBP_Billion",
                "MC_EUR_Billion",
                "MC_INR_Billion"
            ]
        );
        assert_eq!(&EnrichedRecord::COLUMNS[..2], &Record::COLUMNS[..]);
    }

    #[test]
    fn create_table_sql_quotes_identifiers() {
        let sql = create_table_sql("Largest_banks_marketcaps", &Record::COLUMNS);
        assert_eq!(
            sql,
            r#"CREATE TABLE "Largest_banks_marketcaps" ("Name" VARCHAR, "MC_USD_Billion" DOUBLE);"#
        );
        assert_eq!(quote_ident(r#"odd"name"#), r#""odd""name""#);
    }
}
