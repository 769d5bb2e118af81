use crate::schema::{column_names, EnrichedRecord, Record};

/// Render `rows` under `columns` as a left-aligned, fixed-width text table.
pub fn format_table(columns: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{: <w$}", cell, w = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(columns));
    out.push('\n');
    out.push_str(&format!("{:-<1$}", "", line(columns).len()));
    for row in rows {
        out.push('\n');
        out.push_str(&line(row.as_slice()));
    }
    out
}

pub fn format_records(records: &[Record]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| vec![r.name.clone(), r.mc_usd_billion.to_string()])
        .collect();
    format_table(&column_names(&Record::COLUMNS), &rows)
}

pub fn format_enriched(records: &[EnrichedRecord]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|r| {
            vec![
                r.name.clone(),
                r.mc_usd_billion.to_string(),
                r.mc_gbp_billion.to_string(),
                r.mc_eur_billion.to_string(),
                r.mc_inr_billion.to_string(),
            ]
        })
        .collect();
    format_table(&column_names(&EnrichedRecord::COLUMNS), &rows)
}
