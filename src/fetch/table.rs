// src/fetch/table.rs

use anyhow::{anyhow, bail, Context, Result};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::schema::Record;

static TBODY: Lazy<Selector> = Lazy::new(|| Selector::parse("tbody").expect("tbody selector"));
static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("tr selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("td selector"));

/// Minimum number of `<td>` cells a row needs to be kept.
const MIN_CELLS: usize = 3;

/// Parse the first `<tbody>` written in `html` into records.
///
/// Only a literal `<tbody>` tag in the source counts. The HTML parser adds an
/// implied `tbody` to every `table`, so the document is cut at the first tag
/// written out and parsed from there.
///
/// The first row is the header and is always skipped. Every following row
/// with at least three cells yields `cells[1]` as the name and `cells[2]` as
/// the USD market cap; shorter rows are dropped.
pub fn parse_records(html: &str) -> Result<Vec<Record>> {
    let start =
        literal_tbody_start(html).ok_or_else(|| anyhow!("no <tbody> element found in document"))?;
    let fragment = Html::parse_fragment(&format!("<table>{}", &html[start..]));
    let tbody = fragment
        .select(&TBODY)
        .next()
        .ok_or_else(|| anyhow!("no <tbody> element found in document"))?;

    let mut records = Vec::new();
    for (idx, row) in tbody.select(&ROW).enumerate().skip(1) {
        let cells: Vec<ElementRef> = row.select(&CELL).collect();
        if cells.len() < MIN_CELLS {
            debug!(row = idx, cells = cells.len(), "skipping short row");
            continue;
        }

        let name = cell_text(&cells[1]);
        let raw_value = cell_text(&cells[2]);
        let mc_usd_billion: f64 = raw_value
            .parse()
            .with_context(|| format!("row {idx}: parsing market cap {raw_value:?} for {name:?}"))?;
        if !mc_usd_billion.is_finite() {
            bail!("row {idx}: market cap {raw_value:?} for {name:?} is not a finite number");
        }

        records.push(Record {
            name,
            mc_usd_billion,
        });
    }

    Ok(records)
}

/// Spans whose contents are never markup: comments, scripts and styles.
const RAW_SPANS: [(&[u8], &[u8]); 3] = [
    (b"<!--", b"-->"),
    (b"<script", b"</script"),
    (b"<style", b"</style"),
];

/// Byte offset of the first `<tbody` open tag, matched case-insensitively.
///
/// Text inside [`RAW_SPANS`] is blanked first; offsets are unchanged.
fn literal_tbody_start(html: &str) -> Option<usize> {
    const TAG: &[u8] = b"<tbody";
    let mut bytes = html.to_ascii_lowercase().into_bytes();
    blank_raw_spans(&mut bytes);
    bytes.windows(TAG.len() + 1).position(|w| {
        let next = w[TAG.len()];
        w.starts_with(TAG) && (next == b'>' || next == b'/' || next.is_ascii_whitespace())
    })
}

/// Overwrite every raw span with spaces. An unclosed span runs to the end.
fn blank_raw_spans(bytes: &mut [u8]) {
    let mut i = 0;
    while i < bytes.len() {
        let Some((open, close)) = RAW_SPANS.iter().find(|(open, _)| bytes[i..].starts_with(open))
        else {
            i += 1;
            continue;
        };
        let body = i + open.len();
        let end = find(&bytes[body..], close).map_or(bytes.len(), |p| body + p + close.len());
        bytes[i..end].fill(b' ');
        i = end;
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}
