// src/write.rs

use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use std::{fs, fs::File, io, path::Path};
use tracing::{info, instrument, warn};

use crate::schema::{column_names, EnrichedRecord};

/// Write `records` to `path` as CSV with a header row, replacing any existing file.
///
/// Rows go to a hidden sibling temp file first and are renamed over `path`
/// once complete. On failure the temp file is removed.
#[instrument(level = "info", skip(records), fields(rows = records.len()))]
pub fn write_csv(records: &[EnrichedRecord], path: &Path) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|f| f.to_str())
        .ok_or_else(|| anyhow!("{:?} has no file name", path))?;
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    let written = write_rows(records, &tmp_path).and_then(|()| {
        fs::rename(&tmp_path, path)
            .with_context(|| format!("renaming {:?} -> {:?}", tmp_path, path))
    });
    if let Err(e) = written {
        match fs::remove_file(&tmp_path) {
            Err(rm) if rm.kind() != io::ErrorKind::NotFound => {
                warn!(path = %tmp_path.display(), error = %rm, "could not remove temp file")
            }
            _ => {}
        }
        return Err(e);
    }

    info!(path = %path.display(), "csv written");
    Ok(())
}

fn write_rows(records: &[EnrichedRecord], tmp_path: &Path) -> Result<()> {
    let tmp = File::create(tmp_path).with_context(|| format!("creating {:?}", tmp_path))?;
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(tmp);
    writer
        .write_record(column_names(&EnrichedRecord::COLUMNS))
        .with_context(|| format!("writing header to {:?}", tmp_path))?;
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("writing {:?} to {:?}", record.name, tmp_path))?;
    }
    writer
        .flush()
        .with_context(|| format!("flushing {:?}", tmp_path))?;
    Ok(())
}

/// Read back a CSV produced by [`write_csv`].
pub fn read_csv(path: &Path) -> Result<Vec<EnrichedRecord>> {
    let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
    reader
        .deserialize()
        .collect::<Result<Vec<EnrichedRecord>, _>>()
        .with_context(|| format!("parsing {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Vec<EnrichedRecord> {
        vec![
            EnrichedRecord {
                name: "JPMorgan Chase".into(),
                mc_usd_billion: 432.92,
                mc_gbp_billion: 346.34,
                mc_eur_billion: 402.62,
                mc_inr_billion: 35910.71,
            },
            EnrichedRecord {
                name: "Bank, with comma".into(),
                mc_usd_billion: 100.0,
                mc_gbp_billion: 80.0,
                mc_eur_billion: 93.0,
                mc_inr_billion: 8250.0,
            },
        ]
    }

    #[test]
    fn round_trips_columns_and_rows() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("banks.csv");
        write_csv(&sample(), &path)?;

        let text = fs::read_to_string(&path)?;
        let header = text.lines().next().unwrap_or_default();
        assert_eq!(header, column_names(&EnrichedRecord::COLUMNS).join(","));

        let back = read_csv(&path)?;
        assert_eq!(back.len(), 2);
        assert_eq!(back, sample());
        Ok(())
    }

    #[test]
    fn overwrites_existing_file() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("banks.csv");
        fs::write(&path, "stale,contents\n1,2\n3,4\n5,6\n")?;

        write_csv(&sample()[..1], &path)?;

        assert_eq!(read_csv(&path)?.len(), 1);
        assert!(!tmp.path().join(".banks.csv.tmp").exists());
        Ok(())
    }

    #[test]
    fn empty_table_still_writes_header() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("banks.csv");
        write_csv(&[], &path)?;
        assert_eq!(
            fs::read_to_string(&path)?.trim_end(),
            "Name,MC_USD_Billion,MC_GBP_Billion,MC_EUR_Billion,MC_INR_Billion"
        );
        assert!(read_csv(&path)?.is_empty());
        Ok(())
    }

    #[test]
    fn missing_directory_is_an_error() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nope").join("banks.csv");
        assert!(write_csv(&sample(), &path).is_err());
    }

    #[test]
    fn failed_rename_removes_temp_file() -> Result<()> {
        let tmp = tempdir()?;
        let path = tmp.path().join("banks.csv");
        fs::create_dir(&path)?;
        fs::write(path.join("occupied"), "x")?;

        assert!(write_csv(&sample(), &path).is_err());
        assert!(!tmp.path().join(".banks.csv.tmp").exists());
        assert!(path.join("occupied").exists());
        Ok(())
    }
}
