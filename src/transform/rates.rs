use anyhow::{anyhow, bail, Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::{collections::HashMap, fs::File, io::Read, path::Path};

use super::Currency;

#[derive(Debug, Deserialize)]
struct RateRow {
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Rate")]
    rate: f64,
}

/// Exchange rates from USD, keyed by currency code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: HashMap<String, f64>,
}

impl RateTable {
    /// Load a rate CSV whose header contains at least `Currency` and `Rate`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("opening rate file {:?}", path))?;
        Self::from_reader(file).with_context(|| format!("parsing rate file {:?}", path))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rates = HashMap::new();
        for (line, row) in csv_reader.deserialize::<RateRow>().enumerate() {
            let row = row.with_context(|| format!("rate row {}", line + 1))?;
            if !row.rate.is_finite() || row.rate <= 0.0 {
                bail!(
                    "rate for {} must be a positive number, got {}",
                    row.currency,
                    row.rate
                );
            }
            rates.insert(row.currency, row.rate);
        }
        Ok(Self { rates })
    }

    /// Rate for `currency`, failing if the table has no entry for it.
    pub fn rate(&self, currency: Currency) -> Result<f64> {
        self.rates
            .get(currency.code())
            .copied()
            .ok_or_else(|| anyhow!("currency {} missing from rate table", currency.code()))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl FromIterator<(String, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_rates_and_ignores_extra_columns() -> Result<()> {
        let csv = "Currency,Rate,Source\nEUR,0.93,ecb\nGBP, 0.8 ,boe\nINR,82.95,rbi\n";
        let table = RateTable::from_reader(csv.as_bytes())?;
        assert_eq!(table.len(), 3);
        assert_eq!(table.rate(Currency::Gbp)?, 0.8);
        assert_eq!(table.rate(Currency::Eur)?, 0.93);
        assert_eq!(table.rate(Currency::Inr)?, 82.95);
        Ok(())
    }

    #[test]
    fn missing_currency_is_a_lookup_error() -> Result<()> {
        let table = RateTable::from_reader("Currency,Rate\nEUR,0.93\n".as_bytes())?;
        let err = table.rate(Currency::Inr).unwrap_err();
        assert!(err.to_string().contains("INR"));
        Ok(())
    }

    #[test]
    fn malformed_rate_is_a_parse_error() {
        assert!(RateTable::from_reader("Currency,Rate\nEUR,abc\n".as_bytes()).is_err());
        assert!(RateTable::from_reader("Code,Value\nEUR,0.9\n".as_bytes()).is_err());
    }

    #[test]
    fn non_positive_rate_is_rejected() {
        assert!(RateTable::from_reader("Currency,Rate\nEUR,0\n".as_bytes()).is_err());
        assert!(RateTable::from_reader("Currency,Rate\nEUR,-1.5\n".as_bytes()).is_err());
    }

    #[test]
    fn from_path_names_the_file_on_error() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "Currency,Rate")?;
        writeln!(file, "GBP,not-a-rate")?;
        let err = RateTable::from_path(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing rate file"));
        Ok(())
    }
}
