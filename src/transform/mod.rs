// src/transform/mod.rs

use anyhow::{anyhow, bail, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use std::{fmt, path::Path};
use tracing::{info, instrument};

use crate::schema::{EnrichedRecord, Record};

pub mod rates;

pub use rates::RateTable;

/// Decimal places kept on every converted value.
const DECIMALS: u32 = 2;

/// Target currencies for the market-cap conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Currency {
    Gbp,
    Eur,
    Inr,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Gbp, Currency::Eur, Currency::Inr];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Gbp => "GBP",
            Currency::Eur => "EUR",
            Currency::Inr => "INR",
        }
    }

    /// Name of the derived column holding values in this currency.
    pub fn column(&self) -> &'static str {
        match self {
            Currency::Gbp => "MC_GBP_Billion",
            Currency::Eur => "MC_EUR_Billion",
            Currency::Inr => "MC_INR_Billion",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// `base * rate` rounded to two decimals, midpoints away from zero.
///
/// Both operands go through their shortest decimal form, so `1.005` rounds
/// as written rather than as its nearest binary float. Products beyond
/// `Decimal` range (about 7.9e28) are rounded in `f64` instead. `None` only
/// when the product is not finite.
pub fn convert(base: f64, rate: f64) -> Option<f64> {
    let exact = to_decimal(base)
        .zip(to_decimal(rate))
        .and_then(|(b, r)| b.checked_mul(r))
        .and_then(|product| {
            product
                .round_dp_with_strategy(DECIMALS, RoundingStrategy::MidpointAwayFromZero)
                .to_string()
                .parse()
                .ok()
        });
    exact.or_else(|| {
        let scale = 10f64.powi(DECIMALS as i32);
        let rounded = (base * rate * scale).round() / scale;
        rounded.is_finite().then_some(rounded)
    })
}

fn to_decimal(value: f64) -> Option<Decimal> {
    value.to_string().parse().ok()
}

/// Append one converted column per [`Currency`] to every record.
///
/// All rates are resolved before any row is touched, so a missing currency
/// fails the whole stage.
pub fn enrich(records: Vec<Record>, rates: &RateTable) -> Result<Vec<EnrichedRecord>> {
    let gbp = rates.rate(Currency::Gbp)?;
    let eur = rates.rate(Currency::Eur)?;
    let inr = rates.rate(Currency::Inr)?;

    records
        .into_iter()
        .map(|r| -> Result<EnrichedRecord> {
            let to = |currency: Currency, rate: f64| {
                convert(r.mc_usd_billion, rate).ok_or_else(|| {
                    anyhow!(
                        "cannot convert {} for {:?} to {}",
                        r.mc_usd_billion,
                        r.name,
                        currency
                    )
                })
            };
            Ok(EnrichedRecord {
                mc_gbp_billion: to(Currency::Gbp, gbp)?,
                mc_eur_billion: to(Currency::Eur, eur)?,
                mc_inr_billion: to(Currency::Inr, inr)?,
                mc_usd_billion: r.mc_usd_billion,
                name: r.name,
            })
        })
        .collect()
}

/// Load the rate table at `rate_source` and enrich `records` with it.
#[instrument(level = "info", skip(records))]
pub fn transform(records: Vec<Record>, rate_source: &Path) -> Result<Vec<EnrichedRecord>> {
    let rates = RateTable::from_path(rate_source)?;
    if rates.is_empty() {
        bail!("rate file {:?} has no rows", rate_source);
    }
    info!(currencies = rates.len(), "loaded rate table");
    enrich(records, &rates)
}
