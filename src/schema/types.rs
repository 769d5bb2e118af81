// src/schema/types.rs

use serde::{Deserialize, Serialize};

/// SQL storage type of a column in the relational sink.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub enum SqlType {
    Varchar,
    Double,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Varchar => "VARCHAR",
            SqlType::Double => "DOUBLE",
        }
    }
}

/// A single column definition: header name in the CSV and SQL table, plus its type.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub struct Column {
    pub name: &'static str,
    pub ty: SqlType,
}

impl Column {
    const fn new(name: &'static str, ty: SqlType) -> Self {
        Self { name, ty }
    }
}

/// One bank scraped from the source table.
#[derive(Debug, PartialEq, Clone)]
pub struct Record {
    pub name: String,
    pub mc_usd_billion: f64,
}

impl Record {
    pub const COLUMNS: [Column; 2] = [
        Column::new("Name", SqlType::Varchar),
        Column::new("MC_USD_Billion", SqlType::Double),
    ];
}

/// A [`Record`] with its market cap converted into every target currency.
///
/// Field order is column order, both in the CSV header and the SQL table.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct EnrichedRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "MC_USD_Billion")]
    pub mc_usd_billion: f64,
    #[serde(rename = "MC_GBP_Billion")]
    pub mc_gbp_billion: f64,
    #[serde(rename = "MC_EUR_Billion")]
    pub mc_eur_billion: f64,
    #[serde(rename = "MC_INR_Billion")]
    pub mc_inr_billion: f64,
}

impl EnrichedRecord {
    pub const COLUMNS: [Column; 5] = [
        Record::COLUMNS[0],
        Record::COLUMNS[1],
        Column::new("MC_GBP_Billion", SqlType::Double),
        Column::new("MC_EUR_Billion", SqlType::Double),
        Column::new("MC_INR_Billion", SqlType::Double),
    ];
}
