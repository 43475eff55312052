//! CSV import/export of trade lists.
//!
//! Columns: `date,symbol,pl,asset,strategy,confidence,reason`. Only `date`,
//! `symbol` and `pl` are required on import; blank `asset` falls back to the
//! journal default when the trade is added.

use crate::domain::dates::{day_key, parse_day};
use crate::domain::error::JournalError;
use crate::domain::trade::{AssetClass, NewTrade, Trade};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    date: String,
    symbol: String,
    pl: f64,
    #[serde(default)]
    asset: String,
    #[serde(default)]
    strategy: String,
    #[serde(default)]
    confidence: String,
    #[serde(default)]
    reason: String,
}

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Parses every row into a draft. The first bad row aborts the import so
    /// a partially applied file never reaches the store.
    pub fn read_trades(&self) -> Result<Vec<NewTrade>, JournalError> {
        let file = File::open(&self.path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(file);

        let mut drafts = Vec::new();
        for (index, result) in rdr.deserialize::<CsvRow>().enumerate() {
            // header is line 1
            let line = index + 2;
            let row = result.map_err(|e| self.row_error(line, e))?;
            let date = parse_day(&row.date).map_err(|e| self.row_error(line, e))?;

            let mut draft = NewTrade::new(date, &row.symbol, row.pl);
            if !row.asset.is_empty() {
                draft.asset_class = Some(AssetClass::from(row.asset));
            }
            draft.strategy = row.strategy;
            draft.confidence = row.confidence;
            draft.reason = row.reason;
            drafts.push(draft);
        }
        Ok(drafts)
    }

    pub fn write_trades(&self, trades: &[Trade]) -> Result<(), JournalError> {
        let file = File::create(&self.path)?;
        let mut wtr = csv::Writer::from_writer(file);
        for trade in trades {
            wtr.serialize(CsvRow {
                date: day_key(trade.date),
                symbol: trade.symbol.clone(),
                pl: trade.pl,
                asset: trade.asset_class.to_string(),
                strategy: trade.strategy.clone(),
                confidence: trade.confidence.clone(),
                reason: trade.reason.clone(),
            })
            .map_err(|e| JournalError::storage(format!("{}: {}", self.path.display(), e)))?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn row_error(&self, line: usize, err: impl std::fmt::Display) -> JournalError {
        JournalError::MalformedPayload {
            reason: format!("{} line {}: {}", self.path.display(), line, err),
        }
    }
}
