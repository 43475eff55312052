//! In-memory trade collection mirrored to a blob store.
//!
//! The whole collection is serialized as one JSON array under a single key.
//! Mutations are written through before they become visible, so the
//! in-memory view never diverges from what was last persisted.

use crate::domain::error::JournalError;
use crate::domain::trade::{AssetClass, NewTrade, Trade};
use crate::ports::blob_port::BlobStore;
use std::collections::HashSet;
use tracing::{debug, info, warn};

pub const DEFAULT_STORAGE_KEY: &str = "tj_v4_trades";

/// Outcome of reading the persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub loaded: usize,
    /// Records dropped because they could not be decoded or repeated an id.
    pub skipped: usize,
    /// The stored blob existed but could not be read as a list at all.
    pub payload_discarded: bool,
}

pub struct TradeStore {
    blob: Box<dyn BlobStore>,
    key: String,
    trades: Vec<Trade>,
    last_id: i64,
}

impl TradeStore {
    /// Reads the collection from `blob`. Missing, unreadable or malformed data
    /// yields an empty store rather than an error.
    pub fn load(blob: Box<dyn BlobStore>, key: &str) -> (Self, LoadReport) {
        let (trades, report) = match blob.get(key) {
            Ok(Some(payload)) => decode_payload(&payload),
            Ok(None) => {
                debug!(key, "no stored trades");
                (Vec::new(), LoadReport::default())
            }
            Err(e) => {
                warn!(key, error = %e, "trade storage unavailable, starting empty");
                (Vec::new(), LoadReport::default())
            }
        };
        info!(
            key,
            loaded = report.loaded,
            skipped = report.skipped,
            "trade store loaded"
        );

        let last_id = trades.iter().map(|t| t.id).max().unwrap_or(0);
        let store = TradeStore {
            blob,
            key: key.to_string(),
            trades,
            last_id,
        };
        (store, report)
    }

    pub fn all(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Trade> {
        self.trades.iter().find(|t| t.id == id)
    }

    /// Appends a trade. Without an explicit id the trade gets `now_millis`,
    /// bumped past the previous id when the clock has not moved on.
    pub fn add(
        &mut self,
        draft: NewTrade,
        default_asset: &AssetClass,
        now_millis: i64,
    ) -> Result<Trade, JournalError> {
        let mut added = self.add_many(vec![draft], default_asset, now_millis)?;
        added
            .pop()
            .ok_or_else(|| JournalError::storage("trade was not added"))
    }

    /// Appends every draft with a single write. Either all of them become
    /// visible or none do.
    ///
    /// Ids strictly increase in insertion order: an explicit id must exceed
    /// every id assigned so far.
    pub fn add_many(
        &mut self,
        drafts: Vec<NewTrade>,
        default_asset: &AssetClass,
        now_millis: i64,
    ) -> Result<Vec<Trade>, JournalError> {
        let mut last_id = self.last_id;
        let mut added = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = match draft.id {
                Some(id) if self.get(id).is_some() || added.iter().any(|t: &Trade| t.id == id) => {
                    return Err(JournalError::DuplicateTrade { id });
                }
                Some(id) if id <= last_id => {
                    return Err(JournalError::InvalidTrade {
                        field: "id".into(),
                        reason: format!("id {id} must be greater than {last_id}"),
                    });
                }
                Some(id) => id,
                None => now_millis.max(last_id.saturating_add(1)),
            };
            last_id = id;
            added.push(draft.into_trade(id, default_asset));
        }

        let mut next = self.trades.clone();
        next.extend(added.iter().cloned());
        self.persist(&next)?;

        self.trades = next;
        self.last_id = last_id;
        for trade in &added {
            info!(id = trade.id, symbol = %trade.symbol, pl = trade.pl, "trade added");
        }
        Ok(added)
    }

    /// Removes the trade with `id`. Returns whether anything was removed; an
    /// unknown id is not an error.
    pub fn remove(&mut self, id: i64) -> Result<bool, JournalError> {
        let next: Vec<Trade> = self.trades.iter().filter(|t| t.id != id).cloned().collect();
        let removed = next.len() != self.trades.len();
        self.persist(&next)?;

        self.trades = next;
        if removed {
            info!(id, "trade removed");
        } else {
            debug!(id, "remove: no such trade");
        }
        Ok(removed)
    }

    /// Drops every trade and the backing blob.
    pub fn reset(&mut self) -> Result<(), JournalError> {
        self.blob.remove(&self.key)?;
        let dropped = self.trades.len();
        self.trades.clear();
        info!(dropped, "trade store reset");
        Ok(())
    }

    fn persist(&self, trades: &[Trade]) -> Result<(), JournalError> {
        let payload = serde_json::to_string(trades).map_err(|e| JournalError::MalformedPayload {
            reason: e.to_string(),
        })?;
        self.blob.set(&self.key, &payload)
    }
}

/// Decodes a stored JSON array record by record, skipping anything unusable.
pub fn decode_payload(payload: &str) -> (Vec<Trade>, LoadReport) {
    let mut report = LoadReport::default();
    let records: Vec<serde_json::Value> = match serde_json::from_str(payload) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "stored trades are not a JSON list, ignoring them");
            report.payload_discarded = true;
            return (Vec::new(), report);
        }
    };

    let mut seen = HashSet::new();
    let mut trades = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<Trade>(record) {
            Ok(trade) if !trade.pl.is_finite() => {
                warn!(index, id = trade.id, "skipping trade with non-finite P/L");
                report.skipped += 1;
            }
            Ok(trade) if trade.symbol.trim().is_empty() => {
                warn!(index, id = trade.id, "skipping trade without a symbol");
                report.skipped += 1;
            }
            Ok(trade) if !seen.insert(trade.id) => {
                warn!(index, id = trade.id, "skipping trade with duplicate id");
                report.skipped += 1;
            }
            Ok(mut trade) => {
                trade.symbol = trade.symbol.trim().to_uppercase();
                trades.push(trade);
            }
            Err(e) => {
                warn!(index, error = %e, "skipping malformed trade record");
                report.skipped += 1;
            }
        }
    }
    report.loaded = trades.len();
    (trades, report)
}
