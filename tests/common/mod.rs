#![allow(dead_code)]

use chrono::NaiveDate;
use std::cell::Cell;
use tradejournal::adapters::memory_blob_adapter::MemoryBlobStore;
use tradejournal::domain::dates::parse_day;
use tradejournal::domain::journal::Journal;
use tradejournal::domain::store::DEFAULT_STORAGE_KEY;
use tradejournal::domain::trade::{AssetClass, NewTrade, Trade};
use tradejournal::ports::clock_port::Clock;

/// Clock pinned to one day; ids advance by one millisecond per call.
pub struct FixedClock {
    pub today: NaiveDate,
    millis: Cell<i64>,
}

impl FixedClock {
    pub fn new(today: &str) -> Self {
        Self {
            today: day(today),
            millis: Cell::new(1_700_000_000_000),
        }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now_millis(&self) -> i64 {
        let now = self.millis.get();
        self.millis.set(now + 1);
        now
    }
}

pub fn day(s: &str) -> NaiveDate {
    parse_day(s).unwrap()
}

pub fn trade(id: i64, date: &str, pl: f64) -> Trade {
    Trade {
        id,
        date: day(date),
        symbol: "TEST".to_string(),
        pl,
        asset_class: AssetClass::Stock,
        strategy: String::new(),
        confidence: String::new(),
        reason: String::new(),
    }
}

pub fn strategy_trade(id: i64, date: &str, strategy: &str, pl: f64) -> Trade {
    Trade {
        strategy: strategy.to_string(),
        ..trade(id, date, pl)
    }
}

pub fn draft(date: &str, symbol: &str, pl: f64) -> NewTrade {
    NewTrade::new(day(date), symbol, pl)
}

/// Journal over a fresh in-memory blob. The returned handle shares storage
/// with the journal.
pub fn memory_journal(today: &str) -> (Journal, MemoryBlobStore) {
    let blob = MemoryBlobStore::new();
    let (journal, _) = Journal::open(
        Box::new(blob.clone()),
        DEFAULT_STORAGE_KEY,
        Box::new(FixedClock::new(today)),
        AssetClass::Stock,
    );
    (journal, blob)
}

pub fn journal_with(today: &str, drafts: Vec<NewTrade>) -> Journal {
    let (mut journal, _) = memory_journal(today);
    for d in drafts {
        journal.add_trade(d).unwrap();
    }
    journal
}
