//! Trade records as logged in the journal.

use crate::domain::error::JournalError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Asset class tag. Open-ended: unknown tags are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AssetClass {
    #[default]
    Stock,
    Option,
    Crypto,
    Other(String),
}

impl AssetClass {
    pub fn as_str(&self) -> &str {
        match self {
            AssetClass::Stock => "Stock",
            AssetClass::Option => "Option",
            AssetClass::Crypto => "Crypto",
            AssetClass::Other(tag) => tag,
        }
    }
}

impl From<String> for AssetClass {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "Stock" => AssetClass::Stock,
            "Option" => AssetClass::Option,
            "Crypto" => AssetClass::Crypto,
            _ => AssetClass::Other(tag),
        }
    }
}

impl From<&str> for AssetClass {
    fn from(tag: &str) -> Self {
        AssetClass::from(tag.to_string())
    }
}

impl From<AssetClass> for String {
    fn from(asset: AssetClass) -> Self {
        asset.as_str().to_string()
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A logged trade outcome. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: i64,
    #[serde(with = "day_format")]
    pub date: NaiveDate,
    #[serde(rename = "sym")]
    pub symbol: String,
    pub pl: f64,
    #[serde(rename = "asset", default)]
    pub asset_class: AssetClass,
    #[serde(rename = "strat", default)]
    pub strategy: String,
    #[serde(rename = "conf", default)]
    pub confidence: String,
    #[serde(default)]
    pub reason: String,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.pl > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.pl < 0.0
    }
}

/// Fields supplied when logging a trade. `id` and `asset_class` are filled in
/// by the store and journal when absent.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrade {
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub symbol: String,
    pub pl: f64,
    pub asset_class: Option<AssetClass>,
    pub strategy: String,
    pub confidence: String,
    pub reason: String,
}

impl NewTrade {
    pub fn new(date: NaiveDate, symbol: &str, pl: f64) -> Self {
        NewTrade {
            id: None,
            date,
            symbol: symbol.to_string(),
            pl,
            asset_class: None,
            strategy: String::new(),
            confidence: String::new(),
            reason: String::new(),
        }
    }

    pub fn with_strategy(mut self, strategy: &str) -> Self {
        self.strategy = strategy.to_string();
        self
    }

    pub fn with_asset(mut self, asset: AssetClass) -> Self {
        self.asset_class = Some(asset);
        self
    }

    /// Normalizes text fields and rejects values that would make aggregates
    /// ill-defined.
    pub fn validate(mut self) -> Result<Self, JournalError> {
        let symbol = self.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(JournalError::InvalidTrade {
                field: "symbol".into(),
                reason: "symbol must not be empty".into(),
            });
        }
        if !self.pl.is_finite() {
            return Err(JournalError::InvalidTrade {
                field: "pl".into(),
                reason: "P/L must be a finite number".into(),
            });
        }
        self.symbol = symbol;
        self.strategy = self.strategy.trim().to_string();
        self.reason = self.reason.trim().to_string();
        Ok(self)
    }

    pub(crate) fn into_trade(self, id: i64, default_asset: &AssetClass) -> Trade {
        Trade {
            id,
            date: self.date,
            symbol: self.symbol,
            pl: self.pl,
            asset_class: self.asset_class.unwrap_or_else(|| default_asset.clone()),
            strategy: self.strategy,
            confidence: self.confidence,
            reason: self.reason,
        }
    }
}

/// Win/loss toggle used by entry forms that take an unsigned magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn signed(self, magnitude: f64) -> Result<f64, JournalError> {
        if !magnitude.is_finite() || magnitude < 0.0 {
            return Err(JournalError::InvalidTrade {
                field: "pl".into(),
                reason: "enter a valid positive P/L amount".into(),
            });
        }
        Ok(match self {
            Outcome::Win => magnitude,
            Outcome::Loss => -magnitude,
        })
    }
}

mod day_format {
    use crate::domain::dates::{day_key, parse_day};
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&day_key(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_day(&raw).map_err(serde::de::Error::custom)
    }
}

pub(crate) fn sort_newest_first(trades: &mut [Trade]) {
    trades.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
}
