//! Time windows used to filter trades before aggregation.

use crate::domain::dates::{add_days, add_months, add_years, day_key, parse_day};
use crate::domain::error::JournalError;
use crate::domain::trade::Trade;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    AllTime,
    /// Today plus the previous `n - 1` days.
    LastNDays(u32),
    LastNMonths(u32),
    LastNYears(u32),
    /// Both endpoints inclusive.
    CustomRange { start: NaiveDate, end: NaiveDate },
}

/// Resolved day bounds: `start` inclusive, `end` exclusive. `None` is unbounded.
/// Relative windows end after today; `AllTime` is unbounded on both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl WindowBounds {
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start.is_none_or(|s| day >= s) && self.end.is_none_or(|e| day < e)
    }
}

impl Window {
    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self, JournalError> {
        if start > end {
            return Err(JournalError::InvalidRange { start, end });
        }
        Ok(Window::CustomRange { start, end })
    }

    pub fn bounds(&self, today: NaiveDate) -> Result<WindowBounds, JournalError> {
        let out_of_range = || JournalError::InvalidWindow {
            spec: self.to_string(),
            reason: "window reaches outside the supported calendar".into(),
        };
        let start = match *self {
            Window::AllTime => None,
            Window::LastNDays(n) => {
                self.ensure_positive(n)?;
                Some(add_days(today, 1 - i64::from(n)).ok_or_else(out_of_range)?)
            }
            Window::LastNMonths(n) => {
                self.ensure_positive(n)?;
                let n = i32::try_from(n).map_err(|_| out_of_range())?;
                Some(add_months(today, -n).ok_or_else(out_of_range)?)
            }
            Window::LastNYears(n) => {
                self.ensure_positive(n)?;
                let n = i32::try_from(n).map_err(|_| out_of_range())?;
                Some(add_years(today, -n).ok_or_else(out_of_range)?)
            }
            Window::CustomRange { start, end } => {
                if start > end {
                    return Err(JournalError::InvalidRange { start, end });
                }
                return Ok(WindowBounds {
                    start: Some(start),
                    end: end.succ_opt(),
                });
            }
        };
        Ok(WindowBounds {
            start,
            end: start.and(today.succ_opt()),
        })
    }

    fn ensure_positive(&self, n: u32) -> Result<(), JournalError> {
        if n == 0 {
            return Err(JournalError::InvalidWindow {
                spec: self.to_string(),
                reason: "window length must be at least 1".into(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::AllTime => write!(f, "ALL"),
            Window::LastNDays(n) => write!(f, "{n}D"),
            Window::LastNMonths(n) => write!(f, "{n}M"),
            Window::LastNYears(n) => write!(f, "{n}Y"),
            Window::CustomRange { start, end } => {
                write!(f, "CUSTOM:{}..{}", day_key(*start), day_key(*end))
            }
        }
    }
}

impl FromStr for Window {
    type Err = JournalError;

    /// Accepts `ALL`, `<n>D`, `<n>W`, `<n>M`, `<n>Y` and
    /// `CUSTOM:YYYY-MM-DD..YYYY-MM-DD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim().to_uppercase();
        let invalid = |reason: &str| JournalError::InvalidWindow {
            spec: s.to_string(),
            reason: reason.to_string(),
        };

        if spec == "ALL" {
            return Ok(Window::AllTime);
        }
        if let Some(range) = spec.strip_prefix("CUSTOM:") {
            let (start, end) = range
                .split_once("..")
                .ok_or_else(|| invalid("expected CUSTOM:<start>..<end>"))?;
            return Window::custom(parse_day(start)?, parse_day(end)?);
        }

        let unit = spec.chars().last().ok_or_else(|| invalid("empty window"))?;
        let count: u32 = spec[..spec.len() - unit.len_utf8()]
            .parse()
            .map_err(|_| invalid("expected a count followed by D, W, M or Y"))?;
        if count == 0 {
            return Err(invalid("window length must be at least 1"));
        }
        match unit {
            'D' => Ok(Window::LastNDays(count)),
            'W' => count
                .checked_mul(7)
                .map(Window::LastNDays)
                .ok_or_else(|| invalid("window too long")),
            'M' => Ok(Window::LastNMonths(count)),
            'Y' => Ok(Window::LastNYears(count)),
            _ => Err(invalid("expected a count followed by D, W, M or Y")),
        }
    }
}

/// Trades dated inside `window` relative to `today`, in input order.
pub fn filter_by_window(
    trades: &[Trade],
    window: &Window,
    today: NaiveDate,
) -> Result<Vec<Trade>, JournalError> {
    let bounds = window.bounds(today)?;
    Ok(trades
        .iter()
        .filter(|t| bounds.contains(t.date))
        .cloned()
        .collect())
}
