//! Wall-clock port.

use chrono::NaiveDate;

pub trait Clock {
    /// The current local calendar day.
    fn today(&self) -> NaiveDate;
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}
