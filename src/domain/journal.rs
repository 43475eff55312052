//! Application context: owns the trade store, the filter cache and the clock,
//! and exposes the command/query surface used by front-ends.

use crate::domain::aggregation::{
    self, CumulativePoint, DailyPl, DaySummary, MonthlyCalendar, PeriodStats, RankedStrategy,
    StrategyExtremes, WeekdayStats, WeeklySummary,
};
use crate::domain::cache::{FilterCache, WindowKey};
use crate::domain::error::JournalError;
use crate::domain::store::{LoadReport, TradeStore};
use crate::domain::trade::{AssetClass, NewTrade, Trade};
use crate::domain::window::{Window, filter_by_window};
use crate::ports::blob_port::BlobStore;
use crate::ports::clock_port::Clock;
use chrono::NaiveDate;
use std::rc::Rc;
use tracing::debug;

pub struct Journal {
    store: TradeStore,
    cache: FilterCache,
    clock: Box<dyn Clock>,
    default_asset: AssetClass,
    filter_runs: u64,
}

impl Journal {
    pub fn open(
        blob: Box<dyn BlobStore>,
        key: &str,
        clock: Box<dyn Clock>,
        default_asset: AssetClass,
    ) -> (Self, LoadReport) {
        let (store, report) = TradeStore::load(blob, key);
        let journal = Journal {
            store,
            cache: FilterCache::new(),
            clock,
            default_asset,
            filter_runs: 0,
        };
        (journal, report)
    }

    pub fn trades(&self) -> &[Trade] {
        self.store.all()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn default_asset(&self) -> &AssetClass {
        &self.default_asset
    }

    /// Number of times a window filter was actually computed.
    pub fn filter_runs(&self) -> u64 {
        self.filter_runs
    }

    pub fn cache(&self) -> &FilterCache {
        &self.cache
    }

    // -- commands --

    pub fn add_trade(&mut self, draft: NewTrade) -> Result<Trade, JournalError> {
        let draft = draft.validate()?;
        let now = self.clock.now_millis();
        let trade = self.store.add(draft, &self.default_asset, now)?;
        self.cache.invalidate();
        Ok(trade)
    }

    /// Validates every draft before anything is stored, then adds them in one
    /// write. A bad draft rejects the whole batch.
    pub fn import_trades(&mut self, drafts: Vec<NewTrade>) -> Result<Vec<Trade>, JournalError> {
        let drafts = drafts
            .into_iter()
            .map(NewTrade::validate)
            .collect::<Result<Vec<_>, _>>()?;
        let now = self.clock.now_millis();
        let added = self.store.add_many(drafts, &self.default_asset, now)?;
        self.cache.invalidate();
        Ok(added)
    }

    pub fn delete_trade(&mut self, id: i64) -> Result<bool, JournalError> {
        let removed = self.store.remove(id)?;
        self.cache.invalidate();
        Ok(removed)
    }

    pub fn reset_all(&mut self) -> Result<(), JournalError> {
        self.store.reset()?;
        self.cache.invalidate();
        Ok(())
    }

    // -- queries --

    /// Trades inside `window`, memoized while the same window is requested.
    pub fn query_window(&mut self, window: Window) -> Result<Rc<Vec<Trade>>, JournalError> {
        let key = WindowKey::new(window, self.clock.today());
        if let Some(hit) = self.cache.get(&key) {
            debug!(window = %window, "filter cache hit");
            return Ok(hit);
        }

        self.cache.invalidate();
        let filtered = Rc::new(filter_by_window(self.store.all(), &window, key.today)?);
        self.filter_runs += 1;
        debug!(window = %window, trades = filtered.len(), "filter cache miss");
        self.cache.put(key, Rc::clone(&filtered));
        Ok(filtered)
    }

    pub fn period_stats(&mut self, window: Window) -> Result<PeriodStats, JournalError> {
        let trades = self.query_window(window)?;
        Ok(PeriodStats::from_trades(&trades))
    }

    pub fn daily_series(&mut self, window: Window) -> Result<Vec<DailyPl>, JournalError> {
        let trades = self.query_window(window)?;
        Ok(aggregation::daily_pl_series(&trades))
    }

    pub fn cumulative_series(
        &mut self,
        window: Window,
    ) -> Result<Vec<CumulativePoint>, JournalError> {
        let daily = self.daily_series(window)?;
        Ok(aggregation::cumulative_series(&daily, self.clock.today()))
    }

    /// Best and worst strategy among the trades inside `window`.
    pub fn window_extremes(&mut self, window: Window) -> Result<StrategyExtremes, JournalError> {
        let trades = self.query_window(window)?;
        Ok(aggregation::best_and_worst_strategy(&trades))
    }

    pub fn strategies(&self) -> Vec<RankedStrategy> {
        aggregation::strategy_rankings(self.store.all())
    }

    pub fn best_and_worst(&self) -> StrategyExtremes {
        aggregation::best_and_worst_strategy(self.store.all())
    }

    /// The Monday-start week containing `reference`, or the current week.
    pub fn weekly_summary(&self, reference: Option<NaiveDate>) -> WeeklySummary {
        let day = reference.unwrap_or_else(|| self.clock.today());
        aggregation::weekly_summary(self.store.all(), day)
    }

    pub fn monthly_calendar(
        &self,
        year: i32,
        month: u32,
    ) -> Result<MonthlyCalendar, JournalError> {
        aggregation::monthly_calendar(self.store.all(), year, month)
    }

    pub fn weekday_distribution(&self) -> Vec<WeekdayStats> {
        aggregation::weekday_win_rate_distribution(self.store.all())
    }

    pub fn recent(&self, limit: usize) -> Vec<Trade> {
        aggregation::recent_trades(self.store.all(), limit)
    }

    pub fn day_detail(&self, day: NaiveDate) -> Vec<Trade> {
        aggregation::trades_on(self.store.all(), day)
    }

    pub fn today_summary(&self) -> DaySummary {
        aggregation::day_summary(self.store.all(), self.clock.today())
    }

    pub fn histogram(&self, days: u32) -> Vec<DailyPl> {
        aggregation::daily_histogram(self.store.all(), self.clock.today(), days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_blob_adapter::MemoryBlobStore;
    use crate::domain::dates::parse_day;
    use crate::domain::store::DEFAULT_STORAGE_KEY;
    use std::cell::Cell;

    struct StepClock {
        today: NaiveDate,
        millis: Cell<i64>,
    }

    impl Clock for StepClock {
        fn today(&self) -> NaiveDate {
            self.today
        }
        fn now_millis(&self) -> i64 {
            let now = self.millis.get();
            self.millis.set(now + 1);
            now
        }
    }

    fn d(s: &str) -> NaiveDate {
        parse_day(s).unwrap()
    }

    fn journal(today: &str) -> Journal {
        let clock = StepClock {
            today: d(today),
            millis: Cell::new(1_000),
        };
        Journal::open(
            Box::new(MemoryBlobStore::new()),
            DEFAULT_STORAGE_KEY,
            Box::new(clock),
            AssetClass::Stock,
        )
        .0
    }

    #[test]
    fn repeated_window_query_is_served_from_cache() {
        let mut j = journal("2024-01-10");
        j.add_trade(NewTrade::new(d("2024-01-09"), "A", 5.0)).unwrap();

        let first = j.query_window(Window::LastNDays(7)).unwrap();
        let second = j.query_window(Window::LastNDays(7)).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(j.filter_runs(), 1);
        assert_eq!(j.cache().hits(), 1);
    }

    #[test]
    fn mutation_forces_recompute() {
        let mut j = journal("2024-01-10");
        let trade = j.add_trade(NewTrade::new(d("2024-01-09"), "A", 5.0)).unwrap();
        let before = j.query_window(Window::AllTime).unwrap();

        j.delete_trade(trade.id).unwrap();
        let after = j.query_window(Window::AllTime).unwrap();
        assert_eq!(j.filter_runs(), 2);
        assert_eq!(before.len(), 1);
        assert!(after.is_empty());
    }

    #[test]
    fn switching_windows_recomputes() {
        let mut j = journal("2024-01-10");
        j.query_window(Window::LastNDays(7)).unwrap();
        j.query_window(Window::LastNMonths(1)).unwrap();
        j.query_window(Window::LastNDays(7)).unwrap();
        assert_eq!(j.filter_runs(), 3);
    }

    #[test]
    fn invalid_window_does_not_poison_cache() {
        let mut j = journal("2024-01-10");
        j.query_window(Window::AllTime).unwrap();
        let bad = Window::CustomRange {
            start: d("2024-02-01"),
            end: d("2024-01-01"),
        };
        assert!(matches!(
            j.query_window(bad),
            Err(JournalError::InvalidRange { .. })
        ));
        assert!(j.cache().cached_key().is_none());
    }

    #[test]
    fn add_trade_validates_input() {
        let mut j = journal("2024-01-10");
        assert!(j.add_trade(NewTrade::new(d("2024-01-09"), " ", 5.0)).is_err());
        assert!(j.trades().is_empty());
        let t = j.add_trade(NewTrade::new(d("2024-01-09"), "nvda", 5.0)).unwrap();
        assert_eq!(t.symbol, "NVDA");
        assert_eq!(t.asset_class, AssetClass::Stock);
    }

    #[test]
    fn reset_empties_everything() {
        let mut j = journal("2024-01-10");
        j.add_trade(NewTrade::new(d("2024-01-09"), "A", 5.0)).unwrap();
        j.query_window(Window::AllTime).unwrap();
        j.reset_all().unwrap();
        assert!(j.trades().is_empty());
        assert!(j.query_window(Window::AllTime).unwrap().is_empty());
        assert_eq!(j.filter_runs(), 2);
    }

    #[test]
    fn import_rejects_whole_batch_on_bad_draft() {
        let mut j = journal("2024-01-10");
        let result = j.import_trades(vec![
            NewTrade::new(d("2024-01-08"), "AAPL", 10.0),
            NewTrade::new(d("2024-01-09"), "MSFT", f64::NAN),
        ]);
        assert!(matches!(result, Err(JournalError::InvalidTrade { .. })));
        assert!(j.trades().is_empty());
    }

    #[test]
    fn import_adds_batch_and_invalidates_cache() {
        let mut j = journal("2024-01-10");
        j.query_window(Window::AllTime).unwrap();
        let added = j
            .import_trades(vec![
                NewTrade::new(d("2024-01-08"), "aapl", 10.0),
                NewTrade::new(d("2024-01-09"), "msft", -3.0),
            ])
            .unwrap();
        assert_eq!(added.len(), 2);
        assert!(added[0].id < added[1].id);
        assert_eq!(added[0].symbol, "AAPL");
        assert!(j.cache().cached_key().is_none());
        assert_eq!(j.query_window(Window::AllTime).unwrap().len(), 2);
    }

    #[test]
    fn window_extremes_ignore_trades_outside_window() {
        let mut j = journal("2024-01-10");
        j.add_trade(NewTrade::new(d("2023-06-01"), "OLD", 900.0).with_strategy("Swing"))
            .unwrap();
        j.add_trade(NewTrade::new(d("2024-01-09"), "A", 20.0).with_strategy("Scalp"))
            .unwrap();
        j.add_trade(NewTrade::new(d("2024-01-10"), "B", -5.0).with_strategy("Fade"))
            .unwrap();

        let extremes = j.window_extremes(Window::LastNDays(7)).unwrap();
        assert_eq!(extremes.best.map(|s| s.name), Some("Scalp".to_string()));
        assert_eq!(extremes.worst.map(|s| s.name), Some("Fade".to_string()));
        assert_eq!(j.best_and_worst().best.map(|s| s.name), Some("Swing".to_string()));
    }

    #[test]
    fn today_summary_and_histogram_use_clock() {
        let mut j = journal("2024-01-10");
        j.add_trade(NewTrade::new(d("2024-01-10"), "A", 5.0)).unwrap();
        j.add_trade(NewTrade::new(d("2024-01-10"), "B", -2.0)).unwrap();
        let today = j.today_summary();
        assert_eq!(today.trade_count, 2);
        assert_eq!(today.win_rate(), 50);
        let hist = j.histogram(7);
        assert_eq!(hist.last().map(|p| p.date), Some(d("2024-01-10")));
    }
}
