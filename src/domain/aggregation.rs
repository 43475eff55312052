//! Aggregation engine: pure rollups over a trade collection.
//!
//! Every function here is deterministic in its inputs. Anything that depends
//! on "today" takes it as a parameter. Win rates are whole percentages rounded
//! half-up; amounts are never rounded.

use crate::domain::dates::{add_days, days_in_month, start_of_week};
use crate::domain::error::JournalError;
use crate::domain::trade::{Trade, sort_newest_first};
use crate::domain::window::{Window, filter_by_window};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeMap;

/// `round(wins / count * 100)`, 0 for an empty set.
pub fn win_rate_pct(wins: usize, count: usize) -> u32 {
    if count == 0 {
        return 0;
    }
    // integer form of floor(wins * 100 / count + 0.5); exact at .5
    ((wins * 200 + count) / (2 * count)) as u32
}

pub fn net_pl(trades: &[Trade]) -> f64 {
    trades.iter().map(|t| t.pl).sum()
}

pub fn group_by_day(trades: &[Trade]) -> BTreeMap<NaiveDate, Vec<&Trade>> {
    let mut groups: BTreeMap<NaiveDate, Vec<&Trade>> = BTreeMap::new();
    for trade in trades {
        groups.entry(trade.date).or_default().push(trade);
    }
    groups
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyPl {
    pub date: NaiveDate,
    pub net_pl: f64,
}

/// Net P/L per traded day, ascending by day.
pub fn daily_pl_series(trades: &[Trade]) -> Vec<DailyPl> {
    group_by_day(trades)
        .into_iter()
        .map(|(date, day_trades)| DailyPl {
            date,
            net_pl: day_trades.iter().map(|t| t.pl).sum(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub total: f64,
    /// Carry-forward point added at `today`; not backed by any trade.
    pub synthetic: bool,
}

/// Running total of `daily` (assumed ascending). When the last traded day is
/// before `today`, one synthetic point at `today` repeats the final total.
pub fn cumulative_series(daily: &[DailyPl], today: NaiveDate) -> Vec<CumulativePoint> {
    let mut running = 0.0;
    let mut points: Vec<CumulativePoint> = daily
        .iter()
        .map(|d| {
            running += d.net_pl;
            CumulativePoint {
                date: d.date,
                total: running,
                synthetic: false,
            }
        })
        .collect();

    if let Some(last) = points.last().copied() {
        if last.date < today {
            points.push(CumulativePoint {
                date: today,
                total: last.total,
                synthetic: true,
            });
        }
    }
    points
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StrategyStats {
    pub count: usize,
    pub wins: usize,
    pub net_pl: f64,
}

impl StrategyStats {
    pub fn win_rate(&self) -> u32 {
        win_rate_pct(self.wins, self.count)
    }

    pub fn avg_pl(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.net_pl / self.count as f64
        }
    }

    /// Losing and breakeven trades together.
    pub fn non_wins(&self) -> usize {
        self.count - self.wins
    }
}

/// Stats keyed by exact strategy label.
pub fn group_by_strategy(trades: &[Trade]) -> BTreeMap<String, StrategyStats> {
    let mut groups: BTreeMap<String, StrategyStats> = BTreeMap::new();
    for trade in trades {
        let stats = groups.entry(trade.strategy.clone()).or_default();
        stats.count += 1;
        if trade.is_win() {
            stats.wins += 1;
        }
        stats.net_pl += trade.pl;
    }
    groups
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedStrategy {
    pub name: String,
    pub stats: StrategyStats,
}

/// Strategies by net P/L, best first. Equal totals keep label order.
pub fn strategy_rankings(trades: &[Trade]) -> Vec<RankedStrategy> {
    let mut ranked: Vec<RankedStrategy> = group_by_strategy(trades)
        .into_iter()
        .map(|(name, stats)| RankedStrategy { name, stats })
        .collect();
    ranked.sort_by(|a, b| b.stats.net_pl.total_cmp(&a.stats.net_pl));
    ranked
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrategyExtremes {
    pub best: Option<RankedStrategy>,
    pub worst: Option<RankedStrategy>,
}

pub fn best_and_worst_strategy(trades: &[Trade]) -> StrategyExtremes {
    let ranked = strategy_rankings(trades);
    StrategyExtremes {
        best: ranked.first().cloned(),
        worst: ranked.last().cloned(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub net_pl: f64,
    pub trade_count: usize,
    pub wins: usize,
    pub losses: usize,
}

impl DaySummary {
    pub fn win_rate(&self) -> u32 {
        win_rate_pct(self.wins, self.trade_count)
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

pub fn day_summary(trades: &[Trade], day: NaiveDate) -> DaySummary {
    let mut summary = DaySummary {
        date: day,
        net_pl: 0.0,
        trade_count: 0,
        wins: 0,
        losses: 0,
    };
    for trade in trades.iter().filter(|t| t.date == day) {
        summary.net_pl += trade.pl;
        summary.trade_count += 1;
        if trade.is_win() {
            summary.wins += 1;
        } else if trade.is_loss() {
            summary.losses += 1;
        }
    }
    summary
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySummary {
    pub week_start: NaiveDate,
    /// Monday through Sunday.
    pub days: Vec<DaySummary>,
    pub total_pl: f64,
    pub total_trades: usize,
    pub total_wins: usize,
    pub total_losses: usize,
}

impl WeeklySummary {
    pub fn week_end(&self) -> NaiveDate {
        self.days.last().map_or(self.week_start, |d| d.date)
    }

    /// Wins over all trades in the week, breakeven trades included.
    pub fn win_rate(&self) -> u32 {
        win_rate_pct(self.total_wins, self.total_trades)
    }
}

pub fn weekly_summary(trades: &[Trade], reference_day: NaiveDate) -> WeeklySummary {
    let week_start = start_of_week(reference_day);
    let days: Vec<DaySummary> = week_start
        .iter_days()
        .take(7)
        .map(|day| day_summary(trades, day))
        .collect();

    WeeklySummary {
        week_start,
        total_pl: days.iter().map(|d| d.net_pl).sum(),
        total_trades: days.iter().map(|d| d.trade_count).sum(),
        total_wins: days.iter().map(|d| d.wins).sum(),
        total_losses: days.iter().map(|d| d.losses).sum(),
        days,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub net_pl: f64,
    pub trade_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalendarCell<'a> {
    /// Grid slot before the 1st of the month.
    Padding,
    Day(&'a CalendarDay),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyCalendar {
    pub year: i32,
    pub month: u32,
    /// Empty cells before the 1st in a Monday-first 7-column grid.
    pub leading_padding: usize,
    pub days: Vec<CalendarDay>,
}

impl MonthlyCalendar {
    pub fn cells(&self) -> impl Iterator<Item = CalendarCell<'_>> {
        std::iter::repeat_n(CalendarCell::Padding, self.leading_padding)
            .chain(self.days.iter().map(CalendarCell::Day))
    }

    /// Cells chunked into rows of seven; the last row may be short.
    pub fn weeks(&self) -> Vec<Vec<CalendarCell<'_>>> {
        let cells: Vec<CalendarCell<'_>> = self.cells().collect();
        cells.chunks(7).map(|row| row.to_vec()).collect()
    }
}

pub fn monthly_calendar(
    trades: &[Trade],
    year: i32,
    month: u32,
) -> Result<MonthlyCalendar, JournalError> {
    let invalid = || JournalError::InvalidDate {
        input: format!("{year:04}-{month:02}"),
        reason: "no such calendar month".into(),
    };
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let length = days_in_month(year, month).ok_or_else(invalid)?;

    let by_day = group_by_day(trades);
    let days = first
        .iter_days()
        .take(length as usize)
        .map(|date| {
            let day_trades = by_day.get(&date).map(Vec::as_slice).unwrap_or_default();
            CalendarDay {
                date,
                net_pl: day_trades.iter().map(|t| t.pl).sum(),
                trade_count: day_trades.len(),
            }
        })
        .collect();

    Ok(MonthlyCalendar {
        year,
        month,
        leading_padding: first.weekday().num_days_from_monday() as usize,
        days,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayStats {
    pub weekday: Weekday,
    pub count: usize,
    pub wins: usize,
}

impl WeekdayStats {
    pub fn win_rate(&self) -> u32 {
        win_rate_pct(self.wins, self.count)
    }
}

/// Win counts per weekday, Monday first. Weekdays without trades are omitted.
pub fn weekday_win_rate_distribution(trades: &[Trade]) -> Vec<WeekdayStats> {
    let mut slots = [(0usize, 0usize); 7];
    for trade in trades {
        let slot = &mut slots[trade.date.weekday().num_days_from_monday() as usize];
        slot.0 += 1;
        if trade.is_win() {
            slot.1 += 1;
        }
    }

    let mut weekday = Weekday::Mon;
    let mut out = Vec::new();
    for (count, wins) in slots {
        if count > 0 {
            out.push(WeekdayStats {
                weekday,
                count,
                wins,
            });
        }
        weekday = weekday.succ();
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PeriodStats {
    pub total_trades: usize,
    pub win_count: usize,
    pub loss_count: usize,
    pub win_rate: u32,
    /// Mean P/L of winning trades.
    pub avg_win: f64,
    /// Mean absolute P/L of losing trades.
    pub avg_loss: f64,
    pub net_pl: f64,
}

impl PeriodStats {
    pub fn from_trades(trades: &[Trade]) -> Self {
        let mut stats = PeriodStats {
            total_trades: trades.len(),
            ..Default::default()
        };
        let mut sum_wins = 0.0;
        let mut sum_losses = 0.0;
        for trade in trades {
            stats.net_pl += trade.pl;
            if trade.is_win() {
                stats.win_count += 1;
                sum_wins += trade.pl;
            } else if trade.is_loss() {
                stats.loss_count += 1;
                sum_losses += trade.pl.abs();
            }
        }
        stats.win_rate = win_rate_pct(stats.win_count, stats.total_trades);
        if stats.win_count > 0 {
            stats.avg_win = sum_wins / stats.win_count as f64;
        }
        if stats.loss_count > 0 {
            stats.avg_loss = sum_losses / stats.loss_count as f64;
        }
        stats
    }
}

pub fn period_stats(
    trades: &[Trade],
    window: &Window,
    today: NaiveDate,
) -> Result<PeriodStats, JournalError> {
    let filtered = filter_by_window(trades, window, today)?;
    Ok(PeriodStats::from_trades(&filtered))
}

/// Zero-filled net P/L for each of the `days` days ending at `today`.
pub fn daily_histogram(trades: &[Trade], today: NaiveDate, days: u32) -> Vec<DailyPl> {
    if days == 0 {
        return Vec::new();
    }
    let Some(first) = add_days(today, 1 - i64::from(days)) else {
        return Vec::new();
    };
    let by_day = group_by_day(trades);
    first
        .iter_days()
        .take(days as usize)
        .map(|date| DailyPl {
            date,
            net_pl: by_day
                .get(&date)
                .map_or(0.0, |ts| ts.iter().map(|t| t.pl).sum()),
        })
        .collect()
}

/// Newest first by date, then by id.
pub fn recent_trades(trades: &[Trade], limit: usize) -> Vec<Trade> {
    let mut sorted = trades.to_vec();
    sort_newest_first(&mut sorted);
    sorted.truncate(limit);
    sorted
}

pub fn trades_on(trades: &[Trade], day: NaiveDate) -> Vec<Trade> {
    trades.iter().filter(|t| t.date == day).cloned().collect()
}
