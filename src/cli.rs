//! CLI definition and dispatch.

use chrono::{Datelike, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_blob_adapter::FileBlobStore;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::memory_blob_adapter::MemoryBlobStore;
use crate::adapters::system_clock::SystemClock;
use crate::domain::aggregation::{CalendarCell, DailyPl, StrategyStats};
use crate::domain::config_validation::validate_journal_config;
use crate::domain::dates::{day_key, parse_day, weekday_label};
use crate::domain::error::JournalError;
use crate::domain::journal::Journal;
use crate::domain::store::{DEFAULT_STORAGE_KEY, LoadReport};
use crate::domain::trade::{AssetClass, NewTrade, Outcome, Trade};
use crate::domain::window::Window;
use crate::logging::LoggingConfig;
use crate::ports::blob_port::BlobStore;
use crate::ports::clock_port::Clock;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_DATA_DIR: &str = "journal-data";
pub const DEFAULT_CURRENCY: &str = "₹";

#[derive(Parser, Debug)]
#[command(name = "tradejournal", about = "Personal trading journal")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ResultArg {
    Win,
    Loss,
}

impl From<ResultArg> for Outcome {
    fn from(arg: ResultArg) -> Self {
        match arg {
            ResultArg::Win => Outcome::Win,
            ResultArg::Loss => Outcome::Loss,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log a trade
    Add {
        #[arg(long)]
        symbol: String,
        /// Unsigned P/L amount
        #[arg(long, allow_negative_numbers = true)]
        amount: f64,
        #[arg(long, value_enum)]
        result: ResultArg,
        /// Trade day (YYYY-MM-DD), today when omitted
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        asset: Option<String>,
        #[arg(long, default_value = "")]
        strategy: String,
        #[arg(long, default_value = "")]
        confidence: String,
        #[arg(long, default_value = "")]
        reason: String,
    },
    /// Delete a trade by id
    Delete { id: i64 },
    /// Delete every trade
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// Show the most recent trades
    List {
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Show every trade on one day
    Day { date: String },
    /// Period statistics
    Stats {
        /// ALL, 7D, 1M, 3M, 1Y, ...
        #[arg(long, conflicts_with_all = ["start", "end"])]
        window: Option<String>,
        #[arg(long, requires = "end")]
        start: Option<String>,
        #[arg(long, requires = "start")]
        end: Option<String>,
    },
    /// Monday-start weekly breakdown
    Week {
        #[arg(long)]
        date: Option<String>,
    },
    /// Monthly calendar of daily P/L
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Per-strategy performance, best first
    Strategies,
    /// Win rate by weekday
    Weekdays,
    /// Daily or cumulative P/L series
    Series {
        #[arg(long, default_value = "ALL")]
        window: String,
        #[arg(long)]
        cumulative: bool,
    },
    /// Daily P/L for the last N days, zero-filled
    Histogram {
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    /// Import trades from CSV
    Import { file: PathBuf },
    /// Export all trades to CSV
    Export { file: PathBuf },
    /// Validate the configuration
    Check,
}

pub fn run(cli: Cli) -> ExitCode {
    let config = match resolve_config(cli.config.as_ref()) {
        Ok(c) => c,
        Err(code) => return code,
    };
    LoggingConfig::from_config(&config).init();

    if let Err(e) = validate_journal_config(&config) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if matches!(cli.command, Command::Check) {
        eprintln!("Configuration is valid.");
        return ExitCode::SUCCESS;
    }

    let mut journal = match open_journal(&config, Box::new(SystemClock)) {
        Ok((journal, report)) => {
            report_load(&report);
            journal
        }
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let currency = currency_symbol(&config);

    match execute(&mut journal, cli.command, &currency) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = JournalError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Loads `path` when given; otherwise every setting takes its default.
pub fn resolve_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    match path {
        Some(p) => load_config(p),
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// Selects the blob backend named by `[storage] backend` (default `file`).
pub fn build_blob_store(config: &dyn ConfigPort) -> Result<Box<dyn BlobStore>, JournalError> {
    let backend = config
        .get_string("storage", "backend")
        .unwrap_or_else(|| "file".to_string());
    match backend.as_str() {
        "file" => {
            let dir = config
                .get_string("storage", "path")
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
            Ok(Box::new(FileBlobStore::new(PathBuf::from(dir))))
        }
        "memory" => Ok(Box::new(MemoryBlobStore::new())),
        "sqlite" => build_sqlite_store(config),
        other => Err(JournalError::ConfigInvalid {
            section: "storage".to_string(),
            key: "backend".to_string(),
            reason: format!("unknown backend '{other}'"),
        }),
    }
}

#[cfg(feature = "sqlite")]
fn build_sqlite_store(config: &dyn ConfigPort) -> Result<Box<dyn BlobStore>, JournalError> {
    use crate::adapters::sqlite_adapter::SqliteBlobStore;
    Ok(Box::new(SqliteBlobStore::from_config(config)?))
}

#[cfg(not(feature = "sqlite"))]
fn build_sqlite_store(_config: &dyn ConfigPort) -> Result<Box<dyn BlobStore>, JournalError> {
    Err(JournalError::ConfigInvalid {
        section: "storage".to_string(),
        key: "backend".to_string(),
        reason: "sqlite feature is required for backend = sqlite".to_string(),
    })
}

pub fn open_journal(
    config: &dyn ConfigPort,
    clock: Box<dyn Clock>,
) -> Result<(Journal, LoadReport), JournalError> {
    let blob = build_blob_store(config)?;
    let key = config
        .get_string("storage", "key")
        .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
    let default_asset = config
        .get_string("journal", "default_asset")
        .map(|a| AssetClass::from(a.trim()))
        .unwrap_or_default();
    Ok(Journal::open(blob, &key, clock, default_asset))
}

fn currency_symbol(config: &dyn ConfigPort) -> String {
    config
        .get_string("journal", "currency")
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

fn report_load(report: &LoadReport) {
    if report.payload_discarded {
        eprintln!("warning: stored trades were unreadable and have been ignored");
    }
    if report.skipped > 0 {
        eprintln!(
            "warning: skipped {} unreadable trade record(s)",
            report.skipped
        );
    }
}

/// Runs one journal command, printing results to stdout.
pub fn execute(journal: &mut Journal, command: Command, currency: &str) -> Result<(), JournalError> {
    let money = |amount: f64| format_currency(amount, currency);
    match command {
        Command::Add {
            symbol,
            amount,
            result,
            date,
            asset,
            strategy,
            confidence,
            reason,
        } => {
            let date = match date {
                Some(d) => parse_day(&d)?,
                None => journal.today(),
            };
            let pl = Outcome::from(result).signed(amount)?;
            let mut draft = NewTrade::new(date, &symbol, pl).with_strategy(&strategy);
            if let Some(asset) = asset.filter(|a| !a.trim().is_empty()) {
                draft = draft.with_asset(AssetClass::from(asset.trim()));
            }
            draft.confidence = confidence;
            draft.reason = reason;
            let trade = journal.add_trade(draft)?;
            eprintln!("Logged trade {}", trade.id);
            print_trade(&trade, &money);
        }
        Command::Delete { id } => {
            if journal.delete_trade(id)? {
                eprintln!("Deleted trade {id}");
            } else {
                eprintln!("No trade with id {id}");
            }
        }
        Command::Reset { yes } => {
            if !yes {
                return Err(JournalError::InvalidTrade {
                    field: "reset".to_string(),
                    reason: "pass --yes to delete every trade".to_string(),
                });
            }
            let count = journal.trades().len();
            journal.reset_all()?;
            eprintln!("Deleted {count} trade(s)");
        }
        Command::List { limit } => {
            let summary = journal.today_summary();
            println!(
                "Today {}: {} ({} trades)",
                day_key(summary.date),
                money(summary.net_pl),
                summary.trade_count
            );
            for trade in journal.recent(limit) {
                print_trade(&trade, &money);
            }
        }
        Command::Day { date } => {
            let day = parse_day(&date)?;
            let trades = journal.day_detail(day);
            let net: f64 = trades.iter().map(|t| t.pl).sum();
            println!("{}: {} trade(s), net {}", day_key(day), trades.len(), money(net));
            for trade in &trades {
                print_trade(trade, &money);
            }
        }
        Command::Stats { window, start, end } => {
            let window = match (start, end) {
                (Some(start), Some(end)) => Window::custom(parse_day(&start)?, parse_day(&end)?)?,
                _ => window.as_deref().unwrap_or("ALL").parse::<Window>()?,
            };
            let stats = journal.period_stats(window)?;
            println!("Window:     {window}");
            println!("Trades:     {}", stats.total_trades);
            println!(
                "Win rate:   {}% ({} W / {} L)",
                stats.win_rate, stats.win_count, stats.loss_count
            );
            println!("Net P/L:    {}", money(stats.net_pl));
            println!("Avg win:    {}", money(stats.avg_win));
            println!("Avg loss:   {}", money(stats.avg_loss));
            let extremes = journal.window_extremes(window)?;
            if let (Some(best), Some(worst)) = (extremes.best, extremes.worst) {
                println!("Best strat: {} ({})", best.name, money(best.stats.net_pl));
                println!("Worst strat: {} ({})", worst.name, money(worst.stats.net_pl));
            }
        }
        Command::Week { date } => {
            let reference = parse_optional_day(date.as_deref())?;
            let week = journal.weekly_summary(reference);
            println!(
                "Week {} to {}: {} over {} trades, {}% wins",
                day_key(week.week_start),
                day_key(week.week_end()),
                money(week.total_pl),
                week.total_trades,
                week.win_rate()
            );
            for day in &week.days {
                println!(
                    "  {} {}  {:>4} trades  {:>4} W  {:>4} L  {}",
                    weekday_label(day.weekday()),
                    day_key(day.date),
                    day.trade_count,
                    day.wins,
                    day.losses,
                    money(day.net_pl)
                );
            }
        }
        Command::Calendar { year, month } => {
            let today = journal.today();
            let calendar =
                journal.monthly_calendar(year.unwrap_or(today.year()), month.unwrap_or(today.month()))?;
            println!("{:04}-{:02}", calendar.year, calendar.month);
            println!("Mon Tue Wed Thu Fri Sat Sun");
            for week in calendar.weeks() {
                let row: Vec<String> = week
                    .iter()
                    .map(|cell| match cell {
                        CalendarCell::Padding => "   ".to_string(),
                        CalendarCell::Day(day) => {
                            let marker = if day.trade_count == 0 {
                                ' '
                            } else if day.net_pl > 0.0 {
                                '+'
                            } else if day.net_pl < 0.0 {
                                '-'
                            } else {
                                '='
                            };
                            format!("{:>2}{}", day.date.day(), marker)
                        }
                    })
                    .collect();
                println!("{}", row.join(" "));
            }
            for day in calendar.days.iter().filter(|d| d.trade_count > 0) {
                println!(
                    "  {}  {} trade(s)  {}",
                    day_key(day.date),
                    day.trade_count,
                    money(day.net_pl)
                );
            }
        }
        Command::Strategies => {
            for ranked in journal.strategies() {
                print_strategy(&ranked.name, &ranked.stats, &money);
            }
        }
        Command::Weekdays => {
            for stats in journal.weekday_distribution() {
                println!(
                    "{}  {:>4} trades  {:>3}% wins",
                    weekday_label(stats.weekday),
                    stats.count,
                    stats.win_rate()
                );
            }
        }
        Command::Series { window, cumulative } => {
            let window: Window = window.parse()?;
            if cumulative {
                for point in journal.cumulative_series(window)? {
                    let note = if point.synthetic { "  (carried)" } else { "" };
                    println!("{}  {}{}", day_key(point.date), money(point.total), note);
                }
            } else {
                print_daily(&journal.daily_series(window)?, &money);
            }
        }
        Command::Histogram { days } => {
            print_daily(&journal.histogram(days), &money);
        }
        Command::Import { file } => {
            let drafts = CsvAdapter::new(file.clone()).read_trades()?;
            let added = journal.import_trades(drafts)?;
            eprintln!("Imported {} trade(s) from {}", added.len(), file.display());
        }
        Command::Export { file } => {
            CsvAdapter::new(file.clone()).write_trades(journal.trades())?;
            eprintln!(
                "Exported {} trade(s) to {}",
                journal.trades().len(),
                file.display()
            );
        }
        Command::Check => {}
    }
    Ok(())
}

fn print_trade(trade: &Trade, money: &dyn Fn(f64) -> String) {
    println!(
        "{:>14}  {}  {:<8} {:<7} {:>12}  {}",
        trade.id,
        day_key(trade.date),
        trade.symbol,
        trade.asset_class,
        money(trade.pl),
        trade.strategy
    );
}

fn print_strategy(name: &str, stats: &StrategyStats, money: &dyn Fn(f64) -> String) {
    let label = if name.is_empty() { "(none)" } else { name };
    println!(
        "{:<20} {:>4} trades  {:>3}% wins  net {}  avg {}",
        label,
        stats.count,
        stats.win_rate(),
        money(stats.net_pl),
        money(stats.avg_pl())
    );
}

fn print_daily(series: &[DailyPl], money: &dyn Fn(f64) -> String) {
    for point in series {
        println!(
            "{} {}  {}",
            weekday_label(point.date.weekday()),
            day_key(point.date),
            money(point.net_pl)
        );
    }
}

/// Whole-unit amount with Indian digit grouping (`₹1,23,456`).
pub fn format_currency(amount: f64, symbol: &str) -> String {
    if !amount.is_finite() {
        return format!("{symbol}0");
    }
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let grouped = if digits.len() <= 3 {
        digits
    } else {
        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut rest = head;
        while rest.len() > 2 {
            let (left, right) = rest.split_at(rest.len() - 2);
            groups.push(right);
            rest = left;
        }
        groups.push(rest);
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };
    format!("{sign}{symbol}{grouped}")
}

/// Parses a `YYYY-MM-DD` argument, for callers that accept optional dates.
pub fn parse_optional_day(input: Option<&str>) -> Result<Option<NaiveDate>, JournalError> {
    input.map(parse_day).transpose()
}
