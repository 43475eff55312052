//! End-to-end journal behaviour: aggregation scenarios, filter caching and
//! persistence across reopen.

mod common;

use approx::assert_relative_eq;
use chrono::Weekday;
use common::*;
use tradejournal::adapters::file_blob_adapter::FileBlobStore;
use tradejournal::adapters::memory_blob_adapter::MemoryBlobStore;
use tradejournal::domain::aggregation::{self, DailyPl};
use tradejournal::domain::error::JournalError;
use tradejournal::domain::journal::Journal;
use tradejournal::domain::store::DEFAULT_STORAGE_KEY;
use tradejournal::domain::trade::AssetClass;
use tradejournal::domain::window::{Window, filter_by_window};
use tradejournal::ports::blob_port::BlobStore;

mod scenarios {
    use super::*;

    #[test]
    fn daily_and_cumulative_series() {
        let trades = vec![
            trade(1, "2024-01-01", 100.0),
            trade(2, "2024-01-01", -40.0),
            trade(3, "2024-01-02", 20.0),
        ];
        let daily = aggregation::daily_pl_series(&trades);
        assert_eq!(
            daily,
            vec![
                DailyPl {
                    date: day("2024-01-01"),
                    net_pl: 60.0
                },
                DailyPl {
                    date: day("2024-01-02"),
                    net_pl: 20.0
                },
            ]
        );

        let cumulative = aggregation::cumulative_series(&daily, day("2024-01-02"));
        let totals: Vec<_> = cumulative.iter().map(|p| (p.date, p.total)).collect();
        assert_eq!(
            totals,
            vec![(day("2024-01-01"), 60.0), (day("2024-01-02"), 80.0)]
        );
        assert!(cumulative.iter().all(|p| !p.synthetic));
    }

    #[test]
    fn cumulative_series_carries_forward_to_today() {
        let trades = vec![trade(1, "2024-01-01", 100.0), trade(2, "2024-01-02", 20.0)];
        let daily = aggregation::daily_pl_series(&trades);
        let cumulative = aggregation::cumulative_series(&daily, day("2024-01-05"));
        assert_eq!(cumulative.len(), 3);
        let last = cumulative[2];
        assert_eq!(last.date, day("2024-01-05"));
        assert_eq!(last.total, 120.0);
        assert!(last.synthetic);
    }

    #[test]
    fn weekday_distribution_only_reports_traded_days() {
        let trades = vec![
            trade(1, "2024-01-01", 10.0),
            trade(2, "2024-01-08", 10.0),
            trade(3, "2024-01-15", 10.0),
            trade(4, "2024-01-22", -10.0),
        ];
        let dist = aggregation::weekday_win_rate_distribution(&trades);
        assert_eq!(dist.len(), 1);
        assert_eq!(dist[0].weekday, Weekday::Mon);
        assert_eq!(dist[0].count, 4);
        assert_eq!(dist[0].wins, 3);
        assert_eq!(dist[0].win_rate(), 75);
    }

    #[test]
    fn strategy_grouping_and_extremes() {
        let trades = vec![
            strategy_trade(1, "2024-01-01", "A", 50.0),
            strategy_trade(2, "2024-01-01", "A", -10.0),
            strategy_trade(3, "2024-01-02", "B", 30.0),
        ];
        let groups = aggregation::group_by_strategy(&trades);
        let a = &groups["A"];
        assert_eq!((a.count, a.wins), (2, 1));
        assert_relative_eq!(a.net_pl, 40.0);
        let b = &groups["B"];
        assert_eq!((b.count, b.wins), (1, 1));
        assert_relative_eq!(b.net_pl, 30.0);

        let extremes = aggregation::best_and_worst_strategy(&trades);
        assert_eq!(extremes.best.map(|s| s.name), Some("A".to_string()));
        assert_eq!(extremes.worst.map(|s| s.name), Some("B".to_string()));
    }

    #[test]
    fn single_strategy_is_both_best_and_worst() {
        let trades = vec![strategy_trade(1, "2024-01-01", "Only", 5.0)];
        let extremes = aggregation::best_and_worst_strategy(&trades);
        assert_eq!(extremes.best, extremes.worst);
        assert!(extremes.best.is_some());
    }

    #[test]
    fn custom_single_day_window() {
        let trades = vec![
            trade(1, "2024-01-01", 1.0),
            trade(2, "2024-01-02", 2.0),
            trade(3, "2024-01-02", 3.0),
            trade(4, "2024-01-03", 4.0),
        ];
        let window = Window::custom(day("2024-01-02"), day("2024-01-02")).unwrap();
        let filtered = filter_by_window(&trades, &window, day("2024-02-01")).unwrap();
        assert_eq!(filtered.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn reversed_custom_range_fails() {
        let window = Window::CustomRange {
            start: day("2024-01-05"),
            end: day("2024-01-01"),
        };
        let result = filter_by_window(&[], &window, day("2024-02-01"));
        assert!(matches!(result, Err(JournalError::InvalidRange { .. })));
    }
}

mod journal_queries {
    use super::*;

    fn sample() -> Journal {
        journal_with(
            "2024-01-10",
            vec![
                draft("2023-12-01", "OLD", 500.0).with_strategy("Swing"),
                draft("2024-01-04", "A", 100.0).with_strategy("Breakout"),
                draft("2024-01-08", "B", -40.0).with_strategy("Breakout"),
                draft("2024-01-09", "C", 0.0).with_strategy("Scalp"),
                draft("2024-01-10", "D", 60.0).with_strategy("Scalp"),
            ],
        )
    }

    #[test]
    fn period_stats_for_last_seven_days() {
        let mut journal = sample();
        let stats = journal.period_stats(Window::LastNDays(7)).unwrap();
        assert_eq!(stats.total_trades, 4);
        assert_eq!(stats.win_count, 2);
        assert_eq!(stats.loss_count, 1);
        assert_eq!(stats.win_rate, 50);
        assert_relative_eq!(stats.net_pl, 120.0);
        assert_relative_eq!(stats.avg_win, 80.0);
        assert_relative_eq!(stats.avg_loss, 40.0);
    }

    #[test]
    fn all_time_includes_older_trades() {
        let mut journal = sample();
        let stats = journal.period_stats(Window::AllTime).unwrap();
        assert_eq!(stats.total_trades, 5);
        assert_relative_eq!(stats.net_pl, 620.0);
    }

    #[test]
    fn strategy_counts_sum_to_total() {
        let journal = sample();
        let ranked = journal.strategies();
        let total: usize = ranked.iter().map(|r| r.stats.count).sum();
        assert_eq!(total, journal.trades().len());
        assert_eq!(ranked[0].name, "Swing");
    }

    #[test]
    fn weekly_summary_is_monday_start() {
        let journal = sample();
        let week = journal.weekly_summary(None);
        assert_eq!(week.week_start, day("2024-01-08"));
        assert_eq!(week.days.len(), 7);
        assert_eq!(week.total_trades, 3);
        assert_relative_eq!(week.total_pl, 20.0);
    }

    #[test]
    fn monthly_calendar_pads_to_monday() {
        let journal = sample();
        // 2024-02-01 is a Thursday
        let calendar = journal.monthly_calendar(2024, 2).unwrap();
        assert_eq!(calendar.leading_padding, 3);
        assert_eq!(calendar.days.len(), 29);
        assert!(journal.monthly_calendar(2024, 13).is_err());
    }

    #[test]
    fn recent_trades_newest_first() {
        let journal = sample();
        let recent = journal.recent(2);
        let symbols: Vec<_> = recent.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["D", "C"]);
    }

    #[test]
    fn histogram_is_zero_filled() {
        let journal = sample();
        let hist = journal.histogram(7);
        assert_eq!(hist.len(), 7);
        assert_eq!(hist[0].date, day("2024-01-04"));
        assert_relative_eq!(hist[0].net_pl, 100.0);
        assert_relative_eq!(hist[1].net_pl, 0.0);
    }
}

mod filter_cache {
    use super::*;

    #[test]
    fn repeated_queries_filter_once() {
        let mut journal = journal_with("2024-01-10", vec![draft("2024-01-09", "A", 5.0)]);
        journal.period_stats(Window::LastNMonths(1)).unwrap();
        journal.daily_series(Window::LastNMonths(1)).unwrap();
        journal.cumulative_series(Window::LastNMonths(1)).unwrap();
        assert_eq!(journal.filter_runs(), 1);
    }

    #[test]
    fn adding_a_trade_invalidates() {
        let mut journal = journal_with("2024-01-10", vec![draft("2024-01-09", "A", 5.0)]);
        assert_eq!(journal.period_stats(Window::AllTime).unwrap().total_trades, 1);
        journal.add_trade(draft("2024-01-10", "B", 7.0)).unwrap();
        assert_eq!(journal.period_stats(Window::AllTime).unwrap().total_trades, 2);
        assert_eq!(journal.filter_runs(), 2);
    }
}

mod persistence {
    use super::*;

    fn open(blob: Box<dyn BlobStore>) -> Journal {
        Journal::open(
            blob,
            DEFAULT_STORAGE_KEY,
            Box::new(FixedClock::new("2024-01-10")),
            AssetClass::Stock,
        )
        .0
    }

    #[test]
    fn file_backend_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("data");
        {
            let mut journal = open(Box::new(FileBlobStore::new(path.clone())));
            journal
                .add_trade(draft("2024-01-09", "aapl", 12.5).with_asset(AssetClass::Option))
                .unwrap();
        }
        let journal = open(Box::new(FileBlobStore::new(path)));
        assert_eq!(journal.trades().len(), 1);
        assert_eq!(journal.trades()[0].symbol, "AAPL");
        assert_eq!(journal.trades()[0].asset_class, AssetClass::Option);
    }

    #[test]
    fn stored_payload_uses_short_field_names() {
        let (mut journal, blob) = memory_journal("2024-01-10");
        journal
            .add_trade(draft("2024-01-09", "X", -3.0).with_strategy("Fade"))
            .unwrap();
        let payload = blob.get(DEFAULT_STORAGE_KEY).unwrap().unwrap();
        let records: serde_json::Value = serde_json::from_str(&payload).unwrap();
        let record = &records[0];
        assert_eq!(record["sym"], "X");
        assert_eq!(record["strat"], "Fade");
        assert_eq!(record["asset"], "Stock");
        assert_eq!(record["date"], "2024-01-09");
    }

    #[test]
    fn legacy_records_load_with_defaults() {
        let payload = r#"[{"id":1700000000000,"date":"2024-01-05","sym":"TCS","pl":-250,
            "asset":"Stock","strat":"","conf":"Med","reason":"","resultType":"Loss"}]"#;
        let blob = MemoryBlobStore::with_entry(DEFAULT_STORAGE_KEY, payload);
        let journal = open(Box::new(blob));
        assert_eq!(journal.trades().len(), 1);
        assert_eq!(journal.trades()[0].pl, -250.0);
        assert_eq!(journal.trades()[0].confidence, "Med");
    }

    #[test]
    fn corrupt_payload_opens_empty() {
        let blob = MemoryBlobStore::with_entry(DEFAULT_STORAGE_KEY, "not json");
        let (journal, report) = Journal::open(
            Box::new(blob),
            DEFAULT_STORAGE_KEY,
            Box::new(FixedClock::new("2024-01-10")),
            AssetClass::Stock,
        );
        assert!(journal.trades().is_empty());
        assert!(report.payload_discarded);
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn sqlite_backend_survives_reopen() {
        use tradejournal::adapters::file_config_adapter::FileConfigAdapter;
        use tradejournal::adapters::sqlite_adapter::SqliteBlobStore;

        let dir = tempfile::TempDir::new().unwrap();
        let db = dir.path().join("journal.db");
        let config = FileConfigAdapter::from_string(&format!(
            "[storage]\nbackend = sqlite\npath = {}\n",
            db.display()
        ))
        .unwrap();
        {
            let mut journal = open(Box::new(SqliteBlobStore::from_config(&config).unwrap()));
            journal.add_trade(draft("2024-01-09", "A", 1.0)).unwrap();
            journal.add_trade(draft("2024-01-10", "B", 2.0)).unwrap();
        }
        let journal = open(Box::new(SqliteBlobStore::from_config(&config).unwrap()));
        assert_eq!(journal.trades().len(), 2);
    }
}
