//! CLI pipeline tests.
//!
//! Tests cover:
//! - Config loading and classifier settings from INI files on disk
//! - Trend/quote/momentum pipelines against a mock data port
//! - Screen and health output formatting against a mock screener
//! - Exit code mapping for pipeline failures

mod common;

use common::*;
use std::io::Write;
use trendlens::adapters::console_report::ConsoleReportAdapter;
use trendlens::adapters::csv_adapter::CsvAdapter;
use trendlens::adapters::json_report::JsonReportAdapter;
use trendlens::cli;
use trendlens::domain::classifier::{ClassifierConfig, ClassifierMode, RangeSource};
use trendlens::domain::config_validation::{build_classifier_config, configured_window};
use trendlens::domain::error::TrendError;
use trendlens::domain::screen::{HealthStatus, ScreenRequest, ScreenResponse, ScreenRow};
use trendlens::ports::data_port::{BarInterval, lookback_for_window};
use trendlens::ports::screen_port::ScreenPort;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const VALID_INI: &str = r#"
[data]
source = yahoo

[classifier]
mode = simple
window = 7
gap_threshold_pct = 2.5

[screener]
base_url = http://localhost:7070
timeout_secs = 5

[server]
listen = 127.0.0.1:8000
default_days = 60
"#;

fn same_code(err: &TrendError, expected: u8) -> bool {
    use std::process::ExitCode;
    format!("{:?}", ExitCode::from(err)) == format!("{:?}", ExitCode::from(expected))
}

mod config_loading {
    use super::*;

    #[test]
    fn classifier_settings_from_file() {
        let file = write_temp_ini(VALID_INI);
        let config = cli::load_config(Some(file.path())).unwrap();

        let classifier = build_classifier_config(config.as_ref(), None).unwrap();
        assert_eq!(classifier.range_source, RangeSource::Close);
        assert_eq!(classifier.gap_threshold_pct, 2.5);
        assert_eq!(configured_window(config.as_ref()), 7);
    }

    #[test]
    fn mode_flag_overrides_file() {
        let file = write_temp_ini(VALID_INI);
        let config = cli::load_config(Some(file.path())).unwrap();

        let classifier =
            build_classifier_config(config.as_ref(), Some(ClassifierMode::Refined)).unwrap();
        assert_eq!(classifier.range_source, RangeSource::HighLow);
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = cli::load_config(Some(std::path::Path::new("/nonexistent/trendlens.ini")))
            .err()
            .unwrap();
        assert!(same_code(&err, 2));
    }

    #[test]
    fn no_file_means_defaults() {
        let config = cli::load_config(None).unwrap();
        assert_eq!(
            build_classifier_config(config.as_ref(), None).unwrap(),
            ClassifierConfig::default()
        );
    }

    #[test]
    fn csv_source_from_config() {
        let dir = tempfile::TempDir::new().unwrap();
        let ini = format!("[data]\nsource = csv\ncsv_dir = {}\n", dir.path().display());
        let file = write_temp_ini(&ini);
        let config = cli::load_config(Some(file.path())).unwrap();

        let port = cli::build_data_port(&cli::SourceArgs::default(), config.as_ref()).unwrap();
        assert_eq!(port.name(), "csv");
    }
}

mod pipelines {
    use super::*;

    const CLIMB: [f64; 8] = [100.0, 101.0, 102.0, 104.0, 106.0, 108.0, 110.0, 112.0];

    #[test]
    fn trend_renders_console_block() {
        let port = MockPriceDataPort::new().with_closes("AAPL", &CLIMB);
        let text = cli::run_trend_pipeline(
            &port,
            &ConsoleReportAdapter,
            "AAPL",
            5,
            &ClassifierConfig::default(),
        )
        .unwrap();

        assert!(text.contains("=== AAPL — Past 5 Trading Days ==="));
        assert!(text.contains("Trend:              Uptrend"));
        assert!(text.contains("Gap vs prior %:"));
        assert_eq!(port.last_lookback(), Some(lookback_for_window(5)));
    }

    #[test]
    fn trend_renders_json() {
        let port = MockPriceDataPort::new().with_closes("AAPL", &CLIMB);
        let text = cli::run_trend_pipeline(
            &port,
            &JsonReportAdapter,
            "AAPL",
            5,
            &ClassifierConfig::default(),
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["ticker"], "AAPL");
        assert_eq!(json["trendLabel"], "Uptrend");
    }

    #[test]
    fn trend_rejects_small_window_before_fetching() {
        let port = MockPriceDataPort::new().with_closes("AAPL", &CLIMB);
        let err = cli::run_trend_pipeline(
            &port,
            &ConsoleReportAdapter,
            "AAPL",
            1,
            &ClassifierConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TrendError::InvalidWindow { window: 1 }));
        assert!(same_code(&err, 4));
        assert_eq!(port.last_lookback(), None);
    }

    #[test]
    fn trend_with_short_history_is_insufficient() {
        let port = MockPriceDataPort::new().with_closes("IPO", &[10.0, 11.0, 12.0]);
        let err = cli::run_trend_pipeline(
            &port,
            &ConsoleReportAdapter,
            "IPO",
            5,
            &ClassifierConfig::default(),
        )
        .unwrap_err();
        assert!(same_code(&err, 5));
    }

    #[test]
    fn trend_fetch_error_exit_code() {
        let port = MockPriceDataPort::new().with_error("AAPL", "connection reset");
        let err = cli::run_trend_pipeline(
            &port,
            &ConsoleReportAdapter,
            "AAPL",
            5,
            &ClassifierConfig::default(),
        )
        .unwrap_err();
        assert!(same_code(&err, 3));
    }

    #[test]
    fn quote_shows_day_change() {
        let port = MockPriceDataPort::new().with_closes("MSFT", &[200.0, 210.0]);
        let text =
            cli::run_quote_pipeline(&port, &ConsoleReportAdapter, "MSFT", BarInterval::Daily)
                .unwrap();
        assert!(text.contains("Price (last close): 210.00"));
        assert!(text.contains("Prev Close:         200.00"));
        assert!(text.contains("Day Change %:       5.00%"));
        assert_eq!(port.last_lookback(), Some(cli::QUOTE_LOOKBACK_DAYS));
        assert_eq!(port.last_interval(), Some(BarInterval::Daily));
    }

    #[test]
    fn quote_passes_interval_to_source() {
        let port = MockPriceDataPort::new().with_closes("MSFT", &[200.0, 210.0]);
        cli::run_quote_pipeline(&port, &JsonReportAdapter, "MSFT", BarInterval::FourHour).unwrap();
        assert_eq!(port.last_interval(), Some(BarInterval::FourHour));
    }

    #[test]
    fn csv_source_rejects_intraday_quote() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("MSFT.csv"),
            "Date,Open,High,Low,Close\n2024-01-02,1,2,0.5,1.5\n2024-01-03,1.5,2,1,1.8\n",
        )
        .unwrap();
        let port = CsvAdapter::new(dir.path().to_path_buf());
        let err = cli::run_quote_pipeline(&port, &ConsoleReportAdapter, "MSFT", BarInterval::Hourly)
            .unwrap_err();
        assert!(matches!(err, TrendError::InvalidInput { .. }));
        assert!(same_code(&err, 4));
    }

    #[test]
    fn csv_source_refuses_paths_outside_its_directory() {
        let root = tempfile::TempDir::new().unwrap();
        let data_dir = root.path().join("data");
        std::fs::create_dir(&data_dir).unwrap();
        std::fs::write(
            root.path().join("SECRET.csv"),
            "Date,Open,High,Low,Close\n2024-01-02,1,2,0.5,1.5\n",
        )
        .unwrap();
        let port = CsvAdapter::new(data_dir);
        let err = cli::run_quote_pipeline(&port, &ConsoleReportAdapter, "../SECRET", BarInterval::Daily)
            .unwrap_err();
        assert!(matches!(err, TrendError::InvalidInput { .. }));
    }

    #[test]
    fn momentum_needs_sixty_bars() {
        let port = MockPriceDataPort::new().with_closes("SPY", &generate_closes(40, 400.0, 0.1));
        let err =
            cli::run_momentum_pipeline(&port, &ConsoleReportAdapter, "SPY", 180).unwrap_err();
        assert!(matches!(
            err,
            TrendError::InsufficientData {
                bars: 40,
                required: 60
            }
        ));
    }

    #[test]
    fn momentum_reports_bias() {
        let port = MockPriceDataPort::new().with_closes("SPY", &generate_closes(120, 400.0, -0.8));
        let text =
            cli::run_momentum_pipeline(&port, &ConsoleReportAdapter, "SPY", 180).unwrap();
        assert!(text.contains("Bias:               BEARISH"));
    }

    #[test]
    fn trend_from_csv_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut csv = String::from("Date,Open,High,Low,Close,Volume\n");
        for (i, c) in CLIMB.iter().enumerate() {
            csv.push_str(&format!("2024-01-{:02},{c},{},{},{c},1000\n", i + 1, c + 1.0, c - 1.0));
        }
        std::fs::write(dir.path().join("AAPL.csv"), csv).unwrap();

        let port = CsvAdapter::new(dir.path().to_path_buf());
        let text = cli::run_trend_pipeline(
            &port,
            &ConsoleReportAdapter,
            "AAPL",
            5,
            &ClassifierConfig::default(),
        )
        .unwrap();
        assert!(text.contains("End Close:          112.00"));
    }
}

mod screener {
    use super::*;

    struct MockScreener {
        response: ScreenResponse,
    }

    impl ScreenPort for MockScreener {
        fn screen(&self, request: &ScreenRequest) -> Result<ScreenResponse, TrendError> {
            assert_eq!(request.csv_path, "opts.csv");
            Ok(self.response.clone())
        }

        fn health(&self) -> Result<HealthStatus, TrendError> {
            Ok(HealthStatus {
                status_code: 200,
                body: "{\"status\":\"ok\"}\n".to_string(),
            })
        }
    }

    fn rows(n: usize) -> Vec<ScreenRow> {
        (0..n)
            .map(|i| ScreenRow {
                symbol: Some(format!("SYM{i}")),
                dte: Some(30),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn screen_prints_count_and_first_ten() {
        let screener = MockScreener {
            response: ScreenResponse {
                count: Some(42),
                results: rows(12),
            },
        };
        let text = cli::run_screen_pipeline(&screener, &ScreenRequest::new("opts.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Count: 42");
        assert_eq!(lines[1], "01. symbol=SYM0 dte=30");
        assert_eq!(lines[10], "10. symbol=SYM9 dte=30");
        assert_eq!(lines.len(), 11);
    }

    #[test]
    fn screen_requires_csv_path() {
        let screener = MockScreener {
            response: ScreenResponse::default(),
        };
        let err = cli::run_screen_pipeline(&screener, &ScreenRequest::new("  ")).unwrap_err();
        assert!(same_code(&err, 4));
    }

    #[test]
    fn health_output_shows_status_and_body() {
        let screener = MockScreener {
            response: ScreenResponse::default(),
        };
        let text = cli::format_health(&screener.health().unwrap());
        assert_eq!(text, "Status Code: 200\nResponse: {\"status\":\"ok\"}\n");
    }
}
