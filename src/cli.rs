//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::console_report::ConsoleReportAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report::JsonReportAdapter;
use crate::adapters::screener_client::{self, ScreenerClient};
use crate::adapters::yahoo_adapter::YahooAdapter;
use crate::domain::classifier::{ClassifierConfig, ClassifierMode};
use crate::domain::config_validation::{
    build_classifier_config, configured_window, validate_data_config, validate_screener_config,
};
use crate::domain::error::TrendError;
use crate::domain::momentum::MomentumSummary;
use crate::domain::quote::QuoteSnapshot;
use crate::domain::report::TrendReport;
use crate::domain::screen::{DEFAULT_SCREEN_LIMIT, HealthStatus, ScreenRequest, ScreenResponse};
pub use crate::domain::ticker::normalize_ticker;
use crate::ports::config_port::{ConfigPort, EmptyConfig};
use crate::ports::data_port::{BarInterval, DataSourceKind, PriceDataPort, lookback_for_window};
use crate::ports::report_port::ReportPort;
use crate::ports::screen_port::ScreenPort;

/// Rows printed by `screen`.
pub const SCREEN_PREVIEW_ROWS: usize = 10;
/// Calendar days fetched for `quote`; enough for two sessions over a long weekend.
pub const QUOTE_LOOKBACK_DAYS: u32 = 7;
pub const MOMENTUM_LOOKBACK_DAYS: u32 = 180;

#[derive(Parser, Debug)]
#[command(name = "trendlens", about = "Price trend classification for stock tickers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where bars come from; flags override the `[data]` config section.
#[derive(Args, Debug, Default, Clone)]
pub struct SourceArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// yahoo or csv
    #[arg(long)]
    pub source: Option<String>,
    #[arg(long)]
    pub csv_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify the recent price trend of a ticker
    Trend {
        ticker: Option<String>,
        #[arg(short, long)]
        window: Option<usize>,
        /// refined or simple
        #[arg(long)]
        mode: Option<String>,
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Show last close, previous close and day change
    Quote {
        ticker: Option<String>,
        /// Bar interval: 1d, 1h or 4h (4h is built from 1h bars)
        #[arg(short, long, default_value_t = BarInterval::Daily)]
        interval: BarInterval,
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Moving-average, RSI and volatility summary
    Momentum {
        ticker: String,
        #[arg(long, default_value_t = MOMENTUM_LOOKBACK_DAYS)]
        days: u32,
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Run the remote options screener over a CSV of option quotes
    Screen {
        #[arg(long)]
        csv: String,
        #[arg(long)]
        base_url: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        save: bool,
        #[arg(long, default_value_t = DEFAULT_SCREEN_LIMIT)]
        limit: u32,
        #[arg(long)]
        min_volume: Option<u64>,
        #[arg(long)]
        min_oi: Option<u64>,
        #[arg(long)]
        max_spread: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        dte_min: Option<i64>,
        #[arg(long, allow_hyphen_values = true)]
        dte_max: Option<i64>,
        #[arg(long, allow_hyphen_values = true)]
        delta_min: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        delta_max: Option<f64>,
    },
    /// Check that the screener service is up
    Health {
        #[arg(long)]
        base_url: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Start the HTTP API
    Serve {
        #[arg(long)]
        listen: Option<String>,
        #[command(flatten)]
        source: SourceArgs,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Trend {
            ticker,
            window,
            mode,
            json,
            source,
        } => run_trend(ticker, window, mode.as_deref(), json, &source),
        Command::Quote {
            ticker,
            interval,
            json,
            source,
        } => run_quote(ticker, interval, json, &source),
        Command::Momentum {
            ticker,
            days,
            json,
            source,
        } => run_momentum(&ticker, days, json, &source),
        Command::Screen {
            csv,
            base_url,
            config,
            save,
            limit,
            min_volume,
            min_oi,
            max_spread,
            dte_min,
            dte_max,
            delta_min,
            delta_max,
        } => {
            let request = ScreenRequest {
                csv_path: csv,
                save,
                limit,
                min_volume,
                min_oi,
                max_spread,
                dte_min,
                dte_max,
                delta_min,
                delta_max,
            };
            run_screen(&request, base_url.as_deref(), config.as_deref())
        }
        Command::Health { base_url, config } => run_health(base_url.as_deref(), config.as_deref()),
        Command::Serve { listen, source } => run_serve(listen.as_deref(), &source),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Install the stderr tracing subscriber. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

pub fn load_config(path: Option<&Path>) -> Result<Box<dyn ConfigPort + Send + Sync>, TrendError> {
    match path {
        Some(p) => {
            eprintln!("Loading config from {}", p.display());
            Ok(Box::new(FileConfigAdapter::from_file(p)?))
        }
        None => Ok(Box::new(EmptyConfig)),
    }
}

/// Pick the data port from flags, then `[data]`, defaulting to Yahoo.
pub fn build_data_port(
    source: &SourceArgs,
    config: &dyn ConfigPort,
) -> Result<Box<dyn PriceDataPort + Send + Sync>, TrendError> {
    validate_data_config(config).or_else(|e| match e {
        // a csv_dir flag satisfies a missing config key
        TrendError::ConfigMissing { .. } if source.csv_dir.is_some() => Ok(()),
        other => Err(other),
    })?;

    let kind = match source
        .source
        .clone()
        .or_else(|| config.get_non_empty("data", "source"))
    {
        Some(s) => s.parse::<DataSourceKind>()?,
        None if source.csv_dir.is_some() => DataSourceKind::Csv,
        None => DataSourceKind::Yahoo,
    };

    match kind {
        DataSourceKind::Yahoo => Ok(Box::new(YahooAdapter::new()?)),
        DataSourceKind::Csv => {
            let dir = source
                .csv_dir
                .clone()
                .or_else(|| config.get_non_empty("data", "csv_dir").map(PathBuf::from))
                .ok_or_else(|| TrendError::ConfigMissing {
                    section: "data".to_string(),
                    key: "csv_dir".to_string(),
                })?;
            Ok(Box::new(CsvAdapter::new(dir)))
        }
    }
}

pub fn report_port(json: bool) -> Box<dyn ReportPort> {
    if json {
        Box::new(JsonReportAdapter)
    } else {
        Box::new(ConsoleReportAdapter)
    }
}

/// Print `prompt` to stderr and read one trimmed line.
pub fn prompt_line(input: &mut dyn BufRead, prompt: &str) -> Result<String, TrendError> {
    eprint!("{prompt}");
    io::stderr().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Ask for ticker and window interactively. A blank window keeps `default_window`.
pub fn prompt_trend_inputs(
    input: &mut dyn BufRead,
    default_window: usize,
) -> Result<(String, usize), TrendError> {
    let ticker = normalize_ticker(&prompt_line(input, "Enter ticker (e.g., AAPL): ")?)?;
    let raw = prompt_line(input, &format!("Trading days [{default_window}]: "))?;
    let window = if raw.is_empty() {
        default_window
    } else {
        raw.parse::<usize>().map_err(|_| TrendError::InvalidInput {
            reason: format!("'{raw}' is not a whole number of days"),
        })?
    };
    Ok((ticker, window))
}

pub fn run_trend_pipeline(
    data_port: &dyn PriceDataPort,
    report_port: &dyn ReportPort,
    ticker: &str,
    window: usize,
    config: &ClassifierConfig,
) -> Result<String, TrendError> {
    if window < 2 {
        return Err(TrendError::InvalidWindow { window });
    }
    let lookback = lookback_for_window(window);
    eprintln!("Fetching {ticker} ({lookback} calendar days) from {}...", data_port.name());
    let series = data_port.fetch_series(ticker, lookback, BarInterval::Daily)?;
    if series.is_empty() {
        return Err(TrendError::NoData {
            ticker: ticker.to_string(),
        });
    }
    let report = TrendReport::build(ticker, &series, window, config)?;
    report_port.render_trend(&report)
}

pub fn run_quote_pipeline(
    data_port: &dyn PriceDataPort,
    report_port: &dyn ReportPort,
    ticker: &str,
    interval: BarInterval,
) -> Result<String, TrendError> {
    let series = data_port.fetch_series(ticker, QUOTE_LOOKBACK_DAYS, interval)?;
    let quote = QuoteSnapshot::from_series(ticker, &series)?;
    report_port.render_quote(&quote)
}

pub fn run_momentum_pipeline(
    data_port: &dyn PriceDataPort,
    report_port: &dyn ReportPort,
    ticker: &str,
    days: u32,
) -> Result<String, TrendError> {
    let series = data_port.fetch_series(ticker, days, BarInterval::Daily)?;
    let summary = MomentumSummary::analyze(ticker, &series)?;
    report_port.render_momentum(&summary)
}

/// `Count: n` followed by up to [`SCREEN_PREVIEW_ROWS`] numbered rows.
pub fn format_screen_response(resp: &ScreenResponse) -> String {
    let mut out = format!("Count: {}\n", resp.effective_count());
    for (i, row) in resp.results.iter().take(SCREEN_PREVIEW_ROWS).enumerate() {
        let fields: Vec<String> = row
            .compact_fields()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        out.push_str(&format!("{:02}. {}\n", i + 1, fields.join(" ")));
    }
    out
}

pub fn format_health(status: &HealthStatus) -> String {
    format!(
        "Status Code: {}\nResponse: {}\n",
        status.status_code,
        status.body.trim()
    )
}

pub fn run_screen_pipeline(
    screen_port: &dyn ScreenPort,
    request: &ScreenRequest,
) -> Result<String, TrendError> {
    if request.csv_path.trim().is_empty() {
        return Err(TrendError::InvalidInput {
            reason: "csv path is required".to_string(),
        });
    }
    let resp = screen_port.screen(request)?;
    Ok(format_screen_response(&resp))
}

fn run_trend(
    ticker: Option<String>,
    window: Option<usize>,
    mode: Option<&str>,
    json: bool,
    source: &SourceArgs,
) -> Result<(), TrendError> {
    init_tracing("trendlens=warn");
    let config = load_config(source.config.as_deref())?;
    let mode = mode.map(str::parse::<ClassifierMode>).transpose()?;
    let classifier = build_classifier_config(config.as_ref(), mode)?;
    let default_window = configured_window(config.as_ref());

    let (ticker, window) = match ticker {
        Some(t) => (normalize_ticker(&t)?, window.unwrap_or(default_window)),
        None => {
            let (t, w) = prompt_trend_inputs(&mut io::stdin().lock(), default_window)?;
            (t, window.unwrap_or(w))
        }
    };

    let data_port = build_data_port(source, config.as_ref())?;
    let text = run_trend_pipeline(
        data_port.as_ref(),
        report_port(json).as_ref(),
        &ticker,
        window,
        &classifier,
    )?;
    print!("{text}");
    Ok(())
}

fn run_quote(
    ticker: Option<String>,
    interval: BarInterval,
    json: bool,
    source: &SourceArgs,
) -> Result<(), TrendError> {
    init_tracing("trendlens=warn");
    let config = load_config(source.config.as_deref())?;
    let ticker = match ticker {
        Some(t) => normalize_ticker(&t)?,
        None => normalize_ticker(&prompt_line(
            &mut io::stdin().lock(),
            "Enter ticker (e.g., AAPL): ",
        )?)?,
    };
    let data_port = build_data_port(source, config.as_ref())?;
    let text = run_quote_pipeline(
        data_port.as_ref(),
        report_port(json).as_ref(),
        &ticker,
        interval,
    )?;
    print!("{text}");
    Ok(())
}

fn run_momentum(ticker: &str, days: u32, json: bool, source: &SourceArgs) -> Result<(), TrendError> {
    init_tracing("trendlens=warn");
    let config = load_config(source.config.as_deref())?;
    let ticker = normalize_ticker(ticker)?;
    let data_port = build_data_port(source, config.as_ref())?;
    eprintln!("Fetching {ticker} ({days} calendar days) from {}...", data_port.name());
    let text = run_momentum_pipeline(data_port.as_ref(), report_port(json).as_ref(), &ticker, days)?;
    print!("{text}");
    Ok(())
}

fn screener_from(
    base_url: Option<&str>,
    config_path: Option<&Path>,
) -> Result<ScreenerClient, TrendError> {
    let config = load_config(config_path)?;
    validate_screener_config(config.as_ref())?;
    let env = std::env::var(screener_client::BASE_URL_ENV).ok();
    let base = screener_client::resolve_base_url(
        base_url,
        env.as_deref(),
        config.get_non_empty("screener", "base_url").as_deref(),
    );
    let timeout = config.get_int(
        "screener",
        "timeout_secs",
        screener_client::DEFAULT_SCREEN_TIMEOUT.as_secs() as i64,
    );
    let timeout = Duration::from_secs(u64::try_from(timeout).unwrap_or(20));
    ScreenerClient::new(&base, timeout)
}

fn run_screen(
    request: &ScreenRequest,
    base_url: Option<&str>,
    config_path: Option<&Path>,
) -> Result<(), TrendError> {
    init_tracing("trendlens=warn");
    let client = screener_from(base_url, config_path)?;
    eprintln!("Screening {} via {}...", request.csv_path, client.base_url());
    print!("{}", run_screen_pipeline(&client, request)?);
    Ok(())
}

fn run_health(base_url: Option<&str>, config_path: Option<&Path>) -> Result<(), TrendError> {
    init_tracing("trendlens=warn");
    let client = screener_from(base_url, config_path)?;
    match client.health() {
        Ok(status) => {
            print!("{}", format_health(&status));
            Ok(())
        }
        Err(TrendError::Screener { status: None, reason }) => Err(TrendError::Screener {
            status: None,
            reason: format!("connection error: {reason}"),
        }),
        Err(e) => Err(e),
    }
}

#[cfg(feature = "web")]
fn run_serve(listen: Option<&str>, source: &SourceArgs) -> Result<(), TrendError> {
    use crate::adapters::web::{AppState, serve};
    use crate::domain::config_validation::{
        DEFAULT_LISTEN, validate_classifier_config, validate_server_config,
    };
    use std::net::SocketAddr;
    use std::sync::Arc;

    init_tracing("trendlens=info,tower_http=info");
    let config = load_config(source.config.as_deref())?;
    validate_server_config(config.as_ref())?;
    validate_classifier_config(config.as_ref())?;

    let listen = listen
        .map(str::to_string)
        .or_else(|| config.get_non_empty("server", "listen"))
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    let addr: SocketAddr = listen.trim().parse().map_err(|_| TrendError::InvalidInput {
        reason: format!("invalid listen address '{listen}'"),
    })?;

    // blocking HTTP clients must be built outside the runtime
    let data_port: Arc<dyn PriceDataPort + Send + Sync> =
        Arc::from(build_data_port(source, config.as_ref())?);
    let state = AppState {
        data_port,
        config: Arc::from(config),
    };

    eprintln!("Starting API server on http://{addr}");
    tokio::runtime::Runtime::new()?.block_on(serve(state, addr))
}

#[cfg(not(feature = "web"))]
fn run_serve(_listen: Option<&str>, _source: &SourceArgs) -> Result<(), TrendError> {
    Err(TrendError::InvalidInput {
        reason: "web feature is required for serve".to_string(),
    })
}
