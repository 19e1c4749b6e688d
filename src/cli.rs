//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::coingecko_adapter::CoinGeckoAdapter;
use crate::adapters::csv_history_adapter::CsvHistoryAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_alerts_adapter::JsonAlertsAdapter;
use crate::adapters::web::{AppState, build_router};
use crate::domain::alert::AlertKind;
use crate::domain::error::CoinwatchError;
use crate::domain::history::Window;
use crate::domain::money::format_amount;
use crate::domain::watchlist::{Watchlist, parse_tickers};
use crate::ports::config_port::ConfigPort;
use crate::ports::quote_port::QuotePort;
use crate::services::alerts::AlertStore;
use crate::services::scheduler::Scheduler;
use crate::services::timeseries::TimeSeriesStore;

#[derive(Parser, Debug)]
#[command(name = "coinwatch", about = "Crypto price watcher with threshold alerts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the watcher loop and the web dashboard
    Watch {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Fetch current quotes once and print them
    Fetch {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the stored price series for a symbol
    History {
        #[arg(long)]
        symbol: String,
        #[arg(long, default_value = "1d")]
        window: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Manage threshold alerts
    Alert {
        #[command(subcommand)]
        command: AlertCommand,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AlertCommand {
    /// List configured alerts
    List,
    /// Add a price-target alert
    AddPrice {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        value: f64,
    },
    /// Add a percent-move alert
    AddPercent {
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        percent: f64,
    },
    /// Remove an alert by its position within the symbol's list
    Remove {
        #[arg(long)]
        kind: String,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        index: usize,
    },
}

/// Everything the commands need, resolved from config with defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub watchlist: Watchlist,
    pub interval: Duration,
    pub currency: String,
    pub timeout: Duration,
    pub listen: SocketAddr,
    pub data_file: PathBuf,
    pub alerts_file: PathBuf,
}

pub fn run(cli: Cli) -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    match cli.command {
        Command::Watch { config } => run_watch(config.as_ref()),
        Command::Fetch { config } => run_fetch(config.as_ref()),
        Command::History {
            symbol,
            window,
            config,
        } => run_history(&symbol, &window, config.as_ref()),
        Command::Alert { command, config } => run_alert(command, config.as_ref()),
    }
}

pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    let Some(path) = path else {
        return Ok(FileConfigAdapter::empty());
    };
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = CoinwatchError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_settings(config: &dyn ConfigPort) -> Result<Settings, CoinwatchError> {
    let watchlist = match config.get_string("watch", "symbols") {
        Some(symbols) => {
            let tickers = parse_tickers(&symbols).map_err(|e| CoinwatchError::ConfigInvalid {
                section: "watch".into(),
                key: "symbols".into(),
                reason: e.to_string(),
            })?;
            Watchlist::from_tickers(&tickers).map_err(|e| CoinwatchError::ConfigInvalid {
                section: "watch".into(),
                key: "symbols".into(),
                reason: e.to_string(),
            })?
        }
        None => Watchlist::default(),
    };

    let interval = config.get_int("watch", "interval", 60);
    if interval < 1 {
        return Err(CoinwatchError::ConfigInvalid {
            section: "watch".into(),
            key: "interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let timeout = config.get_int("source", "timeout", 10);
    if timeout < 1 {
        return Err(CoinwatchError::ConfigInvalid {
            section: "source".into(),
            key: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let listen_str = config
        .get_string("server", "listen")
        .unwrap_or_else(|| "127.0.0.1:3000".to_string());
    let listen: SocketAddr = listen_str
        .parse()
        .map_err(|_| CoinwatchError::ConfigInvalid {
            section: "server".into(),
            key: "listen".into(),
            reason: format!("{listen_str:?} is not an ip:port address"),
        })?;

    Ok(Settings {
        watchlist,
        interval: Duration::from_secs(interval as u64),
        currency: config
            .get_string("source", "currency")
            .unwrap_or_else(|| "usd".to_string())
            .to_lowercase(),
        timeout: Duration::from_secs(timeout as u64),
        listen,
        data_file: config
            .get_string("storage", "data_file")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("crypto_data.csv")),
        alerts_file: config
            .get_string("storage", "alerts_file")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("crypto_alerts.json")),
    })
}

fn settings_or_exit(config_path: Option<&PathBuf>) -> Result<Settings, ExitCode> {
    let config = load_config(config_path)?;
    build_settings(&config).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn run_watch(config_path: Option<&PathBuf>) -> ExitCode {
    let settings = match settings_or_exit(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    eprintln!(
        "Watching {} every {}s (prices -> {})",
        settings.watchlist.tickers().join(", "),
        settings.interval.as_secs(),
        settings.data_file.display(),
    );

    let prices = Arc::new(TimeSeriesStore::open(
        Box::new(CsvHistoryAdapter::new(settings.data_file.clone())),
        settings.watchlist.tickers(),
    ));
    let alerts = Arc::new(AlertStore::open(Box::new(JsonAlertsAdapter::new(
        settings.alerts_file.clone(),
    ))));
    let watchlist = Arc::new(settings.watchlist.clone());

    let quotes = CoinGeckoAdapter::new(&settings.currency, settings.timeout);
    let scheduler = Scheduler::new(
        quotes,
        prices.clone(),
        alerts.clone(),
        watchlist.clone(),
        settings.currency.clone(),
        settings.interval,
    );

    let router = build_router(AppState {
        prices,
        alerts,
        watchlist,
        currency: settings.currency.clone(),
    });

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            return ExitCode::from(1);
        }
    };

    runtime.block_on(async {
        let listener = match tokio::net::TcpListener::bind(settings.listen).await {
            Ok(l) => l,
            Err(e) => {
                eprintln!("error: failed to bind {}: {e}", settings.listen);
                return ExitCode::from(1);
            }
        };
        eprintln!("Dashboard on http://{}", settings.listen);

        tokio::select! {
            _ = scheduler.run() => ExitCode::SUCCESS,
            result = async { axum::serve(listener, router).await } => match result {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("error: server failed: {e}");
                    ExitCode::from(1)
                }
            },
        }
    })
}

fn run_fetch(config_path: Option<&PathBuf>) -> ExitCode {
    let settings = match settings_or_exit(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let quotes = CoinGeckoAdapter::new(&settings.currency, settings.timeout);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            return ExitCode::from(1);
        }
    };

    runtime.block_on(async {
        let result = quotes.fetch_quotes(settings.watchlist.assets()).await;
        if result.is_empty() {
            eprintln!("error: no quotes received");
            return ExitCode::from(5);
        }
        for asset in settings.watchlist.assets() {
            match result.get(&asset.ticker) {
                Some(price) => println!(
                    "{:<6} {}",
                    asset.ticker,
                    format_amount(&settings.currency, *price)
                ),
                None => println!("{:<6} unavailable", asset.ticker),
            }
        }
        ExitCode::SUCCESS
    })
}

fn run_history(symbol: &str, window: &str, config_path: Option<&PathBuf>) -> ExitCode {
    let settings = match settings_or_exit(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let symbol = symbol.to_uppercase();
    if !settings.watchlist.contains(&symbol) {
        let err = CoinwatchError::UnknownSymbol { symbol };
        eprintln!("error: {err}");
        return ExitCode::from(&err);
    }

    let store = TimeSeriesStore::open(
        Box::new(CsvHistoryAdapter::new(settings.data_file.clone())),
        settings.watchlist.tickers(),
    );

    let window = Window::parse(window);
    let points = store.range(&symbol, window);
    if points.is_empty() {
        eprintln!("no data for {} in the last {}", symbol, window.label());
        return ExitCode::SUCCESS;
    }

    for point in &points {
        println!(
            "{}  {}",
            point.at.to_rfc3339(),
            format_amount(&settings.currency, point.price)
        );
    }
    eprintln!("{} points over the last {}", points.len(), window.label());
    ExitCode::SUCCESS
}

fn run_alert(command: AlertCommand, config_path: Option<&PathBuf>) -> ExitCode {
    let settings = match settings_or_exit(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let store = AlertStore::open(Box::new(JsonAlertsAdapter::new(
        settings.alerts_file.clone(),
    )));

    match command {
        AlertCommand::List => {
            let book = store.snapshot();
            if book.is_empty() {
                eprintln!("No alerts configured.");
                return ExitCode::SUCCESS;
            }
            for (symbol, rules) in &book.price_alerts {
                for (i, rule) in rules.iter().enumerate() {
                    let status = if rule.triggered { "triggered" } else { "armed" };
                    println!(
                        "price   {}[{}]  {}  {}",
                        symbol,
                        i,
                        format_amount(&settings.currency, rule.value),
                        status
                    );
                }
            }
            for (symbol, rules) in &book.percent_alerts {
                for (i, rule) in rules.iter().enumerate() {
                    let status = if rule.triggered { "triggered" } else { "armed" };
                    println!("percent {}[{}]  {:+.2}%  {}", symbol, i, rule.percent, status);
                }
            }
            ExitCode::SUCCESS
        }
        AlertCommand::AddPrice { symbol, value } => {
            let symbol = symbol.to_uppercase();
            if !settings.watchlist.contains(&symbol) {
                let err = CoinwatchError::UnknownSymbol { symbol };
                eprintln!("error: {err}");
                return ExitCode::from(&err);
            }
            if !value.is_finite() || value <= 0.0 {
                let err = CoinwatchError::InvalidAlert {
                    reason: "target price must be a positive number".into(),
                };
                eprintln!("error: {err}");
                return ExitCode::from(&err);
            }
            store.add_price_alert(&symbol, value);
            eprintln!(
                "Added price alert for {} at {}",
                symbol,
                format_amount(&settings.currency, value)
            );
            ExitCode::SUCCESS
        }
        AlertCommand::AddPercent { symbol, percent } => {
            let symbol = symbol.to_uppercase();
            if !settings.watchlist.contains(&symbol) {
                let err = CoinwatchError::UnknownSymbol { symbol };
                eprintln!("error: {err}");
                return ExitCode::from(&err);
            }
            if !percent.is_finite() || percent == 0.0 {
                let err = CoinwatchError::InvalidAlert {
                    reason: "target percent must be a non-zero number".into(),
                };
                eprintln!("error: {err}");
                return ExitCode::from(&err);
            }
            store.add_percent_alert(&symbol, percent);
            eprintln!("Added percent alert for {} at {:+.2}%", symbol, percent);
            ExitCode::SUCCESS
        }
        AlertCommand::Remove {
            kind,
            symbol,
            index,
        } => {
            let Some(kind) = AlertKind::parse(&kind) else {
                let err = CoinwatchError::InvalidAlert {
                    reason: format!("unknown alert kind: {kind} (expected price or percent)"),
                };
                eprintln!("error: {err}");
                return ExitCode::from(&err);
            };
            let symbol = symbol.to_uppercase();
            if store.remove_alert(kind, &symbol, index) {
                eprintln!("Removed {} alert {}[{}]", kind.label(), symbol, index);
                ExitCode::SUCCESS
            } else {
                let err = CoinwatchError::InvalidAlert {
                    reason: format!("no {} alert at {}[{}]", kind.label(), symbol, index),
                };
                eprintln!("error: {err}");
                ExitCode::from(&err)
            }
        }
    }
}
