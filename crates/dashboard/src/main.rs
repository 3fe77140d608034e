//! dashboard - stock and macro scoring from the terminal
//!
//! ```bash
//! dashboard pool                 # score every symbol in the stock pool
//! dashboard analyze AAPL --export     # workbook and PDF report
//! dashboard macro
//! dashboard config set-key fred KEY
//! dashboard search apple
//! dashboard add AAPL "Apple Inc."
//! ```

use std::sync::Arc;

use analysis_core::{is_valid_symbol, AnalysisError, SymbolSearch, MAX_SYMBOL_LEN};
use analysis_orchestrator::{export_csv, export_report, AnalysisOrchestrator};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use market_data::{FredClient, YahooClient};
use stock_pool::StorageManager;

mod config;
mod display;
mod settings;

use config::DashboardConfig;
use settings::{ApiKeyName, Feature, SettingsStore};

/// Heuristic stock and macroeconomic scoring dashboard
#[derive(Parser)]
#[command(name = "dashboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Heuristic stock and macroeconomic scoring dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every symbol in the stock pool
    Pool,

    /// Full analysis of one symbol: score, moving averages and RSI
    Analyze {
        #[arg(value_name = "SYMBOL", value_parser = parse_symbol)]
        symbol: String,

        /// Write the Excel workbook and PDF report to the export directory
        #[arg(short, long)]
        export: bool,

        /// Write summary and time series CSV files to the export directory
        #[arg(long)]
        csv: bool,
    },

    /// Macroeconomic sentiment from FRED data
    Macro,

    /// Look up ticker symbols by company name
    Search {
        #[arg(value_name = "QUERY")]
        query: String,
    },

    /// Add a symbol to the stock pool
    Add {
        #[arg(value_name = "SYMBOL", value_parser = parse_symbol)]
        symbol: String,

        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Remove symbols from the stock pool
    Remove {
        #[arg(value_name = "SYMBOL", required = true, value_parser = parse_symbol)]
        symbols: Vec<String>,
    },

    /// Mark a symbol as favorite
    Favorite {
        #[arg(value_name = "SYMBOL", value_parser = parse_symbol)]
        symbol: String,
    },

    /// Remove a symbol from favorites
    Unfavorite {
        #[arg(value_name = "SYMBOL", value_parser = parse_symbol)]
        symbol: String,
    },

    /// Show or change saved API keys and feature flags
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective settings
    Show,

    /// Save an API key to the settings file
    SetKey {
        #[arg(value_enum)]
        name: ApiKeyName,

        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Turn a feature on
    Enable {
        #[arg(value_enum)]
        feature: Feature,
    },

    /// Turn a feature off
    Disable {
        #[arg(value_enum)]
        feature: Feature,
    },
}

/// Uppercased ticker, rejected when it could not be a symbol.
fn parse_symbol(raw: &str) -> Result<String, String> {
    let symbol = raw.trim().to_uppercase();
    if is_valid_symbol(&symbol) {
        Ok(symbol)
    } else {
        Err(format!(
            "'{}' is not a ticker symbol (letters, digits, '.', '-', '^', '=', at most {} characters)",
            raw, MAX_SYMBOL_LEN
        ))
    }
}

struct App {
    config: DashboardConfig,
    storage: StorageManager,
    yahoo: YahooClient,
    orchestrator: AnalysisOrchestrator,
}

impl App {
    fn new(config: DashboardConfig) -> Result<Self> {
        let storage = StorageManager::new(&config.data_dir)
            .with_context(|| format!("opening data directory {}", config.data_dir.display()))?;

        let yahoo = YahooClient::new().with_rate_limit(config.http_rate_limit);
        let fred = FredClient::new(config.fred_api_key.clone()).with_rate_limit(config.http_rate_limit);
        let orchestrator = AnalysisOrchestrator::new(Arc::new(yahoo.clone()), Arc::new(fred));

        Ok(Self { config, storage, yahoo, orchestrator })
    }

    fn require_stock_analysis(&self) -> Result<(), AnalysisError> {
        if self.config.enable_stock_analysis {
            Ok(())
        } else {
            Err(AnalysisError::Disabled("stock analysis".to_string()))
        }
    }

    fn require_macro_analysis(&self) -> Result<(), AnalysisError> {
        if self.config.enable_macro_analysis {
            Ok(())
        } else {
            Err(AnalysisError::Disabled("macro analysis".to_string()))
        }
    }

    async fn run(&self, command: Commands) -> Result<(), AnalysisError> {
        match command {
            Commands::Pool => {
                self.require_stock_analysis()?;
                let pool = self.storage.load_stock_pool()?;
                if pool.is_empty() {
                    println!("Stock pool is empty. Add symbols with `dashboard add SYMBOL NAME`.");
                    return Ok(());
                }
                let favorites = self.storage.load_favorites()?;
                let rows = self.orchestrator.score_pool(&pool).await;
                print!("{}", display::pool_table(&rows, &favorites));
                if rows.len() < pool.len() {
                    println!("\n{} of {} symbols unavailable", pool.len() - rows.len(), pool.len());
                }
            }

            Commands::Analyze { symbol, export, csv } => {
                self.require_stock_analysis()?;
                let report = self.orchestrator.analyze_stock(&symbol).await?;
                print!("{}", display::stock_summary(&report));

                if (export || csv) && !report.has_full_technicals() {
                    println!("\nNot enough price history for MA20, MA50 and RSI; nothing exported.");
                    return Ok(());
                }
                let today = chrono::Local::now().date_naive();
                if export {
                    let paths = export_report(&self.config.export_dir, &report, today)?;
                    println!("\nWorkbook written to {}", paths.workbook.display());
                    println!("Report written to {}", paths.document.display());
                }
                if csv {
                    let paths = export_csv(&self.config.export_dir, &report, today)?;
                    println!("\nSummary written to {}", paths.summary.display());
                    println!("Time series written to {}", paths.time_series.display());
                }
            }

            Commands::Macro => {
                self.require_macro_analysis()?;
                let report = self.orchestrator.macro_report().await?;
                print!("{}", display::macro_summary(&report));
            }

            Commands::Search { query } => {
                let suggestions = self.yahoo.search(&query).await?;
                print!("{}", display::suggestions(&suggestions));
            }

            Commands::Add { symbol, name } => {
                let mut pool = self.storage.load_stock_pool()?;
                if pool.add(&symbol, &name) {
                    self.storage.save_stock_pool(&pool)?;
                    println!("Added {} - {}", symbol, name);
                } else {
                    println!("{} is already in the stock pool", symbol);
                }
            }

            Commands::Remove { symbols } => {
                let mut pool = self.storage.load_stock_pool()?;
                let mut favorites = self.storage.load_favorites()?;
                for symbol in &symbols {
                    if pool.remove(symbol) {
                        favorites.remove(symbol);
                        println!("Removed {}", symbol);
                    } else {
                        println!("{} is not in the stock pool", symbol);
                    }
                }
                self.storage.save_stock_pool(&pool)?;
                self.storage.save_favorites(&favorites)?;
            }

            Commands::Favorite { symbol } => {
                let mut favorites = self.storage.load_favorites()?;
                if favorites.add(&symbol) {
                    self.storage.save_favorites(&favorites)?;
                }
                println!("{} marked as favorite", symbol);
            }

            Commands::Unfavorite { symbol } => {
                let mut favorites = self.storage.load_favorites()?;
                if favorites.remove(&symbol) {
                    self.storage.save_favorites(&favorites)?;
                }
                println!("{} removed from favorites", symbol);
            }

            Commands::Config { action } => {
                run_config(&self.config, action).map_err(|e| AnalysisError::StorageError(format!("{:#}", e)))?;
            }
        }
        Ok(())
    }
}

/// Settings changes take effect on the next run; env variables still win over the file.
fn run_config(config: &DashboardConfig, action: ConfigAction) -> Result<()> {
    let store = SettingsStore::new(&config.config_dir);
    match action {
        ConfigAction::Show => print!("{}", display::config_summary(config)),
        ConfigAction::SetKey { name, key } => {
            store.update_api_key(name, &key)?;
            println!("Saved {:?} API key to {}", name, store.yaml_path().display());
        }
        ConfigAction::Enable { feature } => {
            store.update_feature_flag(feature, true)?;
            println!("{} enabled", capitalize(feature.label()));
        }
        ConfigAction::Disable { feature } => {
            store.update_feature_flag(feature, false)?;
            println!("{} disabled", capitalize(feature.label()));
        }
    }
    Ok(())
}

fn init_tracing() {
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter).with_writer(std::io::stderr).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_tracing();

    let config = DashboardConfig::from_env().context("loading configuration")?;
    tracing::debug!(
        "Config: macro {}, stock {}, data dir {}",
        config.enable_macro_analysis,
        config.enable_stock_analysis,
        config.data_dir.display()
    );

    let app = App::new(config)?;

    match app.run(cli.command).await {
        Ok(()) => Ok(()),
        Err(AnalysisError::Disabled(feature)) => {
            println!("{} is currently disabled.", capitalize(&feature));
            Ok(())
        }
        Err(e) if e.is_unavailable() => {
            tracing::debug!("{}", e);
            eprintln!("Data is currently unavailable. Please check your API configuration and connectivity.");
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
