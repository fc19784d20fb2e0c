use anyhow::Result;
use clap::Parser;
use currency_service::core::Currency;
use currency_service::core::config::{
    AppConfig, AppMode, MAX_PERIOD_MINUTES, Overrides, Settings, parse_debug,
};
use currency_service::core::log::init_logging;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Initial RUB amount
    #[arg(long)]
    rub: Option<f64>,

    /// Initial USD amount
    #[arg(long)]
    usd: Option<f64>,

    /// Initial EUR amount
    #[arg(long)]
    eur: Option<f64>,

    /// Update period in minutes
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=MAX_PERIOD_MINUTES))]
    period: u64,

    /// Enable debug output (1, true, yes, ...)
    #[arg(long, value_name = "VALUE", num_args = 0..=1, default_missing_value = "true")]
    debug: Option<String>,

    /// Run as HTTP server instead of polling rates
    #[arg(long)]
    api: bool,

    /// Address to bind the HTTP server to
    #[arg(long)]
    host: Option<String>,

    /// Port for the HTTP server
    #[arg(long)]
    port: Option<u16>,

    /// Base URL of the rate provider
    #[arg(long)]
    rates_url: Option<String>,

    /// Rate fetch timeout in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Path to optional settings file
    #[arg(short, long)]
    config: Option<String>,
}

impl Cli {
    fn initial_amounts(&self) -> Result<Vec<(Currency, f64)>> {
        [("rub", self.rub), ("usd", self.usd), ("eur", self.eur)]
            .into_iter()
            .filter_map(|(code, amount)| amount.map(|a| (code, a)))
            .map(|(code, amount)| -> Result<(Currency, f64)> { Ok((code.parse()?, amount)) })
            .collect()
    }

    fn into_config(self, debug: bool) -> Result<AppConfig> {
        let settings = match self.config.as_deref() {
            Some(path) => Settings::load_from_path(path)?,
            None => Settings::load()?,
        };
        let mode = if self.api {
            AppMode::Server
        } else {
            AppMode::Poll
        };
        let initial_amounts = self.initial_amounts()?;
        let overrides = Overrides {
            host: self.host,
            port: self.port,
            rates_url: self.rates_url,
            timeout_secs: self.timeout,
        };

        Ok(AppConfig::new(
            initial_amounts,
            self.period,
            debug,
            mode,
            settings,
            overrides,
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let debug = cli.debug.as_deref().is_some_and(parse_debug);

    init_logging(debug);

    let config = match cli.into_config(debug) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e);
        }
    };

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
            signal.cancel();
        }
    });

    let result = currency_service::run(config, shutdown).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
