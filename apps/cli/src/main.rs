mod args;
mod config;
mod output;

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use clap::Parser;
use cointrack_core::{clean, MarketDataService, MarketDataServiceTrait};
use cointrack_market_data::CoinGeckoProvider;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use args::{Cli, Command};
use config::AppConfig;

/// Logs go to stderr so command output stays clean on stdout.
fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env().apply_overrides(&cli);
    init_tracing(&config.log_format);

    // cache maintenance needs no provider
    match &cli.cmd {
        Command::Clean => {
            let removed = clean(&config.cache_dir)
                .with_context(|| format!("cleaning {}", config.cache_dir.display()))?;
            println!("removed {} cache file(s) from {}", removed, config.cache_dir.display());
            return Ok(());
        }
        Command::Currencies => {
            println!("{}", cointrack_market_data::SUPPORTED_CURRENCIES.join("\n"));
            return Ok(());
        }
        _ => {}
    }

    config.validate()?;
    let provider = Arc::new(CoinGeckoProvider::new(config.provider_config()));
    let service = MarketDataService::new(provider, config.service_config());
    let currency = config.currency.as_str();

    match cli.cmd {
        Command::Ping => {
            service.ping().await.context("provider unreachable")?;
            println!("ok");
        }
        Command::Top(args) if args.offline => {
            let records = service.load_durable();
            print!("{}", output::records_table(&records, args.limit));
        }
        Command::Top(args) => {
            let mut records = service.bootstrap().await;
            let summary = service.refresh_all(currency).await;
            if let Some(e) = &summary.error {
                tracing::warn!("Refresh stopped after {} page(s): {}", summary.pages, e);
            }
            if summary.updated_cache() {
                records = service.cached_records();
            }
            print!("{}", output::records_table(&records, args.limit));
        }
        Command::Coin(args) => {
            service.bootstrap().await;
            match service.coin(&args.name, currency).await? {
                Some(record) => print!("{}", output::record_detail(&record)),
                None => anyhow::bail!("no market data for '{}'", args.name),
            }
        }
        Command::Price(args) => {
            service.bootstrap().await;
            let price = service.price(&args.name, currency).await?;
            println!("{} {}", price, currency.to_uppercase());
        }
        Command::Market => {
            let market = service.global_market(currency).await?;
            print!("{}", output::global_market(&market));
        }
        Command::MarketChart(args) => {
            let days = args.days.max(1);
            if args.offline {
                let chart_days = u32::try_from(days).unwrap_or(u32::MAX);
                if !service.seed_global_chart(currency, chart_days) {
                    anyhow::bail!("no cached market-cap chart for {} day(s)", days);
                }
            }
            let end = Utc::now();
            let start = end - Duration::days(days);
            let points = service.global_chart(currency, start, end).await?;
            print!("{}", output::market_cap_chart(&points, currency));
        }
        Command::Chart(args) => {
            service.bootstrap().await;
            let end = Utc::now();
            let start = end - Duration::days(args.days.max(1));
            let points = service.coin_chart(&args.name, currency, start, end).await?;
            print!("{}", output::chart(&points));
        }
        Command::Link(args) => {
            service.bootstrap().await;
            println!("{}", service.coin_link(&args.name));
        }
        Command::Reset => {
            let removed = service.reset()?;
            println!("cache reset, removed {} file(s)", removed);
        }
        Command::Clean | Command::Currencies => {}
    }

    Ok(())
}
