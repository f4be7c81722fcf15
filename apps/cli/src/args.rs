use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

pub const DEFAULT_TOP_LIMIT: usize = 20;
pub const DEFAULT_CHART_DAYS: i64 = 7;

#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Provider API base URL (overrides COINTRACK_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Durable cache directory (overrides COINTRACK_CACHE_DIR)
    #[arg(long, value_hint = ValueHint::DirPath, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Run without the durable cache
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Quote currency (overrides COINTRACK_CURRENCY)
    #[arg(long, global = true)]
    pub currency: Option<String>,

    /// Ceiling on pages per bulk fetch (overrides COINTRACK_MAX_PAGES)
    #[arg(long, global = true)]
    pub max_pages: Option<u32>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Check that the provider is reachable
    Ping,

    /// Refresh and list the top coins by rank
    Top(TopArgs),

    /// Show one coin
    Coin(CoinArgs),

    /// Show the current price of one coin
    Price(CoinArgs),

    /// Show global market statistics
    Market,

    /// Show the total market capitalization over time
    MarketChart(RangeArgs),

    /// Show the price history of one coin
    Chart(ChartArgs),

    /// Print the web page of one coin
    Link(CoinArgs),

    /// List supported quote currencies
    Currencies,

    /// Remove durable cache files
    Clean,

    /// Clear both cache tiers
    Reset,
}

#[derive(Args)]
pub struct TopArgs {
    /// Number of coins to print
    #[arg(long, short = 'n', default_value_t = DEFAULT_TOP_LIMIT)]
    pub limit: usize,

    /// Print the cached list without refreshing
    #[arg(long)]
    pub offline: bool,
}

#[derive(Args)]
pub struct CoinArgs {
    /// Coin name, symbol or slug
    pub name: String,
}

#[derive(Args)]
pub struct ChartArgs {
    /// Coin name, symbol or slug
    pub name: String,

    /// Days of history
    #[arg(long, default_value_t = DEFAULT_CHART_DAYS)]
    pub days: i64,
}

#[derive(Args)]
pub struct RangeArgs {
    /// Days of history
    #[arg(long, default_value_t = DEFAULT_CHART_DAYS)]
    pub days: i64,

    /// Print the cached chart without contacting the provider
    #[arg(long)]
    pub offline: bool,
}
