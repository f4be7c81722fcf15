use std::fmt::Write;

use cointrack_market_data::{CoinRecord, GlobalMarketData, MarketCapPoint, PricePoint};

fn rank_label(record: &CoinRecord) -> String {
    if record.is_ranked() {
        record.rank.to_string()
    } else {
        "-".to_string()
    }
}

pub fn records_table(records: &[CoinRecord], limit: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<24} {:<8} {:>18} {:>8} {:>8} {:>22}",
        "RANK", "NAME", "SYMBOL", "PRICE", "1H%", "24H%", "MARKET CAP"
    );
    for record in records.iter().take(limit) {
        let _ = writeln!(
            out,
            "{:>5}  {:<24} {:<8} {:>18} {:>8.2} {:>8.2} {:>22}",
            rank_label(record),
            truncate(&record.name, 24),
            record.symbol,
            record.price,
            record.percent_change_1h,
            record.percent_change_24h,
            record.market_cap
        );
    }
    out
}

pub fn record_detail(record: &CoinRecord) -> String {
    let currency = record.currency.to_uppercase();
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", record.name, record.symbol);
    let _ = writeln!(out, "  rank:               {}", rank_label(record));
    let _ = writeln!(out, "  price:              {} {}", record.price, currency);
    let _ = writeln!(out, "  market cap:         {} {}", record.market_cap, currency);
    let _ = writeln!(out, "  24h volume:         {} {}", record.volume_24h, currency);
    let _ = writeln!(out, "  circulating supply: {}", record.circulating_supply);
    let _ = writeln!(out, "  total supply:       {}", record.total_supply);
    let _ = writeln!(
        out,
        "  change 1h/24h/7d/30d: {:.2}% / {:.2}% / {:.2}% / {:.2}%",
        record.percent_change_1h,
        record.percent_change_24h,
        record.percent_change_7d,
        record.percent_change_30d
    );
    if let Some(updated) = record.last_updated {
        let _ = writeln!(out, "  last updated:       {}", updated.to_rfc3339());
    }
    out
}

pub fn global_market(market: &GlobalMarketData) -> String {
    let currency = market.currency.to_uppercase();
    let mut out = String::new();
    let _ = writeln!(out, "total market cap:   {} {}", market.total_market_cap, currency);
    let _ = writeln!(out, "24h volume:         {} {}", market.total_volume_24h, currency);
    let _ = writeln!(out, "btc dominance:      {:.2}%", market.bitcoin_dominance);
    let _ = writeln!(out, "active currencies:  {}", market.active_currencies);
    let _ = writeln!(out, "active markets:     {}", market.active_markets);
    out
}

pub fn chart(points: &[PricePoint]) -> String {
    let mut out = String::new();
    for point in points {
        let _ = writeln!(out, "{}  {}", point.timestamp.to_rfc3339(), point.price);
    }
    out
}

pub fn market_cap_chart(points: &[MarketCapPoint], currency: &str) -> String {
    let currency = currency.to_uppercase();
    let mut out = String::new();
    for point in points {
        let _ = writeln!(
            out,
            "{}  {:.0} {}",
            point.timestamp.to_rfc3339(),
            point.market_cap,
            currency
        );
    }
    out
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Bitcoin", 24), "Bitcoin");
        assert_eq!(truncate("abcdef", 4), "abc~");
    }
}
