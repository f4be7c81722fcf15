/// Sort order requested from the provider for ranked pages.
pub const ORDER_MARKET_CAP_DESC: &str = "market_cap_desc";

/// A price-change window the provider can include per record.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PriceChangeWindow {
    OneHour,
    OneDay,
    SevenDays,
    ThirtyDays,
}

impl PriceChangeWindow {
    /// The windows every ranked request asks for.
    pub const ALL: [PriceChangeWindow; 4] = [
        PriceChangeWindow::OneHour,
        PriceChangeWindow::OneDay,
        PriceChangeWindow::SevenDays,
        PriceChangeWindow::ThirtyDays,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::OneDay => "24h",
            Self::SevenDays => "7d",
            Self::ThirtyDays => "30d",
        }
    }
}

/// Parameters of one ranked market-data page request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketsQuery {
    /// Lower-cased target currency
    pub vs_currency: String,
    /// Canonical IDs to filter by; empty means no filter
    pub ids: Vec<String>,
    pub order: &'static str,
    pub per_page: u32,
    /// 1-based page index
    pub page: u32,
    pub sparkline: bool,
    pub price_change_windows: Vec<PriceChangeWindow>,
}

impl MarketsQuery {
    /// Ranked page request with the fixed order, sparkline and windows.
    pub fn ranked(vs_currency: impl Into<String>, per_page: u32, page: u32) -> Self {
        Self {
            vs_currency: vs_currency.into(),
            ids: Vec::new(),
            order: ORDER_MARKET_CAP_DESC,
            per_page,
            page,
            sparkline: false,
            price_change_windows: PriceChangeWindow::ALL.to_vec(),
        }
    }

    pub fn with_ids(mut self, ids: Vec<String>) -> Self {
        self.ids = ids;
        self
    }

    /// Comma-joined window list as sent on the wire (`1h,24h,7d,30d`).
    pub fn price_change_param(&self) -> String {
        self.price_change_windows
            .iter()
            .map(|w| w.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_query_fixed_parameters() {
        let query = MarketsQuery::ranked("usd", 250, 3);
        assert_eq!(query.order, "market_cap_desc");
        assert!(!query.sparkline);
        assert_eq!(query.page, 3);
        assert!(query.ids.is_empty());
        assert_eq!(query.price_change_param(), "1h,24h,7d,30d");
    }

    #[test]
    fn test_with_ids() {
        let query = MarketsQuery::ranked("eur", 250, 1)
            .with_ids(vec!["bitcoin".to_string(), "ethereum".to_string()]);
        assert_eq!(query.ids, vec!["bitcoin", "ethereum"]);
    }
}
