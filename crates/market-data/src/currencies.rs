//! Currency codes the provider quotes prices in.

/// Supported quote currencies, upper-case, in alphabetical order.
pub const SUPPORTED_CURRENCIES: [&str; 50] = [
    "AED", "ARS", "AUD", "BDT", "BHD", "BMD", "BNB", "BRL", "BTC", "CAD", "CHF", "CLP", "CNY",
    "CZK", "DKK", "EOS", "ETH", "EUR", "GBP", "HKD", "HUF", "IDR", "ILS", "INR", "JPY", "KRW",
    "KWD", "LKR", "MMK", "MXN", "MYR", "NOK", "NZD", "PHP", "PKR", "PLN", "RUB", "SAR", "SEK",
    "SGD", "THB", "TRY", "TWD", "UAH", "USD", "VEF", "VND", "XAG", "XDR", "ZAR",
];

pub fn supported_currencies() -> Vec<String> {
    SUPPORTED_CURRENCIES.iter().map(|c| c.to_string()).collect()
}

/// Case-insensitive membership check.
pub fn is_supported(currency: &str) -> bool {
    let currency = currency.trim();
    SUPPORTED_CURRENCIES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(currency))
}
