/// Slugifies a name: trimmed, lower-cased, every character outside
/// `[a-z0-9]` replaced with `-`.
///
/// ```
/// use cointrack_market_data::resolver::slugify;
///
/// assert_eq!(slugify("Bitcoin Cash"), "bitcoin-cash");
/// assert_eq!(slugify(" USD Coin "), "usd-coin");
/// ```
pub fn slugify(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// Lookup-key normalization for user input: trimmed and lower-cased.
pub fn lookup_key(input: &str) -> String {
    input.trim().to_lowercase()
}
