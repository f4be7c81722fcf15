use serde::{Deserialize, Serialize};

/// One coin from the provider-wide catalog listing.
///
/// The catalog is replaced wholesale on every re-fetch; entries are never
/// patched field by field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Canonical provider ID
    pub id: String,
    /// Display name (e.g. "Bitcoin Cash")
    pub name: String,
    /// Ticker symbol as the provider reports it (e.g. "bch")
    pub symbol: String,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}
