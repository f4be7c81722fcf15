use std::collections::HashMap;

use super::slug::slugify;
use super::table::ResolutionTable;
use crate::models::CatalogEntry;

/// Single-writer builder for a [`ResolutionTable`].
///
/// Keys are registered in two passes over the catalog:
///
/// 1. Explicit keys per entry, in catalog order: lower-cased name,
///    lower-cased symbol, slugified name, and the first word of a two-word
///    name whose second word is `coin`.
/// 2. First-word aliases of every other multi-word name.
///
/// A key keeps the first ID that claimed it. Running the heuristic aliases
/// in their own pass means no explicit key from any entry can lose to a
/// first-word alias, whatever the catalog order.
pub struct ResolutionTableBuilder<'a> {
    catalog: &'a [CatalogEntry],
    keys: HashMap<String, String>,
}

impl<'a> ResolutionTableBuilder<'a> {
    pub fn new(catalog: &'a [CatalogEntry]) -> Self {
        Self {
            catalog,
            keys: HashMap::with_capacity(catalog.len() * 3),
        }
    }

    /// Inserts `key` only if unclaimed. Returns whether it was inserted.
    fn claim(&mut self, key: String, id: &str) -> bool {
        if key.is_empty() || self.keys.contains_key(&key) {
            return false;
        }
        self.keys.insert(key, id.to_string());
        true
    }

    fn register_explicit_keys(&mut self) {
        let catalog = self.catalog;
        for entry in catalog {
            let name = entry.name.trim().to_lowercase();
            self.claim(name.clone(), &entry.id);
            self.claim(entry.symbol.trim().to_lowercase(), &entry.id);
            self.claim(slugify(&entry.name), &entry.id);

            let words: Vec<&str> = name.split_whitespace().collect();
            if words.len() > 1 && words[1] == "coin" {
                self.claim(words[0].to_string(), &entry.id);
            }
        }
    }

    fn register_first_word_aliases(&mut self) {
        let catalog = self.catalog;
        for entry in catalog {
            let name = entry.name.trim().to_lowercase();
            let words: Vec<&str> = name.split_whitespace().collect();
            if words.len() > 1 && words[1] != "coin" {
                self.claim(words[0].to_string(), &entry.id);
            }
        }
    }

    /// Runs both passes and freezes the result.
    pub fn build(mut self) -> ResolutionTable {
        self.register_explicit_keys();
        self.register_first_word_aliases();
        ResolutionTable::from_keys(self.keys)
    }
}
