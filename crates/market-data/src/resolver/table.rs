use std::collections::HashMap;

use super::builder::ResolutionTableBuilder;
use super::slug::{lookup_key, slugify};
use crate::models::CatalogEntry;

/// Immutable mapping from lookup key to canonical coin ID.
///
/// Produced by [`ResolutionTableBuilder`]; there is no way to mutate a
/// table after it has been built, so it can be shared across tasks freely.
#[derive(Clone, Debug, Default)]
pub struct ResolutionTable {
    keys: HashMap<String, String>,
}

impl ResolutionTable {
    pub(super) fn from_keys(keys: HashMap<String, String>) -> Self {
        Self { keys }
    }

    /// A table with no keys; every lookup falls back to the slug.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a table from a catalog in catalog order.
    pub fn build(catalog: &[CatalogEntry]) -> Self {
        ResolutionTableBuilder::new(catalog).build()
    }

    /// Exact lookup of already-registered input.
    pub fn lookup(&self, input: &str) -> Option<&str> {
        self.keys.get(&lookup_key(input)).map(String::as_str)
    }

    /// Canonical ID for `input`, or the slugified input when no key matches.
    ///
    /// Never fails; a wrong guess surfaces later as an ordinary fetch miss.
    pub fn resolve(&self, input: &str) -> String {
        match self.lookup(input) {
            Some(id) => id.to_string(),
            None => slugify(input),
        }
    }

    /// Resolves every input, preserving order.
    pub fn resolve_all<S: AsRef<str>>(&self, inputs: &[S]) -> Vec<String> {
        inputs.iter().map(|s| self.resolve(s.as_ref())).collect()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
