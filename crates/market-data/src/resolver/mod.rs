//! Identifier resolution: human-typed coin names to canonical provider IDs.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐  build()   ┌──────────────────┐  publish()  ┌──────────────────────┐
//! │ ResolutionTableBuilder│ ────────> │ ResolutionTable  │ ──────────> │ IdentifierResolver   │
//! │ (single writer,       │           │ (immutable)      │             │ (read-only handle,   │
//! │  two catalog passes)  │           └──────────────────┘             │  wholesale swaps)    │
//! └──────────────────────┘                                             └──────────────────────┘
//! ```
//!
//! # Key Precedence
//!
//! For each catalog entry in order, the lower-cased name, lower-cased symbol
//! and slugified name are registered, plus the first word of a two-word name
//! ending in `coin`. First-word aliases of other multi-word names are only
//! registered after the whole catalog has been seen. A key that is already
//! claimed is never overwritten.
//!
//! # Example
//!
//! ```
//! use cointrack_market_data::models::CatalogEntry;
//! use cointrack_market_data::resolver::ResolutionTable;
//!
//! let table = ResolutionTable::build(&[
//!     CatalogEntry::new("bitcoin-cash", "Bitcoin Cash", "bch"),
//!     CatalogEntry::new("bitcoin", "Bitcoin", "btc"),
//! ]);
//!
//! assert_eq!(table.resolve("bitcoin"), "bitcoin");
//! assert_eq!(table.resolve("BCH"), "bitcoin-cash");
//! assert_eq!(table.resolve("Not Listed"), "not-listed");
//! ```

mod builder;
mod shared;
mod slug;
mod table;

pub use builder::ResolutionTableBuilder;
pub use shared::IdentifierResolver;
pub use slug::{lookup_key, slugify};
pub use table::ResolutionTable;
