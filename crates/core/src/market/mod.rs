//! Market data service: resolver, pipeline and cache wired together.

mod model;
mod service;

pub use model::RefreshSummary;
pub use service::{MarketDataService, MarketDataServiceTrait};
