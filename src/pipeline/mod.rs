#![forbid(unsafe_code)]

pub mod enrich;
pub mod fetcher;

pub use enrich::{enrich_all, enrich_one, EnrichOptions};
pub use fetcher::MetadataFetcher;
