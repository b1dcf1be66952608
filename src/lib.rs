pub mod aggregate;
pub mod cli;
pub mod correctness;
pub mod error;
pub mod filter;
pub mod latex;
pub mod logger;
pub mod parse;
pub mod plot;
pub mod record;
pub mod scrape;
pub mod series;

pub use error::{Error, Result};

/// Queries in the benchmark: 1016 models, two query families, 16 formulas each.
pub const TOTAL_QUERIES: usize = 1016 * 2 * 16;
