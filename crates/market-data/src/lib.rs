//! HTTP collaborators that feed the scoring core: FRED for macro series,
//! Yahoo Finance for closes, fundamentals and ticker search.

mod http;
pub mod fred;
pub mod yahoo;

pub use fred::FredClient;
pub use http::DEFAULT_RATE_LIMIT;
pub use yahoo::{filter_quotes, YahooClient, MIN_QUERY_LEN};
