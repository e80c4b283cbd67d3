pub mod schema;
pub mod symbols;

pub use schema::chart::{ChartPoint, ChartSeries};
pub use schema::quote::{Quote, QuoteList};
pub use schema::ErrorBody;

/// Watchlist used when nothing has been saved yet.
pub const DEFAULT_SYMBOLS: [&str; 6] = ["AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "TSLA"];

pub const DEFAULT_RANGE: &str = "1d";
pub const DEFAULT_INTERVAL: &str = "1m";
