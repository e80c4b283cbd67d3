pub mod client_ext;
pub mod poll;
pub mod storage;
pub mod watchlist;

/// Quotes refresh for the whole watchlist.
pub const QUOTE_POLL_PERIOD: std::time::Duration = std::time::Duration::from_secs(10);

/// Chart refresh for the active symbol.
pub const CHART_POLL_PERIOD: std::time::Duration = std::time::Duration::from_secs(60);

pub mod prelude {
    pub use crate::client_ext::PulseApiExt;
    pub use crate::poll::{PollState, Poller};
    pub use crate::storage::{FileStorage, MemoryStorage, Storage};
    pub use crate::watchlist::Watchlist;
    pub use reqwest::{Client, Url};

    pub fn build_client(user_agent: &str) -> anyhow::Result<Client> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(user_agent)
            .build()?;
        Ok(client)
    }
}
