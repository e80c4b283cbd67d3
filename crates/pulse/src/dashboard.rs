use crate::ui::Frame;
use anyhow::Result;
use log::{debug, error, info};
use pulse_client::prelude::*;
use pulse_client::{CHART_POLL_PERIOD, QUOTE_POLL_PERIOD};
use pulse_common::{ChartSeries, Quote, DEFAULT_INTERVAL, DEFAULT_RANGE};
use std::io::Write;
use tokio::sync::mpsc;

/// One line of dashboard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Remove(String),
    Select(String),
    Quit,
}

impl Command {
    /// `+SYM` adds, `-SYM` removes, `q` quits, anything else selects.
    pub fn parse(line: &str) -> Option<Command> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let command = if matches!(line, "q" | "quit" | "exit") {
            Command::Quit
        } else if let Some(symbol) = line.strip_prefix('+') {
            Command::Add(symbol.to_string())
        } else if let Some(symbol) = line.strip_prefix('-') {
            Command::Remove(symbol.to_string())
        } else {
            Command::Select(line.to_string())
        };
        Some(command)
    }
}

/// The watchlist wired up to its two pollers: quotes keyed by the symbol
/// list, the chart keyed by the active symbol.
pub struct Dashboard<S: Storage> {
    watchlist: Watchlist<S>,
    quotes: Poller<Vec<String>, Vec<Quote>>,
    chart: Poller<String, ChartSeries>,
}

impl<S: Storage> Dashboard<S> {
    pub fn new(watchlist: Watchlist<S>, client: Client, base: Url) -> Self {
        let quotes = {
            let (client, base) = (client.clone(), base.clone());
            Poller::new("quotes", QUOTE_POLL_PERIOD, move |symbols: Vec<String>| {
                let (client, base) = (client.clone(), base.clone());
                async move { client.fetch_quotes(&base, &symbols).await }
            })
        };
        let chart = Poller::new("chart", CHART_POLL_PERIOD, move |symbol: String| {
            let (client, base) = (client.clone(), base.clone());
            async move {
                client
                    .fetch_chart(&base, &symbol, DEFAULT_RANGE, DEFAULT_INTERVAL)
                    .await
            }
        });

        let mut dashboard = Dashboard {
            watchlist,
            quotes,
            chart,
        };
        dashboard.sync();
        dashboard
    }

    pub fn watchlist(&self) -> &Watchlist<S> {
        &self.watchlist
    }

    /// Point both pollers at the current watchlist & active symbol.
    fn sync(&mut self) {
        let symbols = (!self.watchlist.is_empty()).then(|| self.watchlist.symbols().to_vec());
        self.quotes.reschedule(symbols);
        self.chart
            .reschedule(self.watchlist.active().map(str::to_string));
    }

    /// Apply one command; `false` means quit.
    pub fn handle(&mut self, command: Command) -> bool {
        match command {
            // a failed save leaves the watchlist untouched; keep the session going
            Command::Add(symbol) => match self.watchlist.add(&symbol) {
                Ok(true) => info!("tracking {}", symbol.trim().to_uppercase()),
                Ok(false) => {}
                Err(e) => error!("failed to save watchlist: {e:#}"),
            },
            Command::Remove(symbol) => match self.watchlist.remove(&symbol) {
                Ok(true) => info!("dropped {}", symbol.trim().to_uppercase()),
                Ok(false) => {}
                Err(e) => error!("failed to save watchlist: {e:#}"),
            },
            Command::Select(symbol) => {
                if !self.watchlist.select(&symbol) {
                    debug!("{symbol} is not on the watchlist");
                }
            }
            Command::Quit => return false,
        }
        self.sync();
        true
    }

    pub fn render(&self) -> String {
        let quotes = self.quotes.subscribe().borrow().clone();
        let chart = self.chart.subscribe().borrow().clone();

        // the chart of a previous symbol stays hidden until the new one lands
        let series = chart
            .data
            .as_ref()
            .filter(|_| chart.data_key.as_deref() == self.watchlist.active());

        Frame {
            symbols: self.watchlist.symbols(),
            active: self.watchlist.active(),
            quotes: quotes.data.as_deref(),
            quotes_error: quotes.error.as_deref(),
            loading: quotes.loading,
            chart: series,
        }
        .render()
    }

    /// Redraw on every poll update and every line of input until `q`,
    /// end of input, or Ctrl-C.
    pub async fn run(mut self) -> Result<()> {
        let mut quotes_rx = self.quotes.subscribe();
        let mut chart_rx = self.chart.subscribe();
        let mut lines = stdin_lines();

        draw(&self.render());
        loop {
            tokio::select! {
                changed = quotes_rx.changed() => changed?,
                changed = chart_rx.changed() => changed?,
                line = lines.recv() => {
                    let Some(line) = line else { break };
                    if let Some(command) = Command::parse(&line) {
                        if !self.handle(command) {
                            break;
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }
            draw(&self.render());
        }
        Ok(())
    }
}

/// Stdin on its own thread, so a pending read never holds up shutdown.
fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn draw(frame: &str) {
    // clear screen & home the cursor
    print!("\x1B[2J\x1B[H{frame}\n> ");
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("+meta"), Some(Command::Add("meta".to_string())));
        assert_eq!(Command::parse(" -AAPL "), Some(Command::Remove("AAPL".to_string())));
        assert_eq!(Command::parse("nvda"), Some(Command::Select("nvda".to_string())));
        assert_eq!(Command::parse("q"), Some(Command::Quit));
        assert_eq!(Command::parse("   "), None);
    }

    fn dashboard() -> Dashboard<MemoryStorage> {
        // nothing listens here; polls fail & are only logged
        let base = Url::parse("http://127.0.0.1:9").unwrap();
        Dashboard::new(Watchlist::load(MemoryStorage::new()), Client::new(), base)
    }

    #[tokio::test]
    async fn commands_reschedule_pollers() {
        let mut dashboard = dashboard();
        assert_eq!(dashboard.chart.key().map(String::as_str), Some("AAPL"));
        assert_eq!(dashboard.quotes.key().map(Vec::len), Some(6));

        assert!(dashboard.handle(Command::Add("goog".to_string())));
        assert_eq!(dashboard.chart.key().map(String::as_str), Some("GOOG"));
        assert_eq!(dashboard.quotes.key().map(Vec::len), Some(7));

        dashboard.handle(Command::Select("msft".to_string()));
        assert_eq!(dashboard.chart.key().map(String::as_str), Some("MSFT"));

        dashboard.handle(Command::Remove("MSFT".to_string()));
        assert_eq!(dashboard.chart.key().map(String::as_str), Some("AAPL"));

        assert!(!dashboard.handle(Command::Quit));
    }

    struct ReadOnly;

    impl Storage for ReadOnly {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: String) -> Result<()> {
            anyhow::bail!("read-only store")
        }
    }

    #[tokio::test]
    async fn failed_save_keeps_the_session_running() {
        let base = Url::parse("http://127.0.0.1:9").unwrap();
        let mut dashboard = Dashboard::new(Watchlist::load(ReadOnly), Client::new(), base);

        assert!(dashboard.handle(Command::Add("goog".to_string())));
        assert!(dashboard.handle(Command::Remove("AAPL".to_string())));
        assert_eq!(dashboard.watchlist().symbols().len(), 6);
        assert_eq!(dashboard.chart.key().map(String::as_str), Some("AAPL"));
    }

    #[tokio::test]
    async fn empty_watchlist_stops_polling() {
        let mut dashboard = dashboard();
        let symbols = dashboard.watchlist().symbols().to_vec();
        for symbol in symbols {
            dashboard.handle(Command::Remove(symbol));
        }

        assert!(dashboard.watchlist().is_empty());
        assert_eq!(dashboard.quotes.key(), None);
        assert_eq!(dashboard.chart.key(), None);
    }
}
