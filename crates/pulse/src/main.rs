use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands::*};
use dotenv::dotenv;
use log::{debug, trace};
use pulse_client::prelude::*;
use pulse_common::{symbols, DEFAULT_INTERVAL, DEFAULT_RANGE};

mod cli;
mod dashboard;
mod ui;

fn preprocess(filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first, so clap's `env = ...` args can see it
    dotenv().ok();
    let cli = Cli::parse();
    preprocess(cli.trace.filter());
    trace!("Command line input recorded: {cli:#?}");

    let base = Url::parse(&cli.api).with_context(|| format!("invalid api url: {}", cli.api))?;
    let client = build_client(&format!("pulse/{}", env!("CARGO_PKG_VERSION")))?;
    let mut watchlist = Watchlist::load(FileStorage::open(&cli.store));
    debug!("watchlist loaded from {}", cli.store.display());

    ////////////////////////////////////////////////////////////////////////////////////////////////////

    match cli.command {
        // "> pulse watch"
        Watch => {
            dashboard::Dashboard::new(watchlist, client, base).run().await?;
        }

        // "> pulse quotes [SYMBOLS...]"
        Quotes { symbols: args } => {
            let wanted = match args.is_empty() {
                true => watchlist.symbols().to_vec(),
                false => symbols::parse_list(&args.join(",")),
            };
            anyhow::ensure!(!wanted.is_empty(), "no symbols to fetch");

            let pb = ui::spinner("Fetching quotes");
            let quotes = client.fetch_quotes(&base, &wanted).await;
            pb.finish_and_clear();
            let quotes = quotes?;

            println!("{}\n", ui::ticker(&quotes));
            for quote in &quotes {
                println!("{}", ui::card(quote, watchlist.active() == Some(quote.symbol.as_str())));
            }
        }

        // "> pulse chart SYMBOL [--range R] [--interval I]"
        Chart {
            symbol,
            range,
            interval,
        } => {
            let symbol = symbols::normalize(&symbol).context("empty symbol")?;
            let range = non_blank(range, DEFAULT_RANGE);
            let interval = non_blank(interval, DEFAULT_INTERVAL);

            let pb = ui::spinner("Fetching chart");
            let (series, quotes) = tokio::join!(
                client.fetch_chart(&base, &symbol, &range, &interval),
                client.fetch_quotes(&base, std::slice::from_ref(&symbol)),
            );
            pb.finish_and_clear();

            // the quote only supplies the currency; a chart without it is still worth showing
            let currency = match quotes {
                Ok(quotes) => quotes.into_iter().next().map(|q| q.currency),
                Err(e) => {
                    debug!("no quote for {symbol}: {e}");
                    None
                }
            };
            let series = series?;
            println!("{}", ui::chart(Some(&series), currency.as_deref().unwrap_or("USD")));
        }

        // "> pulse list"
        List => {
            for symbol in watchlist.symbols() {
                let marker = if watchlist.active() == Some(symbol.as_str()) { "▶" } else { " " };
                println!("{marker} {symbol}");
            }
        }

        // "> pulse add SYMBOL"
        Add { symbol } => {
            let symbol = symbols::normalize(&symbol).context("empty symbol")?;
            match watchlist.add(&symbol)? {
                true => println!("Tracking {symbol}"),
                false => println!("{symbol} is already tracked"),
            }
        }

        // "> pulse remove SYMBOL"
        Remove { symbol } => {
            let symbol = symbols::normalize(&symbol).context("empty symbol")?;
            match watchlist.remove(&symbol)? {
                true => println!("Dropped {symbol}"),
                false => println!("{symbol} is not on the watchlist"),
            }
        }
    }

    Ok(())
}

fn non_blank(value: String, default: &str) -> String {
    match value.trim() {
        "" => default.to_string(),
        _ => value,
    }
}
