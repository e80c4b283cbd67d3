use anyhow::{anyhow, Result};
use pulse_common::{ChartSeries, ErrorBody, Quote, QuoteList};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::future::Future;

/// Calls to the Pulse proxy (`pulse-web`), as add-on methods for [`reqwest::Client`].
///
/// [`reqwest::Client`]: https://docs.rs/reqwest/latest/reqwest/struct.Client.html
pub trait PulseApiExt {
    /// `GET {base}/api/stocks?symbols=A,B,C`
    fn fetch_quotes(
        &self,
        base: &Url,
        symbols: &[String],
    ) -> impl Future<Output = Result<Vec<Quote>>> + Send;

    /// `GET {base}/api/chart?symbol=S&range=R&interval=I`
    fn fetch_chart(
        &self,
        base: &Url,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> impl Future<Output = Result<ChartSeries>> + Send;
}

impl PulseApiExt for Client {
    async fn fetch_quotes(&self, base: &Url, symbols: &[String]) -> Result<Vec<Quote>> {
        let url = quotes_url(base, symbols)?;
        let response = self.get(url).send().await?;
        let list: QuoteList = read_json(response).await?;
        Ok(list.quotes)
    }

    async fn fetch_chart(
        &self,
        base: &Url,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<ChartSeries> {
        let url = chart_url(base, symbol, range, interval)?;
        let response = self.get(url).send().await?;
        read_json(response).await
    }
}

pub(crate) fn quotes_url(base: &Url, symbols: &[String]) -> Result<Url> {
    let mut url = base.join("/api/stocks")?;
    url.query_pairs_mut()
        .append_pair("symbols", &symbols.join(","));
    Ok(url)
}

pub(crate) fn chart_url(base: &Url, symbol: &str, range: &str, interval: &str) -> Result<Url> {
    let mut url = base.join("/api/chart")?;
    url.query_pairs_mut()
        .append_pair("symbol", symbol)
        .append_pair("range", range)
        .append_pair("interval", interval);
    Ok(url)
}

/// Decode a success body, or turn the proxy's `{"error": ...}` into an error.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if status.is_success() {
        return Ok(serde_json::from_slice(&bytes)?);
    }
    match serde_json::from_slice::<ErrorBody>(&bytes) {
        Ok(body) => Err(anyhow!("{} ({status})", body.error)),
        Err(_) => Err(anyhow!("request failed with status {status}")),
    }
}
