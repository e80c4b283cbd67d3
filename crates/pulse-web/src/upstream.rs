use crate::config::Config;
use crate::error::UpstreamError;
use async_trait::async_trait;
use log::trace;
use pulse_common::schema::{chart::ChartEnvelope, quote::QuoteEnvelope};
use reqwest::{Client, StatusCode, Url};

/// The finance data provider behind the proxy.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Raw quote payload for `symbols` (already normalized & de-duplicated).
    async fn quotes(&self, symbols: &[String]) -> Result<QuoteEnvelope, UpstreamError>;

    /// Raw intraday series for one symbol.
    async fn chart(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<ChartEnvelope, UpstreamError>;
}

/// Yahoo! Finance, over plain HTTPS. Nothing is cached; every call is one request.
pub struct Yahoo {
    client: Client,
    quote_url: Url,
    chart_url: Url,
}

impl Yahoo {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Yahoo {
            client,
            quote_url: config.quote_url.clone(),
            chart_url: config.chart_url.clone(),
        })
    }

    /// e.g., `https://query1.finance.yahoo.com/v8/finance/chart/NVDA?range=1d&interval=1m`
    fn chart_url(&self, symbol: &str, range: &str, interval: &str) -> Result<Url, UpstreamError> {
        let mut url = self.chart_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::Url(self.chart_url.to_string()))?
            .pop_if_empty()
            .push(symbol);
        url.query_pairs_mut()
            .append_pair("range", range)
            .append_pair("interval", interval);
        Ok(url)
    }

    async fn get_json<T>(&self, url: Url) -> Result<T, UpstreamError>
    where
        T: serde::de::DeserializeOwned,
    {
        trace!("GET {url}");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        decode(status, &url, &bytes)
    }
}

/// Non-2xx is a failure whatever the body says; otherwise the body must parse as `T`.
fn decode<T>(status: StatusCode, url: &Url, bytes: &[u8]) -> Result<T, UpstreamError>
where
    T: serde::de::DeserializeOwned,
{
    if !status.is_success() {
        return Err(UpstreamError::Status {
            status,
            url: url.to_string(),
        });
    }
    Ok(serde_json::from_slice::<T>(bytes)?)
}

#[async_trait]
impl Upstream for Yahoo {
    async fn quotes(&self, symbols: &[String]) -> Result<QuoteEnvelope, UpstreamError> {
        let mut url = self.quote_url.clone();
        url.query_pairs_mut()
            .append_pair("symbols", &symbols.join(","));
        self.get_json(url).await
    }

    async fn chart(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<ChartEnvelope, UpstreamError> {
        let url = self.chart_url(symbol, range, interval)?;
        self.get_json(url).await
    }
}
