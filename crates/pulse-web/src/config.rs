use anyhow::Context;
use dotenv::var;
use reqwest::Url;

const YAHOO_QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";
const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Server settings, read from the environment (and `.env`, if present).
///
/// | variable          | default                    |
/// |-------------------|----------------------------|
/// | `PULSE_BIND`      | `127.0.0.1:8080`           |
/// | `USER_AGENT`      | `pulse-markets/<version>`  |
/// | `YAHOO_QUOTE_URL` | Yahoo v7 quote endpoint    |
/// | `YAHOO_CHART_URL` | Yahoo v8 chart endpoint    |
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub user_agent: String,
    pub quote_url: Url,
    pub chart_url: Url,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            bind: var("PULSE_BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string()),
            user_agent: var("USER_AGENT")
                .unwrap_or_else(|_| format!("pulse-markets/{}", env!("CARGO_PKG_VERSION"))),
            quote_url: url_var("YAHOO_QUOTE_URL", YAHOO_QUOTE_URL)?,
            chart_url: url_var("YAHOO_CHART_URL", YAHOO_CHART_URL)?,
        })
    }
}

fn url_var(key: &str, default: &str) -> anyhow::Result<Url> {
    let raw = var(key).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).with_context(|| format!("{key} is not a valid url: {raw}"))
}
