use super::common_de::{finite, finite_or_zero, non_empty_str};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Output: Quote
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

/// Normalized snapshot of a symbol's current price & metadata.
///
/// ```json
/// {
///     "symbol": "AAPL",
///     "shortName": "Apple Inc.",
///     "price": 189.84,
///     "change": 1.21,
///     "changePercent": 0.64,
///     "high52Week": 199.62,
///     "low52Week": 164.08,
///     "marketCap": 2952061607936,
///     "volume": 53665607,
///     "currency": "USD",
///     "marketState": "REGULAR",
///     "lastUpdated": "2024-01-19T21:00:01.000Z"
/// }
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub short_name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    #[serde(rename = "high52Week")]
    pub high_52_week: Option<f64>,
    #[serde(rename = "low52Week")]
    pub low_52_week: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume: Option<f64>,
    pub currency: String,
    pub market_state: String,
    pub last_updated: String,
}

/// `GET /api/stocks` success body.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, ToSchema)]
pub struct QuoteList {
    pub quotes: Vec<Quote>,
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Input: Yahoo Finance (v7/finance/quote)
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Deserialize, Debug, Default)]
pub struct QuoteEnvelope {
    #[serde(rename = "quoteResponse", default)]
    pub quote_response: Option<QuoteResponse>,
}

#[derive(Deserialize, Debug, Default)]
pub struct QuoteResponse {
    // kept as raw values so that one odd record can't sink the whole payload
    #[serde(default)]
    pub result: Option<Vec<Value>>,
}

/// One upstream record; every field is optional and loosely typed.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawQuote {
    pub symbol: Option<Value>,
    pub short_name: Option<Value>,
    pub long_name: Option<Value>,
    pub regular_market_price: Option<Value>,
    pub regular_market_change: Option<Value>,
    pub regular_market_change_percent: Option<Value>,
    pub fifty_two_week_high: Option<Value>,
    pub fifty_two_week_low: Option<Value>,
    pub market_cap: Option<Value>,
    pub regular_market_volume: Option<Value>,
    pub currency: Option<Value>,
    pub market_state: Option<Value>,
    pub regular_market_time: Option<Value>,
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Normalization
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

impl QuoteEnvelope {
    /// Normalize every usable record; records without a symbol are dropped.
    pub fn normalize(self, now: DateTime<Utc>) -> Vec<Quote> {
        self.quote_response
            .and_then(|response| response.result)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<RawQuote>(record) {
                Ok(raw) => raw.normalize(now),
                Err(e) => {
                    log::debug!("skipping malformed quote record: {e}");
                    None
                }
            })
            .collect()
    }
}

impl RawQuote {
    pub fn normalize(self, now: DateTime<Utc>) -> Option<Quote> {
        let symbol = non_empty_str(self.symbol.as_ref())?.trim().to_uppercase();

        let short_name = non_empty_str(self.short_name.as_ref())
            .or_else(|| non_empty_str(self.long_name.as_ref()))
            .map(str::to_string)
            .unwrap_or_else(|| symbol.clone());

        // a market time of 0 counts as missing
        let last_updated = finite(self.regular_market_time.as_ref())
            .filter(|secs| *secs != 0.0)
            .and_then(|secs| DateTime::from_timestamp_millis((secs * 1000.0) as i64))
            .unwrap_or(now)
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        Some(Quote {
            short_name,
            price: finite_or_zero(self.regular_market_price.as_ref()),
            change: finite_or_zero(self.regular_market_change.as_ref()),
            change_percent: finite_or_zero(self.regular_market_change_percent.as_ref()),
            high_52_week: finite(self.fifty_two_week_high.as_ref()),
            low_52_week: finite(self.fifty_two_week_low.as_ref()),
            market_cap: finite(self.market_cap.as_ref()),
            volume: finite(self.regular_market_volume.as_ref()),
            currency: non_empty_str(self.currency.as_ref())
                .unwrap_or("USD")
                .to_string(),
            market_state: non_empty_str(self.market_state.as_ref())
                .unwrap_or("REGULAR")
                .to_string(),
            last_updated,
            symbol,
        })
    }
}
