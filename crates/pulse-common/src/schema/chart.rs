use super::common_de::{epoch_millis, finite};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Output: ChartPoint
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

/// One (time, price) sample of an intraday series; `timestamp` is in epoch millis.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, ToSchema)]
pub struct ChartPoint {
    pub timestamp: i64,
    pub price: f64,
}

/// `GET /api/chart` success body.
///
/// ```json
/// {
///     "symbol": "NVDA",
///     "points": [
///         { "timestamp": 1705674600000, "price": 594.91 },
///         { "timestamp": 1705674660000, "price": 595.37 }
///     ]
/// }
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, ToSchema)]
pub struct ChartSeries {
    pub symbol: String,
    pub points: Vec<ChartPoint>,
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Input: Yahoo Finance (v8/finance/chart)
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Deserialize, Debug, Default)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub chart: Option<ChartResponse>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ChartResponse {
    /// Yahoo has been seen sending `[null]` here for delisted symbols.
    #[serde(default)]
    pub result: Option<Vec<Option<ChartResult>>>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Option<Vec<Value>>,
    #[serde(default)]
    pub indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Option<Vec<Option<IndicatorQuote>>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct IndicatorQuote {
    #[serde(default)]
    pub close: Option<Vec<Value>>,
}

///////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Normalization
//
///////////////////////////////////////////////////////////////////////////////////////////////////////

impl ChartEnvelope {
    /// The first series of the response, if Yahoo sent one.
    pub fn into_result(self) -> Option<ChartResult> {
        self.chart?.result?.into_iter().next().flatten()
    }
}

impl ChartResult {
    /// Pair `timestamp[i]` with `close[i]`, keeping upstream order. Gaps in the
    /// close series (`null`s outside the trading session) are dropped.
    pub fn points(&self) -> Vec<ChartPoint> {
        let timestamps = self.timestamp.as_deref().unwrap_or_default();
        let closes = self
            .indicators
            .as_ref()
            .and_then(|indicators| indicators.quote.as_deref())
            .and_then(|quotes| quotes.first()?.as_ref())
            .and_then(|quote| quote.close.as_deref())
            .unwrap_or_default();

        timestamps
            .iter()
            .enumerate()
            .filter_map(|(i, timestamp)| {
                let price = finite(closes.get(i))?;
                Some(ChartPoint {
                    timestamp: epoch_millis(timestamp)?,
                    price,
                })
            })
            .collect()
    }
}
