use crate::error::ApiError;
use crate::upstream::Upstream;
use actix_web::{get, web, HttpResponse};
use log::debug;
use pulse_common::{symbols, ChartSeries, ErrorBody, DEFAULT_INTERVAL, DEFAULT_RANGE};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ChartQuery {
    /// Ticker symbol, e.g., `NVDA`
    symbol: Option<String>,
    /// Yahoo range, e.g., `1d`, `5d`, `1mo` (default `1d`)
    range: Option<String>,
    /// Yahoo interval, e.g., `1m`, `15m`, `1d` (default `1m`)
    interval: Option<String>,
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Intraday price series of one ticker symbol
///
/// ```json
/// {
///     "symbol": "NVDA",
///     "points": [
///         { "timestamp": 1705674600000, "price": 594.91 },
///         // ...
///     ]
/// }
/// ```
#[utoipa::path(
    get,
    path = "/api/chart",
    params(ChartQuery),
    responses(
        (status = 200, description = "Price points in upstream order, gaps removed", body = ChartSeries, content_type = "application/json"),
        (status = 400, description = "Missing `symbol`", body = ErrorBody),
        (status = 404, description = "Yahoo returned no series", body = ErrorBody),
        (status = 500, description = "Yahoo request failed", body = ErrorBody)
    )
)]
#[get("/api/chart")]
pub async fn chart(
    query: web::Query<ChartQuery>,
    upstream: web::Data<dyn Upstream>,
) -> Result<HttpResponse, ApiError> {
    let ChartQuery {
        symbol,
        range,
        interval,
    } = query.into_inner();

    let symbol = symbol
        .as_deref()
        .and_then(symbols::normalize)
        .ok_or(ApiError::Validation("Missing symbol parameter"))?;
    let range = or_default(range, DEFAULT_RANGE);
    let interval = or_default(interval, DEFAULT_INTERVAL);

    let result = upstream
        .chart(&symbol, &range, &interval)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch stock chart", e))?
        .into_result()
        .ok_or(ApiError::NotFound("No chart data available"))?;

    let points = result.points();
    debug!("[{symbol}] {} chart points ({range}/{interval})", points.len());

    Ok(HttpResponse::Ok().json(ChartSeries { symbol, points }))
}
