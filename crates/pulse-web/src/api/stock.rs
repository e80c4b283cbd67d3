use crate::error::ApiError;
use crate::upstream::Upstream;
use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use log::debug;
use pulse_common::{symbols, ErrorBody, QuoteList};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuotesQuery {
    /// Comma-separated ticker symbols, e.g., `AAPL,MSFT`
    symbols: Option<String>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Latest quotes for a set of ticker symbols
///
/// Symbols are trimmed, uppercased & de-duplicated before going upstream.
///
/// ```json
/// {
///     "quotes": [
///         {
///             "symbol": "AAPL",
///             "shortName": "Apple Inc.",
///             "price": 189.84,
///             ...
///         }
///     ]
/// }
/// ```
#[utoipa::path(
    get,
    path = "/api/stocks",
    params(QuotesQuery),
    responses(
        (status = 200, description = "Normalized quotes, one per symbol Yahoo knows about", body = QuoteList, content_type = "application/json"),
        (status = 400, description = "Missing or empty `symbols`", body = ErrorBody),
        (status = 500, description = "Yahoo request failed", body = ErrorBody)
    )
)]
#[get("/api/stocks")]
pub async fn quotes(
    query: web::Query<QuotesQuery>,
    upstream: web::Data<dyn Upstream>,
) -> Result<HttpResponse, ApiError> {
    let raw = query
        .into_inner()
        .symbols
        .filter(|raw| !raw.is_empty())
        .ok_or(ApiError::Validation("Missing symbols parameter"))?;

    let symbols = symbols::parse_list(&raw);
    if symbols.is_empty() {
        return Err(ApiError::Validation("No valid symbols provided"));
    }

    let quotes = upstream
        .quotes(&symbols)
        .await
        .map_err(|e| ApiError::upstream("Failed to fetch stock quotes", e))?
        .normalize(Utc::now());
    debug!("{} quotes for {}", quotes.len(), symbols.join(","));

    Ok(HttpResponse::Ok().json(QuoteList { quotes }))
}
