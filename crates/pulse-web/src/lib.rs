pub mod api;
pub mod config;
pub mod error;
pub mod upstream;

use actix_web::{error::QueryPayloadError, get, web, HttpRequest, HttpResponse, Responder};
use error::ApiError;
use pulse_common::{ChartPoint, ChartSeries, ErrorBody, Quote, QuoteList};
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

#[derive(OpenApi)]
#[openapi(
    paths(api::stock::quotes, api::chart::chart),
    components(schemas(Quote, QuoteList, ChartPoint, ChartSeries, ErrorBody))
)]
pub struct ApiDoc;

#[get("/openapi.json")]
async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

fn query_error(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    log::debug!("rejected query {:?}: {err}", req.query_string());
    ApiError::Validation("Invalid query string").into()
}

/// Register every route; the `Upstream` is expected as `web::Data<dyn Upstream>`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error))
        // api endpoints
        .service(api::stock::quotes)
        .service(api::chart::chart)
        // api documentation
        .service(openapi_json)
        .service(Redoc::with_url("/redoc", ApiDoc::openapi()));
}
