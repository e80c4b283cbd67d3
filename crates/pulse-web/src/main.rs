use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use log::info;
use pulse_web::{
    config::Config,
    upstream::{Upstream, Yahoo},
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let upstream: Arc<dyn Upstream> = Arc::new(Yahoo::new(&config)?);
    let upstream = web::Data::from(upstream);

    // run server
    info!("Listening on http://{}", config.bind);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(upstream.clone())
            .configure(pulse_web::routes)
    })
    .bind(&config.bind)?
    .run()
    .await?;

    Ok(())
}
