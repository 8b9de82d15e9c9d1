use actix_web::{web, App, HttpServer};

use dsst_etl::app::{AppError, AppState};
use dsst_etl::model::Config;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    dsst_etl::init_tracing();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    let state = web::Data::new(AppState::from_config(config)?);

    tracing::info!("Starting ODDPub service on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(dsst_etl::api::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
