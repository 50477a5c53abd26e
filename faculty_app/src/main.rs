use faculty::{config::AppConfig, db, http, logging, util};
use faculty_schedule::{
    api::{self, AppState},
    infra,
};

#[tokio::main]
async fn main() -> faculty::Result<()> {
    let config = AppConfig::new(util::config_dir())?;
    logging::init_tracing(&config.logging)?;
    tracing::info!(?config, "app config loaded");

    let pool = db::connect(&config.database).await?;
    infra::init_schema(&mut db::Handle::Pool(pool.clone()))
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "schema bootstrap failed");
        })?;

    let router = api::router(AppState::new(pool));
    http::run(router, &config.server).await
}
