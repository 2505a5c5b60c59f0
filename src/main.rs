use booking_service::{app, config::AppConfig, db, state::AppState, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    telemetry::init(&config.log)?;

    let pool = db::connect_with_retry(&config.database).await?;
    db::run_migrations(&pool).await?;

    let state = AppState::init(&config, pool)?;
    let app = app::build_app(state);

    app::serve(app, config.listen_addr()?).await
}
