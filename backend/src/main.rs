use std::sync::Arc;
use backend::{build_rocket, config::Settings, queries::PgItemStore, routes::AppState};
use shuttle_runtime::CustomError;
use sqlx::PgPool;
use tracing::info;

#[shuttle_runtime::main]
async fn rocket(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secret_store: shuttle_runtime::SecretStore,
) -> shuttle_rocket::ShuttleRocket {
    info!("🚀 Starting wishlist vote server");

    let settings = Settings::from_secrets(&secret_store).map_err(CustomError::new)?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(CustomError::new)?;

    info!("📋 Migrations complete");

    let state = AppState::new(Arc::new(PgItemStore::new(pool)), settings);

    Ok(build_rocket(state).into())
}
