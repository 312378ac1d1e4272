use catalog_app::database;
use sqlx::PgPool;
use tracing::info;

pub(crate) async fn run(pool: &PgPool) -> Result<(), String> {
    database::migrate(pool)
        .await
        .map_err(|error| format!("failed to run migrations: {error}"))?;

    info!("migrations applied");

    println!("migrations applied");

    Ok(())
}
