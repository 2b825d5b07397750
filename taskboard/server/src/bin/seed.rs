use migration::MigratorTrait;
use sea_orm::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let config = taskboard_server::config::Config::from_env()?;

    let db = Database::connect(&config.db_url).await?;
    migration::Migrator::up(&db, None).await?;

    let inserted = taskboard_server::seed::reseed(&db).await?;
    tracing::info!("Database seeded with {} tasks", inserted);
    Ok(())
}
