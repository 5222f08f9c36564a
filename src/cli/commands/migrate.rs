use crate::config::AppConfig;
use crate::database::DatabaseManager;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    let storage = super::postgres_storage(&config).await?;
    DatabaseManager::close(storage.pool()).await;
    println!("Migrations are up to date");
    Ok(())
}
