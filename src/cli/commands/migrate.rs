use crate::config::AppConfig;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    let (manager, _store) = super::prepare_store(&config).await?;
    manager.close().await;
    println!("Schema is up to date");
    Ok(())
}
