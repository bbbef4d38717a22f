use std::path::PathBuf;

use aljazeera_news_scraper::config::FileConfigManager;
use aljazeera_news_scraper::scraper;

#[tokio::main]
async fn main() -> aljazeera_news_scraper::Result<()> {
    tracing_subscriber::fmt::init();

    let config_manager = FileConfigManager::new(PathBuf::from("config.toml"));
    let config = config_manager.load_config()?;

    tracing::info!("Starting Al Jazeera news scraper");

    if let Err(e) = std::fs::create_dir_all(&config.output.directory) {
        tracing::error!("Failed to create output directory: {}", e);
    } else {
        tracing::info!(
            "Created output directory: {}",
            config.output.directory.display()
        );
    }

    scraper::process_work_items(&config).await?;

    tracing::info!("Al Jazeera news scraper finished.");
    Ok(())
}
