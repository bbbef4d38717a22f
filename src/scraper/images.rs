use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Result, ScraperError};
use crate::scraper::text::sanitize_filename;

/// Downloads article images into the run's output directory.
pub struct ImageFetcher {
    client: Client,
    output_dir: PathBuf,
}

/// Filename derived from the first three whitespace-separated title
/// tokens, always with a `.jpg` suffix regardless of the source URL's
/// extension. Titles sharing those tokens collide and overwrite.
pub fn image_file_name(title: &str) -> String {
    let prefix: Vec<&str> = title.split_whitespace().take(3).collect();
    format!("{}.jpg", sanitize_filename(&prefix.join("_")))
}

impl ImageFetcher {
    pub fn new(output_dir: PathBuf) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { client, output_dir }
    }

    /// Fetch `url` and store it under the title-derived filename.
    /// Returns the filename on success.
    pub async fn fetch(&self, url: &str, title: &str) -> Result<String> {
        let image_name = image_file_name(title);
        let image_path = self.output_dir.join(&image_name);
        debug!("Downloading image to {:?}", image_path);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScraperError::DownloadImageFailed(format!("{}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(ScraperError::DownloadImageFailed(format!(
                "{}: HTTP {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ScraperError::DownloadImageFailed(format!("{}: {}", url, e)))?;

        if let Some(parent) = image_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ScraperError::DownloadImageFailed(e.to_string()))?;
        }
        tokio::fs::write(&image_path, &bytes)
            .await
            .map_err(|e| ScraperError::DownloadImageFailed(e.to_string()))?;

        info!("Downloaded image: {} from {}", image_name, url);
        Ok(image_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_uses_first_three_tokens() {
        assert_eq!(
            image_file_name("Markets rally after rate cut"),
            "Markets_rally_after.jpg"
        );
        assert_eq!(image_file_name("One two"), "One_two.jpg");
        assert_eq!(image_file_name(""), ".jpg");
    }

    #[test]
    fn test_file_name_sanitizes_reserved_characters() {
        assert_eq!(image_file_name("What? Why: How/"), "What__Why__How_.jpg");
    }

    #[test]
    fn test_file_name_collision_on_shared_prefix() {
        // identical first three tokens silently share one file
        let a = image_file_name("Breaking news today: markets up");
        let b = image_file_name("Breaking news today: storms ahead");
        assert_eq!(a, b);
    }
}
