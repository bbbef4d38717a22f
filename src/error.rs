use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScraperError>;

/// Exception class reported to the work item system for every failure.
pub const EXCEPTION_TYPE: &str = "APPLICATION";

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Failed to open site: {0}")]
    OpenSiteFailed(String),

    #[error("Search failed: {0}")]
    SearchNewsFailed(String),

    #[error("Filter/sort failed: {0}")]
    FilterSortFailed(String),

    #[error("Load more results failed: {0}")]
    LoadMoreResultsFailed(String),

    #[error("Error processing article: {0}")]
    ArticleProcessing(String),

    #[error("Failed to extract news: {0}")]
    ExtractNewsFailed(String),

    #[error("Failed to download image: {0}")]
    DownloadImageFailed(String),

    #[error("Failed to save to Excel: {0}")]
    SaveToExcelFailed(String),

    #[error("Failed to close browser: {0}")]
    CloseBrowserFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Navigation error: {0}")]
    Navigation(String),

    #[error("Data processing error: {0}")]
    DataProcessing(String),

    /// Configuration is loaded before any work item starts, so this
    /// code never appears in a work-item failure report.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Uncaught error: {0}")]
    Uncaught(String),
}

impl ScraperError {
    /// Error code string reported alongside the failed work item.
    ///
    /// The code is fixed by the variant chosen at the point of failure,
    /// never inferred from the message text.
    pub fn code(&self) -> &'static str {
        match self {
            ScraperError::OpenSiteFailed(_) => "OPEN_SITE_FAILED",
            ScraperError::SearchNewsFailed(_) => "SEARCH_NEWS_FAILED",
            ScraperError::FilterSortFailed(_) => "FILTER_SORT_FAILED",
            ScraperError::LoadMoreResultsFailed(_) => "LOAD_MORE_RESULTS_FAILED",
            ScraperError::ArticleProcessing(_) => "ARTICLE_PROCESSING_ERROR",
            ScraperError::ExtractNewsFailed(_) => "EXTRACT_NEWS_FAILED",
            ScraperError::DownloadImageFailed(_) => "DOWNLOAD_IMAGE_FAILED",
            ScraperError::SaveToExcelFailed(_) => "SAVE_TO_EXCEL_FAILED",
            ScraperError::CloseBrowserFailed(_) => "CLOSE_BROWSER_FAILED",
            ScraperError::Network(_) => "NETWORK_ERROR",
            ScraperError::Navigation(_) => "NAVIGATION_ERROR",
            ScraperError::DataProcessing(_) => "DATA_PROCESSING_ERROR",
            ScraperError::Config(_) => "CONFIG_ERROR",
            ScraperError::Uncaught(_) => "UNCAUGHT_ERROR",
        }
    }
}

// Conversion implementations for common error types
impl From<std::io::Error> for ScraperError {
    fn from(err: std::io::Error) -> Self {
        ScraperError::DataProcessing(err.to_string())
    }
}

impl From<serde_json::Error> for ScraperError {
    fn from(err: serde_json::Error) -> Self {
        ScraperError::DataProcessing(err.to_string())
    }
}

impl From<toml::de::Error> for ScraperError {
    fn from(err: toml::de::Error) -> Self {
        ScraperError::Config(err.to_string())
    }
}

impl From<reqwest::Error> for ScraperError {
    fn from(err: reqwest::Error) -> Self {
        ScraperError::Network(err.to_string())
    }
}

impl From<chromiumoxide::error::CdpError> for ScraperError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        ScraperError::Navigation(err.to_string())
    }
}
