pub mod browser;
pub mod config;
pub mod error;
pub mod scraper;
pub mod storage;
pub mod workitems;

pub use browser::BrowserSession;
pub use config::Config;
pub use error::{Result, ScraperError};
pub use scraper::{ArticleRecord, NewsScraper, SearchConfig};
