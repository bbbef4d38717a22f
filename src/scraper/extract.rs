use chromiumoxide::element::Element;
use tracing::{error, info, warn};

use crate::error::{Result, ScraperError};
use crate::scraper::article::{ArticleRecord, SearchConfig, NOT_AVAILABLE};
use crate::scraper::site::{NewsScraper, CARD_DATE, CARD_EXCERPT, CARD_IMAGE, CARD_LINK};
use crate::scraper::text::{contains_money, count_occurrences};

/// Result of one extraction pass: the records plus the per-entry
/// failures that were swallowed to keep the pass going.
pub struct Extraction {
    pub records: Vec<ArticleRecord>,
    pub errors: Vec<ScraperError>,
}

/// Raw field texts pulled from one result card, before shaping into a
/// record. Title is required; everything else may be missing.
#[derive(Debug, Clone)]
pub(crate) struct RawEntry {
    pub title: String,
    pub url: String,
    pub date: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// The loaded result listing as the extractor sees it. Entries are
/// re-resolved by index on every read because the document is live.
#[allow(async_fn_in_trait)]
pub(crate) trait EntrySource {
    async fn entry_count(&self) -> Result<usize>;

    /// Fresh read of the entry at `index`; `None` when it vanished
    /// between pagination and extraction.
    async fn read_entry(&self, index: usize) -> Result<Option<RawEntry>>;

    /// Download the entry's image, returning the stored filename.
    async fn fetch_image(&self, url: &str, title: &str) -> Result<String>;
}

/// Walk the loaded entries in DOM order and shape them into records,
/// stopping once `max_results` records exist. A bad entry is logged
/// and skipped; it never takes the rest of the pass down with it.
pub(crate) async fn extract_with<S: EntrySource>(
    source: &S,
    config: &SearchConfig,
) -> Result<Extraction> {
    let total_loaded = source
        .entry_count()
        .await
        .map_err(|e| ScraperError::ExtractNewsFailed(e.to_string()))?;

    let mut records = Vec::new();
    let mut errors = Vec::new();

    for index in 0..total_loaded {
        if records.len() >= config.max_results {
            break;
        }

        let raw = match source.read_entry(index).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                // entry disappeared between pagination and extraction
                warn!("Result entry {} no longer present, skipping", index);
                continue;
            }
            Err(e) => {
                let entry_err = ScraperError::ArticleProcessing(e.to_string());
                error!("Error processing article {}: {}", index, e);
                errors.push(entry_err);
                continue;
            }
        };

        match shape_record(source, config, raw, &mut errors).await {
            Ok(record) => {
                info!(
                    "Extracted news: {} - {} - {:.50}...",
                    record.title, record.date, record.description
                );
                records.push(record);
            }
            Err(e) => {
                error!("Error processing article {}: {}", index, e);
                errors.push(e);
            }
        }
    }

    Ok(Extraction { records, errors })
}

/// Turn one raw entry into a record: enforce the required title, fill
/// sentinels, fetch the image, run the text classifiers.
async fn shape_record<S: EntrySource>(
    source: &S,
    config: &SearchConfig,
    raw: RawEntry,
    errors: &mut Vec<ScraperError>,
) -> std::result::Result<ArticleRecord, ScraperError> {
    let title = raw.title.trim().to_string();
    if title.is_empty() {
        return Err(ScraperError::ArticleProcessing(
            "title element missing or empty".to_string(),
        ));
    }

    let date = non_empty_or_sentinel(raw.date);
    let description = non_empty_or_sentinel(raw.description);

    // image is optional: a missing element or failed download degrades
    // to the sentinel, with download failures still reported
    let image_name = match raw.image_url {
        Some(ref url) if !url.is_empty() => match source.fetch_image(url, &title).await {
            Ok(name) => name,
            Err(e) => {
                error!("{}", e);
                errors.push(e);
                NOT_AVAILABLE.to_string()
            }
        },
        _ => {
            warn!("No image found for this article");
            NOT_AVAILABLE.to_string()
        }
    };

    let search_phrase_count = count_occurrences(&title, &config.search_phrase)
        + count_occurrences(&description, &config.search_phrase);
    let money = contains_money(&format!("{} {}", title, description));

    Ok(ArticleRecord {
        title,
        date,
        description,
        image_name,
        search_phrase_count,
        contains_money: money,
        news_url: raw.url,
    })
}

fn non_empty_or_sentinel(value: Option<String>) -> String {
    match value {
        Some(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

impl NewsScraper {
    pub async fn extract_articles(&self) -> Result<Extraction> {
        extract_with(self, &self.config).await
    }
}

impl EntrySource for NewsScraper {
    async fn entry_count(&self) -> Result<usize> {
        Ok(self.list_visible_entries().await?.len())
    }

    async fn read_entry(&self, index: usize) -> Result<Option<RawEntry>> {
        let entries = self.list_visible_entries().await?;
        let entry = match entries.get(index) {
            Some(entry) => entry,
            None => return Ok(None),
        };

        // title link is the one required sub-element
        let title_element = entry.find_element(CARD_LINK).await.map_err(|e| {
            ScraperError::ArticleProcessing(format!("title element missing: {}", e))
        })?;
        let _ = title_element.scroll_into_view().await;

        let title = title_element
            .inner_text()
            .await?
            .unwrap_or_default()
            .trim()
            .to_string();
        let url = title_element.attribute("href").await?.unwrap_or_default();

        let date = child_text(entry, CARD_DATE).await;
        let description = child_text(entry, CARD_EXCERPT).await;
        let image_url = self.card_image_url(entry).await;

        Ok(Some(RawEntry {
            title,
            url,
            date,
            description,
            image_url,
        }))
    }

    async fn fetch_image(&self, url: &str, title: &str) -> Result<String> {
        self.images.fetch(url, title).await
    }
}

impl NewsScraper {
    /// Bounded wait for the card's image to render, then read its src.
    async fn card_image_url(&self, entry: &Element) -> Option<String> {
        let image_element = self.session.wait_for_child(entry, CARD_IMAGE).await.ok()?;
        image_element.attribute("src").await.ok().flatten()
    }
}

async fn child_text(entry: &Element, selector: &str) -> Option<String> {
    let element = entry.find_element(selector).await.ok()?;
    element.inner_text().await.ok().flatten()
}
