use chromiumoxide::element::Element;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::browser::BrowserSession;
use crate::error::{Result, ScraperError};
use crate::scraper::article::SearchConfig;
use crate::scraper::images::ImageFetcher;

// Al Jazeera selectors
pub(crate) const COOKIE_ACCEPT: &str = "#onetrust-accept-btn-handler";
pub(crate) const SEARCH_TRIGGER: &str = "div.site-header__search-trigger > button.no-styles-button";
pub(crate) const BURGER_MENU: &str = "button.site-header__menu-trigger";
pub(crate) const SEARCH_INPUT: &str = "input.search-bar__input";
pub(crate) const ADS_CLOSE: &str = "button.ads__close-button";
pub(crate) const SORT_SELECT: &str = "#search-sort-option";
pub(crate) const RESULT_CARD: &str = "article.gc.u-clickable-card";
pub(crate) const CARD_LINK: &str = "a.u-clickable-card__link";
pub(crate) const CARD_DATE: &str = ".screen-reader-text";
pub(crate) const CARD_EXCERPT: &str = ".gc__excerpt";
pub(crate) const CARD_IMAGE: &str = "img.gc__image";

/// Run-scoped context for one work item: owns the browser session, the
/// search parameters and the image fetcher. Nothing here outlives a run.
pub struct NewsScraper {
    pub(crate) session: BrowserSession,
    pub(crate) config: SearchConfig,
    base_url: String,
    pub(crate) images: ImageFetcher,
}

impl NewsScraper {
    pub fn new(
        session: BrowserSession,
        config: SearchConfig,
        base_url: String,
        output_dir: PathBuf,
    ) -> Self {
        let images = ImageFetcher::new(output_dir);
        Self {
            session,
            config,
            base_url,
            images,
        }
    }

    pub async fn open_site(&self) -> Result<()> {
        self.session
            .goto(&self.base_url)
            .await
            .map_err(|e| ScraperError::OpenSiteFailed(format!("{}: {}", self.base_url, e)))?;
        info!("Opened site: {}", self.base_url);
        Ok(())
    }

    /// Accept the cookie consent banner if it shows up. Its absence is
    /// normal on repeat visits and never an error.
    pub async fn dismiss_cookie_banner(&self) {
        match self.session.click_when_ready(COOKIE_ACCEPT).await {
            Ok(()) => info!("Closed cookie consent banner"),
            Err(_) => info!("Cookie consent banner did not appear or was not interactable"),
        }
    }

    /// Open the search input, falling back to the burger menu when the
    /// header trigger is not present (mobile-width layout).
    pub async fn initiate_search(&self) -> Result<()> {
        if self.session.click_when_ready(SEARCH_TRIGGER).await.is_ok() {
            info!("Clicked search button");
            return Ok(());
        }

        self.session
            .click_when_ready(BURGER_MENU)
            .await
            .map_err(|e| ScraperError::SearchNewsFailed(format!("Search trigger unavailable: {}", e)))?;
        info!("Opened burger menu");

        self.session
            .click_when_ready(SEARCH_INPUT)
            .await
            .map_err(|e| {
                ScraperError::SearchNewsFailed(format!(
                    "Search box not found after opening burger menu: {}",
                    e
                ))
            })?;
        info!("Clicked search box inside burger menu");
        Ok(())
    }

    /// Type the phrase, submit, then get overlay ads out of the way so
    /// they cannot intercept later clicks.
    pub async fn search_news(&self) -> Result<()> {
        let search_box = self
            .session
            .wait_for(SEARCH_INPUT)
            .await
            .map_err(|e| ScraperError::SearchNewsFailed(format!("Search box not found: {}", e)))?;

        self.session
            .type_into(&search_box, &self.config.search_phrase)
            .await
            .map_err(|e| ScraperError::SearchNewsFailed(e.to_string()))?;
        self.session
            .press_enter(&search_box)
            .await
            .map_err(|e| ScraperError::SearchNewsFailed(e.to_string()))?;

        self.hide_ads().await;

        info!("Searched news with phrase: {}", self.config.search_phrase);
        Ok(())
    }

    // best effort only: the ads banner is not always present
    async fn hide_ads(&self) {
        if self.session.click_when_ready(ADS_CLOSE).await.is_ok() {
            info!("Closed ads banner");
        }
        let hide_script = r#"
            (() => {
                const ads = document.querySelector('.container--ads');
                if (ads) { ads.style.visibility = 'hidden'; return true; }
                return false;
            })()
        "#;
        match self.session.evaluate::<bool>(hide_script).await {
            Ok(true) => info!("Ads container hidden"),
            Ok(false) => {}
            Err(e) => warn!("Failed to hide ads container: {}", e),
        }
    }

    /// Pick the configured sort option from the results dropdown by its
    /// visible text, dispatching a change event so the page re-sorts.
    pub async fn filter_and_sort(&self) -> Result<()> {
        self.session
            .wait_for(SORT_SELECT)
            .await
            .map_err(|e| ScraperError::FilterSortFailed(format!("Sort element not found: {}", e)))?;

        let select_script = format!(
            r#"
            (() => {{
                const select = document.querySelector('{selector}');
                if (!select) return false;
                const wanted = {text};
                const option = Array.from(select.options)
                    .find(o => o.textContent.trim() === wanted);
                if (!option) return false;
                select.value = option.value;
                select.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()
            "#,
            selector = SORT_SELECT,
            text = serde_json::to_string(&self.config.sort_by)
                .map_err(|e| ScraperError::FilterSortFailed(e.to_string()))?,
        );

        let selected = self
            .session
            .evaluate::<bool>(&select_script)
            .await
            .map_err(|e| ScraperError::FilterSortFailed(e.to_string()))?;
        if !selected {
            return Err(ScraperError::FilterSortFailed(format!(
                "Sort option '{}' not present in dropdown",
                self.config.sort_by
            )));
        }

        info!("Sorted results by {}", self.config.sort_by);
        Ok(())
    }

    /// Fresh handles to every result card currently in the document.
    /// The page is live and re-renders, so handles are never cached.
    pub(crate) async fn list_visible_entries(&self) -> Result<Vec<Element>> {
        self.session.find_all(RESULT_CARD).await
    }

    pub async fn close(self) -> Result<()> {
        self.session.close().await
    }
}
