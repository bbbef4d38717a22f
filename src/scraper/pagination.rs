use std::time::{Duration, Instant};
use tracing::info;

use crate::error::{Result, ScraperError};
use crate::scraper::site::NewsScraper;

const SHOW_MORE: &str = "button.show-more-button";

/// The result listing as the paginator sees it: a count of visible
/// entries and a "load more" control that may run out.
#[allow(async_fn_in_trait)]
pub trait ResultSupply {
    async fn visible_count(&self) -> Result<usize>;

    /// Trigger the next page load. `Ok(false)` means the control is gone
    /// or stayed un-interactable for the bounded wait: supply exhausted.
    async fn load_more(&self) -> Result<bool>;
}

/// Keep loading until at least `max_results` entries are present or the
/// supply runs out. Returns how many entries ended up loaded.
///
/// After each click the count is re-polled until it grows or
/// `wait_timeout` elapses; new cards arrive asynchronously, so an
/// unchanged count right after a click only means the fetch is still in
/// flight. A count that never grows within the bounded wait is treated
/// as exhausted supply, which also guarantees termination against a
/// page that accepts clicks but stops rendering.
pub async fn ensure_loaded<S: ResultSupply>(
    supply: &S,
    max_results: usize,
    wait_timeout: Duration,
    poll_interval: Duration,
) -> Result<usize> {
    let mut loaded = supply.visible_count().await?;
    loop {
        if loaded >= max_results {
            info!("Total articles loaded: {}", loaded);
            return Ok(loaded);
        }

        if !supply.load_more().await? {
            info!("No more articles to load or 'Show more' button not found");
            return Ok(loaded);
        }
        info!("Clicked 'Show more' button, total loaded: {}", loaded);

        match wait_for_growth(supply, loaded, wait_timeout, poll_interval).await? {
            Some(grown) => loaded = grown,
            None => {
                info!("Result count stuck at {}, treating supply as exhausted", loaded);
                return Ok(loaded);
            }
        }
    }
}

/// Bounded wait for the visible count to exceed `previous`. `None` when
/// the wait elapses without growth.
async fn wait_for_growth<S: ResultSupply>(
    supply: &S,
    previous: usize,
    wait_timeout: Duration,
    poll_interval: Duration,
) -> Result<Option<usize>> {
    let deadline = Instant::now() + wait_timeout;
    loop {
        let count = supply.visible_count().await?;
        if count > previous {
            return Ok(Some(count));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        tokio::time::sleep(poll_interval).await;
    }
}

impl ResultSupply for NewsScraper {
    async fn visible_count(&self) -> Result<usize> {
        Ok(self.list_visible_entries().await?.len())
    }

    async fn load_more(&self) -> Result<bool> {
        match self.session.click_when_ready(SHOW_MORE).await {
            Ok(()) => Ok(true),
            // bounded wait ran out: the site has nothing more to give
            Err(_) => Ok(false),
        }
    }
}

impl NewsScraper {
    /// Paginate until the configured target or the site's supply is
    /// exhausted. Only unexpected browser failures are errors here.
    pub async fn ensure_loaded(&self) -> Result<usize> {
        ensure_loaded(
            self,
            self.config.max_results,
            self.session.wait_timeout(),
            self.session.poll_interval(),
        )
        .await
        .map_err(|e| ScraperError::LoadMoreResultsFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const WAIT: Duration = Duration::from_millis(200);
    const POLL: Duration = Duration::from_millis(10);

    /// Fake listing that grows by `page_size` per click, up to `total`.
    struct FakeSupply {
        loaded: RefCell<usize>,
        page_size: usize,
        total: usize,
    }

    impl FakeSupply {
        fn new(initial: usize, page_size: usize, total: usize) -> Self {
            Self {
                loaded: RefCell::new(initial),
                page_size,
                total,
            }
        }
    }

    impl ResultSupply for FakeSupply {
        async fn visible_count(&self) -> Result<usize> {
            Ok(*self.loaded.borrow())
        }

        async fn load_more(&self) -> Result<bool> {
            let mut loaded = self.loaded.borrow_mut();
            if *loaded >= self.total {
                return Ok(false);
            }
            *loaded = (*loaded + self.page_size).min(self.total);
            Ok(true)
        }
    }

    /// Fake listing where a click's new cards only become visible a
    /// couple of count polls later, like an AJAX fetch still in flight.
    struct LaggedSupply {
        loaded: RefCell<usize>,
        pending: RefCell<usize>,
        stale_polls: RefCell<u32>,
        page_size: usize,
        total: usize,
    }

    impl LaggedSupply {
        fn new(initial: usize, page_size: usize, total: usize) -> Self {
            Self {
                loaded: RefCell::new(initial),
                pending: RefCell::new(0),
                stale_polls: RefCell::new(0),
                page_size,
                total,
            }
        }
    }

    impl ResultSupply for LaggedSupply {
        async fn visible_count(&self) -> Result<usize> {
            let mut stale = self.stale_polls.borrow_mut();
            if *stale > 0 {
                *stale -= 1;
            } else {
                let mut pending = self.pending.borrow_mut();
                *self.loaded.borrow_mut() += *pending;
                *pending = 0;
            }
            Ok(*self.loaded.borrow())
        }

        async fn load_more(&self) -> Result<bool> {
            if *self.loaded.borrow() + *self.pending.borrow() >= self.total {
                return Ok(false);
            }
            *self.pending.borrow_mut() += self.page_size;
            // the next two counts still see the pre-click list
            *self.stale_polls.borrow_mut() = 2;
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_stops_when_target_reached() {
        let supply = FakeSupply::new(10, 10, 1000);
        let loaded = ensure_loaded(&supply, 25, WAIT, POLL).await.unwrap();
        assert!(loaded >= 25);
        assert_eq!(loaded, 30);
    }

    #[tokio::test]
    async fn test_stops_when_supply_exhausted() {
        let supply = FakeSupply::new(10, 10, 12);
        let loaded = ensure_loaded(&supply, 50, WAIT, POLL).await.unwrap();
        assert_eq!(loaded, 12);
    }

    #[tokio::test]
    async fn test_target_zero_returns_immediately() {
        let supply = FakeSupply::new(10, 10, 1000);
        let loaded = ensure_loaded(&supply, 0, WAIT, POLL).await.unwrap();
        assert_eq!(loaded, 10);
    }

    #[tokio::test]
    async fn test_waits_out_render_latency_after_click() {
        // cards from a click render late; the loop must keep polling
        // instead of declaring the supply exhausted on the first
        // unchanged count
        let supply = LaggedSupply::new(10, 10, 1000);
        let loaded = ensure_loaded(&supply, 50, WAIT, POLL).await.unwrap();
        assert!(loaded >= 50, "stopped early at {} entries", loaded);
    }

    #[tokio::test]
    async fn test_terminates_when_count_stops_growing() {
        // clicks keep "succeeding" but nothing new ever renders
        struct StuckSupply;
        impl ResultSupply for StuckSupply {
            async fn visible_count(&self) -> Result<usize> {
                Ok(7)
            }
            async fn load_more(&self) -> Result<bool> {
                Ok(true)
            }
        }
        let loaded = ensure_loaded(&StuckSupply, 50, WAIT, POLL).await.unwrap();
        assert_eq!(loaded, 7);
    }

    #[tokio::test]
    async fn test_supply_error_propagates() {
        struct BrokenSupply;
        impl ResultSupply for BrokenSupply {
            async fn visible_count(&self) -> Result<usize> {
                Err(ScraperError::Navigation("tab crashed".to_string()))
            }
            async fn load_more(&self) -> Result<bool> {
                Ok(false)
            }
        }
        assert!(ensure_loaded(&BrokenSupply, 10, WAIT, POLL).await.is_err());
    }
}
