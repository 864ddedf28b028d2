use crate::browser::{BrowserSession, SessionFactory};
use crate::extract::parse_price;
use crate::retry::{Attempt, retry_once};
use async_trait::async_trait;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};
use url::Url;
use vyapyaar_common::ScrapeOutcome;
use vyapyaar_config::{ConfigError, ScraperConfig, SettleStrategy};
use vyapyaar_drivers::DriverError;
use vyapyaar_drivers::vyapyaar_browser::page::ENTER_KEY;

/// Anything that can turn a product name into a [`ScrapeOutcome`].
///
/// Implementations never fail: every error is folded into the outcome.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn scrape(&self, product_name: &str) -> ScrapeOutcome;
}

#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Driver(#[from] DriverError),

    #[error("could not build search URL: {0}")]
    SearchUrl(#[from] ConfigError),
}

/// Searches the configured storefront and summarises the prices it shows.
pub struct PriceExtractor<F> {
    factory: F,
    config: ScraperConfig,
    site_url: Url,
}

impl<F: SessionFactory> PriceExtractor<F> {
    pub fn new(factory: F, config: ScraperConfig) -> Result<Self, ConfigError> {
        let site_url = config.site_url()?;
        Ok(Self {
            factory,
            config,
            site_url,
        })
    }

    /// Run one lookup end to end in a fresh browser session.
    ///
    /// The session is closed exactly once whatever happens; close failures
    /// are logged and dropped.
    pub async fn extract(&self, product_name: &str) -> ScrapeOutcome {
        let session = match self.factory.new_session().await {
            Ok(session) => session,
            Err(err) => {
                warn!(target: "scrape", error = %err, "could not open browser session");
                return ScrapeOutcome::failed(err.to_string());
            }
        };

        let result = self.collect_prices(&session, product_name).await;
        if let Err(err) = &result {
            warn!(target: "scrape", product = %product_name, error = %err, "price extraction failed");
            self.capture_failure(&session).await;
        }

        if let Err(err) = session.close().await {
            debug!(target: "scrape", error = %err, "ignoring browser close failure");
        }

        match result {
            Ok(prices) => {
                let outcome = ScrapeOutcome::from_prices(&prices);
                match outcome.summary() {
                    Some(summary) => info!(
                        target: "scrape",
                        product = %product_name,
                        count = summary.count,
                        min = summary.min,
                        max = summary.max,
                        avg = summary.avg,
                        "prices summarised"
                    ),
                    None => info!(target: "scrape", product = %product_name, "no prices found"),
                }
                outcome
            }
            Err(err) => ScrapeOutcome::failed(err.to_string()),
        }
    }

    async fn collect_prices(
        &self,
        session: &F::Session,
        product_name: &str,
    ) -> Result<Vec<u64>, ExtractError> {
        session.navigate(self.site_url.as_str()).await?;
        let before_search = self.submit_search(session, product_name).await?;
        self.settle(session, before_search).await?;

        let selector = self.config.price_selector.as_str();
        let elements = session.find_all(selector).await?;
        debug!(target: "scrape", candidates = elements.len(), %selector, "reading price elements");

        let mut prices = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            let text = read_text(session, selector, index, element).await?;
            if let Some(price) = parse_price(&text, &self.config.currency_marker) {
                prices.push(price);
            }
        }
        Ok(prices)
    }

    /// Type the product name and press Enter.
    ///
    /// Returns a marker of the page as it was right before Enter when the
    /// settle strategy needs to tell search results from the landing page.
    async fn submit_search(
        &self,
        session: &F::Session,
        product_name: &str,
    ) -> Result<Option<PageMarker<<F::Session as BrowserSession>::Element>>, ExtractError> {
        let selector = &self.config.search_input_selector;
        match session.wait_for(selector, self.config.input_timeout()).await {
            Ok(input) => {
                session.send_keys(&input, product_name).await?;
                let before = match self.config.settle.strategy {
                    SettleStrategy::UntilPriceVisible => Some(self.mark_page(session).await?),
                    SettleStrategy::Fixed => None,
                };
                session.send_keys(&input, ENTER_KEY).await?;
                Ok(before)
            }
            Err(DriverError::Timeout { .. }) if self.config.search_url_fallback => {
                let url = self.config.search_url(product_name)?;
                info!(target: "scrape", %url, "search input never appeared; opening search URL");
                session.navigate(url.as_str()).await?;
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn mark_page(
        &self,
        session: &F::Session,
    ) -> Result<PageMarker<<F::Session as BrowserSession>::Element>, DriverError> {
        let url = session.current_url().await?;
        let first_price = session
            .find_all(&self.config.price_selector)
            .await?
            .into_iter()
            .next();
        Ok(PageMarker { url, first_price })
    }

    /// Wait for search results. `before_search` of `None` means the page
    /// shown now is already the results page.
    async fn settle(
        &self,
        session: &F::Session,
        before_search: Option<PageMarker<<F::Session as BrowserSession>::Element>>,
    ) -> Result<(), DriverError> {
        let settle = &self.config.settle;
        match settle.strategy {
            SettleStrategy::Fixed => {
                sleep(settle.max()).await;
                Ok(())
            }
            SettleStrategy::UntilPriceVisible => {
                let deadline = Instant::now().checked_add(settle.max());
                let mut searched = before_search.is_none();
                loop {
                    if !searched {
                        if let Some(before) = &before_search {
                            searched = search_applied(session, before).await?;
                        }
                        if searched {
                            debug!(target: "scrape", "search replaced the landing page");
                        }
                    }
                    if searched && self.price_visible(session).await? {
                        return Ok(());
                    }
                    let now = Instant::now();
                    let wait = match deadline {
                        Some(deadline) if now >= deadline => {
                            debug!(
                                target: "scrape",
                                searched,
                                "settle bound reached without a visible result price"
                            );
                            return Ok(());
                        }
                        Some(deadline) => settle.poll().min(deadline - now),
                        None => settle.poll(),
                    };
                    sleep(wait).await;
                }
            }
        }
    }

    /// Whether any price element currently reads as a price. Stale reads count as "not yet".
    async fn price_visible(&self, session: &F::Session) -> Result<bool, DriverError> {
        for element in session.find_all(&self.config.price_selector).await? {
            match session.text(&element).await {
                Ok(text) if parse_price(&text, &self.config.currency_marker).is_some() => {
                    return Ok(true);
                }
                Ok(_) => {}
                Err(err) if err.is_stale() => {}
                Err(err) => return Err(err),
            }
        }
        Ok(false)
    }

    async fn capture_failure(&self, session: &F::Session) {
        let Some(dir) = &self.config.failure_capture_dir else {
            return;
        };
        let capture = match session.capture().await {
            Ok(capture) => capture,
            Err(err) => {
                warn!(target: "scrape", error = %err, "could not capture failed page");
                return;
            }
        };
        match capture.write_to(dir).await {
            Ok(path) => info!(target: "scrape", path = %path.display(), "saved failed page"),
            Err(err) => warn!(target: "scrape", error = %err, "could not write page capture"),
        }
    }
}

/// The page as it stood just before the search was submitted.
struct PageMarker<E> {
    url: String,
    first_price: Option<E>,
}

/// Whether the page has moved on from `before`: the URL changed, or the
/// first price element seen before the search is no longer attached.
async fn search_applied<S: BrowserSession>(
    session: &S,
    before: &PageMarker<S::Element>,
) -> Result<bool, DriverError> {
    if session.current_url().await? != before.url {
        return Ok(true);
    }
    let Some(element) = &before.first_price else {
        return Ok(true);
    };
    match session.text(element).await {
        Ok(_) => Ok(false),
        Err(err) if err.is_stale() => Ok(true),
        Err(err) => Err(err),
    }
}

/// Read an element's text, re-locating it by position once if it went stale.
async fn read_text<S: BrowserSession>(
    session: &S,
    selector: &str,
    index: usize,
    element: &S::Element,
) -> Result<String, DriverError> {
    retry_once(
        |attempt| async move {
            match attempt {
                Attempt::First => session.text(element).await,
                Attempt::Retry => {
                    debug!(target: "scrape", index, "stale price element; re-locating");
                    let fresh = session
                        .find_all(selector)
                        .await?
                        .into_iter()
                        .nth(index)
                        .ok_or_else(|| DriverError::ElementGone {
                            selector: selector.to_string(),
                            index,
                        })?;
                    session.text(&fresh).await
                }
            }
        },
        DriverError::is_stale,
    )
    .await
}

#[async_trait]
impl<F: SessionFactory> PriceSource for PriceExtractor<F> {
    async fn scrape(&self, product_name: &str) -> ScrapeOutcome {
        self.extract(product_name).await
    }
}
