use crate::vyapyaar_browser::error::DriverError;
use fantoccini::{elements::Element, Client, Locator};
use std::time::Duration;
use tracing::debug;

/// WebDriver key code for Enter.
pub const ENTER_KEY: &str = "\u{E007}";

/// Page wrapper providing navigation, bounded waits and element queries.
#[derive(Clone)]
pub struct VyapyaarPage {
    client: Client,
}

impl VyapyaarPage {
    /// Construct a page wrapper around an existing WebDriver client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn goto(&self, url: &str) -> Result<(), DriverError> {
        debug!(target: "browser.page", %url, "navigating");
        self.client.goto(url).await?;
        Ok(())
    }

    /// Return the full page HTML source.
    pub async fn get_content(&self) -> Result<String, DriverError> {
        Ok(self.client.source().await?)
    }

    /// PNG screenshot of the viewport.
    pub async fn screenshot(&self) -> Result<Vec<u8>, DriverError> {
        Ok(self.client.screenshot().await?)
    }

    /// Return the current page URL.
    pub async fn get_url(&self) -> Result<String, DriverError> {
        Ok(self.client.current_url().await?.to_string())
    }

    /// Wait up to `timeout` for the first element matching `selector`.
    pub async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<VyapyaarElement, DriverError> {
        let element = self
            .client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .map_err(|e| DriverError::from_wait(e, selector, timeout))?;
        Ok(VyapyaarElement::new(element))
    }

    /// Find zero or more elements by CSS selector.
    pub async fn find_elements(&self, selector: &str) -> Result<Vec<VyapyaarElement>, DriverError> {
        let elements = self.client.find_all(Locator::Css(selector)).await?;
        Ok(elements.into_iter().map(VyapyaarElement::new).collect())
    }
}

/// Wrapper for DOM elements consistent with [`VyapyaarPage`].
#[derive(Clone)]
pub struct VyapyaarElement {
    element: Element,
}

impl VyapyaarElement {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    pub async fn send_keys(&self, text: &str) -> Result<(), DriverError> {
        self.element.send_keys(text).await?;
        Ok(())
    }

    /// Return the element's visible text.
    pub async fn get_inner_text(&self) -> Result<String, DriverError> {
        Ok(self.element.text().await?)
    }
}
