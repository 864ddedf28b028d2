use crate::vyapyaar_browser::{error::DriverError, options::chrome_capabilities, page::VyapyaarPage};
use fantoccini::{Client, ClientBuilder};
use tracing::debug;
use vyapyaar_config::BrowserConfig;

/// Thin wrapper around a `fantoccini` WebDriver client.
///
/// One driver is one browser session. It is created per lookup and must be
/// closed with [`VyapyaarDriver::close`]; nothing is pooled.
pub struct VyapyaarDriver {
    client: Client,
}

impl VyapyaarDriver {
    /// Start a new session on the WebDriver service at `config.webdriver_url`.
    pub async fn connect(config: &BrowserConfig) -> Result<Self, DriverError> {
        debug!(
            target: "browser.session",
            webdriver = %config.webdriver_url,
            headless = config.headless,
            "starting browser session"
        );
        let client = ClientBuilder::native()
            .capabilities(chrome_capabilities(config))
            .connect(&config.webdriver_url)
            .await?;
        Ok(Self { client })
    }

    /// Handle on the session's current document.
    pub fn page(&self) -> VyapyaarPage {
        VyapyaarPage::new(self.client.clone())
    }

    /// Close the underlying browser session.
    pub async fn close(self) -> Result<(), DriverError> {
        self.client.close().await?;
        debug!(target: "browser.session", "browser session closed");
        Ok(())
    }
}
