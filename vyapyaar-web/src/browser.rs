use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;
use vyapyaar_config::BrowserConfig;
use vyapyaar_drivers::DriverError;
use vyapyaar_drivers::vyapyaar_browser::driver::VyapyaarDriver;
use vyapyaar_drivers::vyapyaar_browser::page::{VyapyaarElement, VyapyaarPage};

/// Snapshot of a page, written to disk when an extraction fails.
#[derive(Debug, Clone)]
pub struct PageCapture {
    pub url: Option<String>,
    pub html: String,
    pub screenshot_png: Option<Vec<u8>>,
}

impl PageCapture {
    /// Write `<stamp>-<id>.html` (and `.png` when present) into `dir`.
    ///
    /// Returns the path of the HTML file.
    pub async fn write_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let stem = format!(
            "{}-{}",
            Utc::now().format("%Y%m%dT%H%M%S"),
            Uuid::new_v4().simple()
        );

        let html_path = dir.join(format!("{stem}.html"));
        tokio::fs::write(&html_path, &self.html).await?;
        if let Some(png) = &self.screenshot_png {
            tokio::fs::write(dir.join(format!("{stem}.png")), png).await?;
        }
        Ok(html_path)
    }
}

/// One isolated browser session, as the extractor sees it.
///
/// Implementations own the session; [`BrowserSession::close`] ends it.
#[async_trait]
pub trait BrowserSession: Send + Sync + Sized {
    type Element: Send + Sync;

    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    async fn current_url(&self) -> Result<String, DriverError>;

    /// First element matching `selector`, waiting at most `timeout`.
    async fn wait_for(&self, selector: &str, timeout: Duration)
    -> Result<Self::Element, DriverError>;

    async fn send_keys(&self, element: &Self::Element, text: &str) -> Result<(), DriverError>;

    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>, DriverError>;

    async fn text(&self, element: &Self::Element) -> Result<String, DriverError>;

    async fn capture(&self) -> Result<PageCapture, DriverError>;

    async fn close(self) -> Result<(), DriverError>;
}

/// Creates a fresh [`BrowserSession`] per call.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    type Session: BrowserSession;

    async fn new_session(&self) -> Result<Self::Session, DriverError>;
}

/// Concrete session backed by the fantoccini-based driver.
pub struct FantocciniSession {
    driver: VyapyaarDriver,
    page: VyapyaarPage,
}

#[async_trait]
impl BrowserSession for FantocciniSession {
    type Element = VyapyaarElement;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.page.goto(url).await
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        self.page.get_url().await
    }

    async fn wait_for(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<VyapyaarElement, DriverError> {
        self.page.wait_for_element(selector, timeout).await
    }

    async fn send_keys(&self, element: &VyapyaarElement, text: &str) -> Result<(), DriverError> {
        element.send_keys(text).await
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<VyapyaarElement>, DriverError> {
        self.page.find_elements(selector).await
    }

    async fn text(&self, element: &VyapyaarElement) -> Result<String, DriverError> {
        element.get_inner_text().await
    }

    async fn capture(&self) -> Result<PageCapture, DriverError> {
        let html = self.page.get_content().await?;
        Ok(PageCapture {
            url: self.page.get_url().await.ok(),
            html,
            screenshot_png: self.page.screenshot().await.ok(),
        })
    }

    async fn close(self) -> Result<(), DriverError> {
        self.driver.close().await
    }
}

/// Starts a new chromedriver session for every extraction.
#[derive(Debug, Clone)]
pub struct WebDriverSessionFactory {
    config: BrowserConfig,
}

impl WebDriverSessionFactory {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionFactory for WebDriverSessionFactory {
    type Session = FantocciniSession;

    async fn new_session(&self) -> Result<FantocciniSession, DriverError> {
        let driver = VyapyaarDriver::connect(&self.config).await?;
        let page = driver.page();
        Ok(FantocciniSession { driver, page })
    }
}
