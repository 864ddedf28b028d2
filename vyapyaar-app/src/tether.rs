use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use vyapyaar_common::ScrapeOutcome;
use vyapyaar_common::observability::{LogConfig, LogFormat};
use vyapyaar_config::{LogFormatSetting, LoggingConfig, VyapyaarConfig, VyapyaarConfigLoader};
use vyapyaar_http::{AppState, router, serve};
use vyapyaar_web::{PriceExtractor, PriceSource, WebDriverSessionFactory};

/// Everything `serve` needs, wired from configuration.
pub struct Tether {
    bind: SocketAddr,
    state: AppState,
}

impl Tether {
    pub fn bind(&self) -> SocketAddr {
        self.bind
    }

    /// Serve until Ctrl-C, then refuse new scrapes and drain the rest.
    pub async fn run(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.bind)
            .await
            .with_context(|| format!("binding {}", self.bind))?;

        let gate = self.state.clone();
        serve(listener, router(self.state), async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = %err, "ctrl-c handler failed; shutting down");
            }
            gate.close_gate();
        })
        .await
        .context("http server")
    }
}

pub fn load_config(path: &Path) -> Result<VyapyaarConfig> {
    VyapyaarConfigLoader::new()
        .with_optional_file(path)
        .load()
        .with_context(|| format!("loading configuration from {}", path.display()))
}

pub fn log_config(cfg: &LoggingConfig) -> LogConfig {
    LogConfig {
        file: cfg.file,
        log_dir: cfg.dir.clone(),
        emit_stderr: cfg.emit_stderr,
        format: match cfg.format {
            LogFormatSetting::Text => LogFormat::Text,
            LogFormatSetting::Json => LogFormat::Json,
        },
        default_filter: cfg.filter.clone(),
        ..LogConfig::default()
    }
}

pub fn price_source(cfg: &VyapyaarConfig) -> Result<Arc<dyn PriceSource>> {
    let factory = WebDriverSessionFactory::new(cfg.browser.clone());
    let extractor = PriceExtractor::new(factory, cfg.scraper.clone())
        .context("building price extractor")?;
    Ok(Arc::new(extractor))
}

pub fn build_from_config(cfg: &VyapyaarConfig, bind: Option<SocketAddr>) -> Result<Tether> {
    let source = price_source(cfg)?;
    let state = AppState::new(source, cfg.server.max_concurrent_scrapes);
    let bind = bind.unwrap_or(cfg.server.bind);
    info!(
        %bind,
        webdriver = %cfg.browser.webdriver_url,
        site = %cfg.scraper.site_url,
        capacity = state.capacity(),
        "service configured"
    );
    Ok(Tether { bind, state })
}

/// One lookup outside the server, for the `scrape` command.
pub async fn scrape_once(cfg: &VyapyaarConfig, product: &str) -> Result<ScrapeOutcome> {
    let source = price_source(cfg)?;
    Ok(source.scrape(product).await)
}
