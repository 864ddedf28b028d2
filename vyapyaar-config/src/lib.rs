//! Loader for service configuration with YAML + environment overlays.
//!
//! Sources are merged in order: files and inline snippets first, then
//! `VYAPYAAR_`-prefixed environment variables (nested keys use `__`, e.g.
//! `VYAPYAAR_SCRAPER__INPUT_TIMEOUT_MS=20000`). Environment values win.
//! `${VAR}` placeholders in string values are expanded after merging.
//!
//! Every field has a default, so an empty configuration is valid and points
//! the scraper at Meesho through a local chromedriver.
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub use config::ConfigError;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "VYAPYAAR";
const MAXIMUM_SETTLE_MS: u64 = 600_000;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VyapyaarConfig {
    pub server: ServerConfig,
    pub browser: BrowserConfig,
    pub scraper: ScraperConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Upper bound on browser sessions running at the same time.
    pub max_concurrent_scrapes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 5000)),
            max_concurrent_scrapes: 2,
        }
    }
}

/// How the WebDriver session is launched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub user_agent: String,
    /// Appended verbatim to the Chrome command line.
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".into(),
            headless: true,
            window_width: 1920,
            window_height: 1080,
            user_agent: DEFAULT_USER_AGENT.into(),
            extra_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub site_url: String,
    pub search_input_selector: String,
    pub price_selector: String,
    pub currency_marker: String,
    pub input_timeout_ms: u64,
    /// Navigate to `<site_url>/search?q=...` when the search box never shows up.
    pub search_url_fallback: bool,
    /// Where HTML and screenshots of failed pages are written, if anywhere.
    pub failure_capture_dir: Option<PathBuf>,
    pub settle: SettleConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            site_url: "https://www.meesho.com/".into(),
            search_input_selector: "input".into(),
            price_selector: "h5".into(),
            currency_marker: "₹".into(),
            input_timeout_ms: 15_000,
            search_url_fallback: false,
            failure_capture_dir: None,
            settle: SettleConfig::default(),
        }
    }
}

impl ScraperConfig {
    pub fn input_timeout(&self) -> Duration {
        Duration::from_millis(self.input_timeout_ms)
    }

    pub fn site_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.site_url)
            .map_err(|e| ConfigError::Message(format!("scraper.site_url `{}`: {e}", self.site_url)))
    }

    /// Direct search URL used by the fallback path.
    ///
    /// `search` is appended below the site path, so `https://x.test/shop`
    /// searches at `/shop/search`.
    pub fn search_url(&self, query: &str) -> Result<Url, ConfigError> {
        let mut url = self.site_url()?;
        url.path_segments_mut()
            .map_err(|()| {
                ConfigError::Message(format!(
                    "scraper.site_url `{}` cannot carry a path",
                    self.site_url
                ))
            })?
            .pop_if_empty()
            .push("search");
        url.set_query(None);
        url.set_fragment(None);
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleStrategy {
    /// Poll until the search has replaced the page it was typed on and a
    /// price-bearing element is readable, bounded by `max_ms`.
    #[default]
    UntilPriceVisible,
    /// Always sleep for `max_ms`.
    Fixed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    pub strategy: SettleStrategy,
    pub max_ms: u64,
    pub poll_ms: u64,
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            strategy: SettleStrategy::UntilPriceVisible,
            max_ms: 5_000,
            poll_ms: 250,
        }
    }
}

impl SettleConfig {
    pub fn max(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(1))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormatSetting {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormatSetting,
    pub emit_stderr: bool,
    pub file: bool,
    pub dir: Option<PathBuf>,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormatSetting::Text,
            emit_stderr: true,
            file: true,
            dir: None,
            filter: "info,tower_http=debug".into(),
        }
    }
}

impl VyapyaarConfig {
    /// Reject values that would only fail later, in the middle of a request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scraper.site_url()?;
        Url::parse(&self.browser.webdriver_url).map_err(|e| {
            ConfigError::Message(format!(
                "browser.webdriver_url `{}`: {e}",
                self.browser.webdriver_url
            ))
        })?;
        let required = [
            ("scraper.search_input_selector", &self.scraper.search_input_selector),
            ("scraper.price_selector", &self.scraper.price_selector),
            ("scraper.currency_marker", &self.scraper.currency_marker),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Message(format!("{key} must not be empty")));
            }
        }
        if self.scraper.settle.max_ms > MAXIMUM_SETTLE_MS {
            return Err(ConfigError::Message(format!(
                "scraper.settle.max_ms must be at most {MAXIMUM_SETTLE_MS}"
            )));
        }
        if self.server.max_concurrent_scrapes == 0 {
            return Err(ConfigError::Message(
                "server.max_concurrent_scrapes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (files + env overrides).
pub struct VyapyaarConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for VyapyaarConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl VyapyaarConfigLoader {
    /// Start from built-in defaults; the environment overlay is added by [`Self::load`].
    ///
    /// ```
    /// use vyapyaar_config::VyapyaarConfigLoader;
    ///
    /// let config = VyapyaarConfigLoader::new().load().expect("defaults are valid");
    ///
    /// assert_eq!(config.scraper.price_selector, "h5");
    /// assert_eq!(config.scraper.input_timeout_ms, 15_000);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may be absent, so deployments can rely on the environment alone.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use vyapyaar_config::{SettleStrategy, VyapyaarConfigLoader};
    ///
    /// let cfg = VyapyaarConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// scraper:
    ///   price_selector: "span.price"
    ///   settle:
    ///     strategy: fixed
    ///     max_ms: 2000
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.scraper.price_selector, "span.price");
    /// assert_eq!(cfg.scraper.settle.strategy, SettleStrategy::Fixed);
    /// assert_eq!(cfg.scraper.currency_marker, "₹");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// ```
    /// use vyapyaar_config::VyapyaarConfigLoader;
    ///
    /// unsafe { std::env::set_var("CAPTURE_ROOT", "/tmp/vyapyaar-captures"); }
    ///
    /// let config = VyapyaarConfigLoader::new()
    ///     .with_yaml_str("scraper:\n  failure_capture_dir: \"${CAPTURE_ROOT}/meesho\"\n")
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(
    ///     config.scraper.failure_capture_dir.as_deref(),
    ///     Some(std::path::Path::new("/tmp/vyapyaar-captures/meesho"))
    /// );
    ///
    /// unsafe { std::env::remove_var("CAPTURE_ROOT"); }
    /// ```
    pub fn load(self) -> Result<VyapyaarConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: VyapyaarConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.validate()?;

        Ok(typed)
    }
}
