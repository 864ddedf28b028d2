#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use vyapyaar_config::{ScraperConfig, SettleConfig, SettleStrategy};
use vyapyaar_drivers::DriverError;
use vyapyaar_drivers::vyapyaar_browser::page::ENTER_KEY;
use vyapyaar_web::{BrowserSession, PageCapture, PriceExtractor, SessionFactory};

/// What the fake storefront shows and how it misbehaves.
#[derive(Debug, Clone, Default)]
pub struct PageScript {
    pub search_input_missing: bool,
    /// Price texts on the storefront before a search is submitted.
    pub landing_texts: Vec<String>,
    /// Submitting a search re-renders in place instead of changing the URL.
    pub search_keeps_url: bool,
    /// Landing price elements stay attached after a search.
    pub landing_survives_search: bool,
    /// Result price texts, shown once a search has been submitted.
    pub texts: Vec<String>,
    /// Price element index -> number of stale reads before a read succeeds.
    pub stale_reads: HashMap<usize, usize>,
    /// Result texts seen by every `find_all` after the first result query.
    pub texts_after_rerender: Option<Vec<String>>,
    /// Number of `find_all` calls after the search that see no results yet.
    pub empty_polls: usize,
    pub navigation_error: Option<DriverError>,
    pub session_error: Option<DriverError>,
    pub close_error: Option<DriverError>,
}

impl PageScript {
    pub fn with_texts(texts: &[&str]) -> Self {
        Self {
            texts: texts.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Navigate(String),
    WaitFor(String, Duration),
    SendKeys(String),
    FindAll(String),
    Text(usize),
    Capture,
    Close,
}

#[derive(Debug, Default)]
pub struct Journal {
    pub calls: Mutex<Vec<Call>>,
    pub sessions_opened: Mutex<usize>,
}

impl Journal {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn closes(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Close).count()
    }

    pub fn keys_sent(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SendKeys(k) => Some(k),
                _ => None,
            })
            .collect()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Navigate(u) => Some(u),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeElement {
    SearchInput,
    Landing(usize),
    Price(usize),
}

pub struct ScriptedSession {
    script: PageScript,
    journal: Arc<Journal>,
    stale_left: Mutex<HashMap<usize, usize>>,
    price_queries: Mutex<usize>,
    url: Mutex<String>,
    typed: Mutex<String>,
    searched: Mutex<bool>,
}

impl ScriptedSession {
    fn searched(&self) -> bool {
        *self.searched.lock().unwrap()
    }

    fn landing_text(&self, index: usize) -> Result<String, DriverError> {
        if self.searched() && !self.script.landing_survives_search {
            return Err(DriverError::StaleElement(format!("landing element {index} detached")));
        }
        self.script
            .landing_texts
            .get(index)
            .cloned()
            .ok_or_else(|| DriverError::Command(format!("no landing element {index}")))
    }

    /// Texts as of the latest `find_all`.
    fn current_texts(&self) -> Vec<String> {
        let queries = *self.price_queries.lock().unwrap();
        if queries <= self.script.empty_polls {
            return Vec::new();
        }
        match &self.script.texts_after_rerender {
            Some(rerendered) if queries > self.script.empty_polls + 1 => rerendered.clone(),
            _ => self.script.texts.clone(),
        }
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    type Element = FakeElement;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.journal.record(Call::Navigate(url.to_string()));
        if let Some(err) = &self.script.navigation_error {
            return Err(err.clone());
        }
        if url.contains("/search?") {
            *self.searched.lock().unwrap() = true;
        }
        *self.url.lock().unwrap() = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.url.lock().unwrap().clone())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<FakeElement, DriverError> {
        self.journal
            .record(Call::WaitFor(selector.to_string(), timeout));
        if self.script.search_input_missing {
            tokio::time::sleep(timeout).await;
            return Err(DriverError::Timeout {
                selector: selector.to_string(),
                timeout,
            });
        }
        Ok(FakeElement::SearchInput)
    }

    async fn send_keys(&self, element: &FakeElement, text: &str) -> Result<(), DriverError> {
        assert_eq!(*element, FakeElement::SearchInput);
        self.journal.record(Call::SendKeys(text.to_string()));
        if text != ENTER_KEY {
            self.typed.lock().unwrap().push_str(text);
            return Ok(());
        }
        *self.searched.lock().unwrap() = true;
        if !self.script.search_keeps_url {
            let typed = self.typed.lock().unwrap().replace(' ', "+");
            *self.url.lock().unwrap() = format!("{SITE}search?q={typed}");
        }
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FakeElement>, DriverError> {
        self.journal.record(Call::FindAll(selector.to_string()));
        if !self.searched() {
            return Ok((0..self.script.landing_texts.len())
                .map(FakeElement::Landing)
                .collect());
        }
        *self.price_queries.lock().unwrap() += 1;
        Ok((0..self.current_texts().len()).map(FakeElement::Price).collect())
    }

    async fn text(&self, element: &FakeElement) -> Result<String, DriverError> {
        let index = match *element {
            FakeElement::Price(index) => index,
            FakeElement::Landing(index) => return self.landing_text(index),
            FakeElement::SearchInput => {
                return Err(DriverError::Command("not a price element".into()));
            }
        };
        self.journal.record(Call::Text(index));
        {
            let mut stale = self.stale_left.lock().unwrap();
            if let Some(left) = stale.get_mut(&index) {
                if *left > 0 {
                    *left -= 1;
                    return Err(DriverError::StaleElement(format!("element {index} detached")));
                }
            }
        }
        self.current_texts()
            .get(index)
            .cloned()
            .ok_or_else(|| DriverError::Command(format!("no element {index}")))
    }

    async fn capture(&self) -> Result<PageCapture, DriverError> {
        self.journal.record(Call::Capture);
        Ok(PageCapture {
            url: Some("https://shop.test/".into()),
            html: "<html><body>blocked</body></html>".into(),
            screenshot_png: Some(vec![1, 2, 3]),
        })
    }

    async fn close(self) -> Result<(), DriverError> {
        self.journal.record(Call::Close);
        match self.script.close_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub struct ScriptedFactory {
    pub script: PageScript,
    pub journal: Arc<Journal>,
}

#[async_trait]
impl SessionFactory for ScriptedFactory {
    type Session = ScriptedSession;

    async fn new_session(&self) -> Result<ScriptedSession, DriverError> {
        *self.journal.sessions_opened.lock().unwrap() += 1;
        if let Some(err) = &self.script.session_error {
            return Err(err.clone());
        }
        Ok(ScriptedSession {
            stale_left: Mutex::new(self.script.stale_reads.clone()),
            script: self.script.clone(),
            journal: self.journal.clone(),
            price_queries: Mutex::new(0),
            url: Mutex::new(String::from("about:blank")),
            typed: Mutex::new(String::new()),
            searched: Mutex::new(false),
        })
    }
}

pub const SITE: &str = "https://shop.test/";

/// Default settle behaviour against the fake site: poll every 250 ms for up to 5 s.
pub fn polling_config() -> ScraperConfig {
    ScraperConfig {
        site_url: SITE.into(),
        ..ScraperConfig::default()
    }
}

/// Scraper settings pointing at the fake site, reading prices right away.
pub fn immediate_config() -> ScraperConfig {
    ScraperConfig {
        site_url: SITE.into(),
        settle: SettleConfig {
            strategy: SettleStrategy::Fixed,
            max_ms: 0,
            poll_ms: 250,
        },
        ..ScraperConfig::default()
    }
}

pub fn extractor(
    script: PageScript,
    config: ScraperConfig,
) -> (PriceExtractor<ScriptedFactory>, Arc<Journal>) {
    let journal = Arc::new(Journal::default());
    let factory = ScriptedFactory {
        script,
        journal: journal.clone(),
    };
    let extractor = PriceExtractor::new(factory, config).expect("valid scraper config");
    (extractor, journal)
}
