use serde_json::json;
use vyapyaar_config::BrowserConfig;
use webdriver::capabilities::Capabilities;

/// Construct Chrome command-line arguments for an unattended session.
///
/// Window size and user agent are fixed per configuration so every session
/// renders the same layout.
pub fn chrome_arguments(config: &BrowserConfig) -> Vec<String> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-gpu".to_string(),
        "--disable-dev-shm-usage".to_string(),
        format!(
            "--window-size={},{}",
            config.window_width, config.window_height
        ),
        format!("--user-agent={}", config.user_agent),
    ];

    if config.headless {
        args.push("--headless=new".to_string());
    }

    args.extend(config.extra_args.iter().cloned());
    args
}

/// W3C capabilities requesting Chrome with [`chrome_arguments`].
pub fn chrome_capabilities(config: &BrowserConfig) -> Capabilities {
    let mut caps = Capabilities::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": chrome_arguments(config) }),
    );
    caps
}
