//! The single browser session owned by this process.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;
use tracing::{debug, info};

use crate::auth::LoginFlow;
use crate::config::{Credentials, Settings};
use crate::errors::RelayError;
use crate::waiter::wait_until;

/// Deadline for the landing-page readiness probe
const READY_TIMEOUT: Duration = Duration::from_secs(7);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/114.0.5735.91 Safari/537.36";

/// The one WebDriver connection for the process lifetime.
///
/// Constructed only by [`Session::ensure`] and destroyed only by
/// [`Session::close`]; every element interaction in the crate runs
/// against the client handle this owns.
pub struct Session {
    client: Client,
}

/// Chrome capabilities for a durable, low-noise automation profile.
///
/// The profile directory persists authentication cookies across runs.
/// The switches mask automation fingerprints and turn off subsystems
/// the automation never needs (background networking, sync,
/// translate, media).
pub fn chrome_capabilities(
    profile_dir: &Path,
    headless: bool,
) -> serde_json::Map<String, serde_json::Value> {
    let mut args = vec![
        format!("--user-data-dir={}", profile_dir.display()),
        "--profile-directory=Default".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
        format!("--user-agent={USER_AGENT}"),
        "--enable-unsafe-swiftshader".to_string(),
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-extensions".to_string(),
        "--disable-background-networking".to_string(),
        "--disable-sync".to_string(),
        "--metrics-recording-only".to_string(),
        "--disable-default-apps".to_string(),
        "--mute-audio".to_string(),
        "--disable-translate".to_string(),
        "--disable-background-timer-throttling".to_string(),
        "--disable-renderer-backgrounding".to_string(),
        "--disable-backgrounding-occluded-windows".to_string(),
        "--disable-features=TranslateUI,BlinkGenPropertyTrees".to_string(),
        "--blink-settings=imagesEnabled=false".to_string(),
        "--window-size=800,600".to_string(),
    ];

    if headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }

    let mut chrome_opts = serde_json::Map::new();
    chrome_opts.insert("args".to_string(), json!(args));
    chrome_opts.insert("excludeSwitches".to_string(), json!(["enable-automation"]));

    let mut caps = serde_json::Map::new();
    caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));
    caps
}

impl Session {
    /// Connect to the WebDriver and make sure the session is
    /// authenticated.
    ///
    /// Navigates to the landing page and waits for basic readiness; a
    /// failed probe is read as "not authenticated or unreachable" and
    /// triggers exactly one login attempt followed by one re-probe.
    /// The second probe failing is fatal to startup.
    pub async fn ensure(settings: &Settings, credentials: &Credentials) -> Result<Self> {
        let endpoint = settings.webdriver_endpoint();

        if !Self::is_webdriver_running(&endpoint).await {
            anyhow::bail!(
                "Cannot connect to WebDriver at {}.\n\
                Please ensure chromedriver is running:\n\
                  chromedriver --port 9515",
                endpoint
            );
        }

        let profile_dir = settings.profile_path();
        std::fs::create_dir_all(&profile_dir).with_context(|| {
            format!("Failed to create profile directory {}", profile_dir.display())
        })?;

        let caps = chrome_capabilities(&profile_dir, settings.headless);

        debug!("Connecting to WebDriver at {}", endpoint);
        let client = ClientBuilder::rustls()
            .capabilities(caps)
            .connect(&endpoint)
            .await
            .context("Failed to connect to WebDriver")?;

        let session = Session { client };

        if let Err(err) = session.probe_landing(settings).await {
            info!("landing probe failed ({err}), login required");
            LoginFlow::new(&session.client, credentials, settings)
                .run()
                .await?;
            session
                .probe_landing(settings)
                .await
                .context("landing page still unreachable after login attempt")?;
        }

        info!("session ready");
        Ok(session)
    }

    /// Navigate to the landing page and wait for basic readiness.
    async fn probe_landing(&self, settings: &Settings) -> Result<(), RelayError> {
        self.client.goto(settings.app_url.as_str()).await?;
        wait_until(READY_TIMEOUT, || async move {
            self.client.find(Locator::Css("body")).await.ok()
        })
        .await?;
        Ok(())
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn close(self) -> Result<(), RelayError> {
        self.client.close().await?;
        Ok(())
    }

    async fn is_webdriver_running(endpoint: &str) -> bool {
        let status_url = format!("{}/status", endpoint);
        match reqwest::get(&status_url).await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;
