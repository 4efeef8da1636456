use std::fmt;
use std::path::PathBuf;

use clap::Parser;
use url::Url;

use crate::errors::RelayError;

const EMAIL_VAR: &str = "WEBRELAY_EMAIL";
const PASSWORD_VAR: &str = "WEBRELAY_PASSWORD";

/// Login credentials, loaded once at startup.
///
/// Immutable for the process lifetime. Absence is a fatal startup
/// condition checked before any browser session is created.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, RelayError> {
        let email = require_var(EMAIL_VAR)?;
        let password = require_var(PASSWORD_VAR)?;
        Ok(Self { email, password })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn require_var(name: &str) -> Result<String, RelayError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(RelayError::Config(format!(
            "{name} must be set in the environment"
        ))),
    }
}

/// Daemon settings
#[derive(Parser, Debug, Clone)]
#[command(name = "webrelay")]
#[command(about = "Relays HTTP commands into a web application's automation cards", long_about = None)]
pub struct Settings {
    /// Landing page of the target application, probed for an authenticated session
    #[arg(long, default_value = "https://home.google.com/u/0/")]
    pub app_url: Url,

    /// Login page driven when the landing probe fails
    #[arg(long, default_value = "https://home.google.com/login")]
    pub login_url: Url,

    /// WebDriver endpoint (chromedriver)
    #[arg(long, default_value = "http://localhost:9515")]
    pub webdriver_url: Url,

    /// Port for the HTTP command endpoint
    #[arg(long, default_value_t = 8602)]
    pub port: u16,

    /// Durable browser profile directory; defaults under the user data dir
    #[arg(long)]
    pub profile_dir: Option<PathBuf>,

    /// Append-mode log file; defaults under the user data dir
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Run the browser headless
    #[arg(long)]
    pub headless: bool,
}

impl Settings {
    pub fn profile_path(&self) -> PathBuf {
        self.profile_dir
            .clone()
            .unwrap_or_else(|| data_dir().join("profile"))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| data_dir().join("logs").join("webrelay.log"))
    }

    /// WebDriver endpoint without a trailing slash, ready for path joins.
    pub fn webdriver_endpoint(&self) -> String {
        self.webdriver_url.as_str().trim_end_matches('/').to_string()
    }
}

fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("webrelay"))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
