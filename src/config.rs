use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::browser::{LaunchProfile, DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_USER_AGENT};
use crate::error::{PtsError, Result};
use crate::Viewport;

/// Flags shared by every launch profile.
const BASE_ARGS: &[&str] = &[
    "--no-sandbox",
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--ignore-certificate-errors",
];

/// Extra flags for constrained serverless hosts.
const SERVERLESS_ARGS: &[&str] = &[
    "--single-process",
    "--no-zygote",
    "--disable-web-security",
    "--disable-features=VizDisplayCompositor",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerSettings,
    pub browser: BrowserSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

impl ServerSettings {
    /// "host:port" for binding.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Hosting environment; selects the launch flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Serverless,
}

impl Environment {
    pub fn description(self) -> &'static str {
        match self {
            Environment::Local => "Local",
            Environment::Serverless => "Serverless",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" | "development" => Some(Environment::Local),
            "serverless" | "production" => Some(Environment::Serverless),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserSettings {
    pub environment: Environment,
    #[serde(with = "humantime_serde")]
    pub navigation_timeout: Duration,
    pub user_agent: String,
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub viewport: Viewport,
    pub extra_args: Vec<String>,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            environment: Environment::Local,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            executable: None,
            headless: true,
            viewport: Viewport::default(),
            extra_args: Vec::new(),
        }
    }
}

impl BrowserSettings {
    /// Builds the process-wide launch profile.
    pub fn launch_profile(&self) -> LaunchProfile {
        let mut args: Vec<String> = BASE_ARGS.iter().map(|a| a.to_string()).collect();
        if self.environment == Environment::Serverless {
            args.extend(SERVERLESS_ARGS.iter().map(|a| a.to_string()));
        }
        for arg in &self.extra_args {
            if !args.contains(arg) {
                args.push(arg.clone());
            }
        }
        LaunchProfile {
            executable: self.executable.clone(),
            headless: self.headless,
            args,
            viewport: self.viewport,
            user_agent: self.user_agent.clone(),
            navigation_timeout: self.navigation_timeout,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub format: LogFormat,
}

impl Config {
    /// Loads config from an explicit path, the central config file, or defaults.
    /// Priority: explicit path > ~/.config/pts/config.toml > defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let source = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::central_config_path().filter(|p| p.is_file()),
        };
        match source {
            Some(p) => Self::from_toml(&std::fs::read_to_string(&p)?),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// `$XDG_CONFIG_HOME/pts/config.toml`, falling back to `~/.config`.
    pub fn central_config_path() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("pts").join("config.toml"))
    }

    /// Applies deployment variables: `PORT`, `CHROME_EXECUTABLE_PATH`,
    /// `PTS_ENVIRONMENT`, and `VERCEL` (forces serverless).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| PtsError::Config(format!("PORT is not a valid port: {port}")))?;
        }
        if let Some(path) = lookup("CHROME_EXECUTABLE_PATH").filter(|p| !p.trim().is_empty()) {
            self.browser.executable = Some(PathBuf::from(path));
        }
        if let Some(value) = lookup("PTS_ENVIRONMENT") {
            self.browser.environment = Environment::parse(&value).ok_or_else(|| {
                PtsError::Config(format!(
                    "PTS_ENVIRONMENT must be 'local' or 'serverless', got '{value}'"
                ))
            })?;
        }
        if lookup("VERCEL").is_some() {
            self.browser.environment = Environment::Serverless;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(PtsError::Config("port must be non-zero".to_string()));
        }
        if self.browser.navigation_timeout.is_zero() {
            return Err(PtsError::Config(
                "navigation timeout must be greater than zero".to_string(),
            ));
        }
        if self.browser.user_agent.trim().is_empty() {
            return Err(PtsError::Config("user agent must not be empty".to_string()));
        }
        if self.browser.viewport.width == 0 || self.browser.viewport.height == 0 {
            return Err(PtsError::Config(
                "viewport dimensions must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
