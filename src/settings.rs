use std::path::Path;
use std::time::Duration;

use pts_lib::{Config, PtsError};

use crate::cli::BrowserArgs;

/// Load config from a TOML file, central config, or defaults, then apply
/// deployment environment variables.
/// Priority: explicit path > ~/.config/pts/config.toml > defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, PtsError> {
    let mut cfg = Config::load(path).map_err(|e| {
        let loc = path
            .map(|p| p.display().to_string())
            .or_else(|| Config::central_config_path().map(|p| p.display().to_string()))
            .unwrap_or_else(|| "defaults".to_string());
        PtsError::Config(format!("Failed to read config {}: {}", loc, e))
    })?;
    cfg.apply_env(|key| std::env::var(key).ok())?;
    Ok(cfg)
}

/// Apply browser flags on top of the loaded config.
pub fn apply_browser_args(cfg: &mut Config, args: &BrowserArgs) {
    if let Some(secs) = args.nav_timeout {
        cfg.browser.navigation_timeout = Duration::from_secs(secs);
    }
    if let Some(path) = &args.chrome {
        cfg.browser.executable = Some(path.clone());
    }
    if let Some(viewport) = args.viewport {
        cfg.browser.viewport = viewport;
    }
    if args.headful {
        cfg.browser.headless = false;
    }
}

/// Validate the fully merged config, naming the file it came from.
pub fn validate_config(cfg: &Config, path: Option<&Path>) -> Result<(), PtsError> {
    cfg.validate().map_err(|e| {
        let prefix = path
            .map(|p| format!("Invalid config ({}): {}", p.display(), e))
            .unwrap_or_else(|| format!("Invalid config: {}", e));
        PtsError::Config(prefix)
    })
}

/// Format effective config as a single-line string.
pub fn format_effective_config(cfg: &Config, config_source: Option<&Path>) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    let executable = cfg
        .browser
        .executable
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "auto".to_string());
    format!(
        "Effective config [{source}]: addr={}, environment={}, nav_timeout={}s, viewport={}, headless={}, chrome={}",
        cfg.server.addr(),
        cfg.browser.environment.description(),
        cfg.browser.navigation_timeout.as_secs(),
        cfg.browser.viewport,
        cfg.browser.headless,
        executable,
    )
}
