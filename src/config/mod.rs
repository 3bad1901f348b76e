use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::theme::{Palette, DEFAULT_PALETTE};

pub const DEFAULT_BASE_URL: &str = "https://api.quotable.io";
pub const DEFAULT_REFRESH_SECS: u64 = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Quote provider root, e.g. https://api.quotable.io
    pub base_url: String,

    /// Tags the random quote is filtered to (joined with `|`)
    pub tags: Vec<String>,

    /// Wait before the auto-refresh timer starts ticking
    pub refresh_delay_secs: u64,

    /// Auto-refresh period
    pub refresh_interval_secs: u64,

    /// Per-request timeout; unset means wait as long as the provider takes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    /// Background colors as hex strings
    pub palette: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            tags: vec!["motivational".to_string(), "inspirational".to_string()],
            refresh_delay_secs: DEFAULT_REFRESH_SECS,
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
            request_timeout_secs: None,
            palette: DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// `<config_dir>/quoteline/config.toml`
    fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("quoteline").join("config.toml"))
    }

    /// Read the config file. A missing file is created with defaults; an
    /// unreadable one is left in place and defaults are used.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::path() else {
            return Ok(Self::default());
        };

        if !path.exists() {
            let config = Self::default();
            if let Err(e) = config.save_to(&path) {
                tracing::warn!("Could not write default config to {}: {}", path.display(), e);
            }
            return Ok(config);
        }

        let config = std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|content| Self::parse(&content))
            .unwrap_or_else(|e| {
                tracing::warn!("Ignoring config at {}: {}", path.display(), e);
                Self::default()
            });
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn refresh_delay(&self) -> Duration {
        Duration::from_secs(self.refresh_delay_secs)
    }

    /// A zero interval would refresh in a busy loop; use the default instead
    pub fn refresh_interval(&self) -> Duration {
        if self.refresh_interval_secs == 0 {
            tracing::warn!(
                "refresh_interval_secs = 0 is not allowed, using {}s",
                DEFAULT_REFRESH_SECS
            );
            return Duration::from_secs(DEFAULT_REFRESH_SECS);
        }
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn palette(&self) -> Palette {
        Palette::from_hex(self.palette.as_slice())
    }
}
