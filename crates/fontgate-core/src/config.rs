use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::FetchOptions;
use crate::proxy::Target;

/// Upstream hosts and local mount point for the reverse proxy (`[proxy]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Metadata/CSS host; every path outside `/static` goes here.
    pub api_base: String,
    /// Font-file host; `/static/...` goes here and its URLs are rewritten.
    pub static_base: String,
    /// Path the proxy is mounted under, e.g. "/fonts".
    pub local_prefix: String,
    /// Address `fontgate serve` listens on.
    pub listen: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            api_base: "https://fonts.googleapis.com".to_string(),
            static_base: "https://fonts.gstatic.com".to_string(),
            local_prefix: "/fonts".to_string(),
            listen: "127.0.0.1:8080".to_string(),
        }
    }
}

impl ProxyConfig {
    /// Both upstream bases must be absolute http(s) URLs with a host.
    pub fn validate(&self) -> Result<()> {
        Target::parse(&self.api_base).context("proxy.api_base")?;
        Target::parse(&self.static_base).context("proxy.static_base")?;
        Ok(())
    }
}

/// Timeouts for upstream requests (`[fetch]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub connect_timeout_secs: u64,
    /// Hard limit for one upstream transfer.
    pub timeout_secs: u64,
    /// Deadline for a whole request handled by `fontgate serve`.
    pub request_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 60,
            request_timeout_secs: 30,
        }
    }
}

impl FetchConfig {
    /// Largest accepted value for any of the timeouts.
    pub const MAX_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

    /// Every timeout must be at most `MAX_TIMEOUT_SECS`.
    pub fn validate(&self) -> Result<()> {
        for (name, secs) in [
            ("fetch.connect_timeout_secs", self.connect_timeout_secs),
            ("fetch.timeout_secs", self.timeout_secs),
            ("fetch.request_timeout_secs", self.request_timeout_secs),
        ] {
            if secs > Self::MAX_TIMEOUT_SECS {
                anyhow::bail!(
                    "{} = {} exceeds the maximum of {} seconds",
                    name,
                    secs,
                    Self::MAX_TIMEOUT_SECS
                );
            }
        }
        Ok(())
    }

    pub fn options(&self) -> FetchOptions {
        FetchOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Where fetched font bytes are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    None,
    #[default]
    Memory,
    Disk,
}

/// `[cache]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    /// Directory for the disk backend (None = XDG cache dir).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Global configuration loaded from `~/.config/fontgate/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontgateConfig {
    /// Directory catalog to use instead of the bundled one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_dir: Option<PathBuf>,
    pub proxy: ProxyConfig,
    pub fetch: FetchConfig,
    pub cache: CacheConfig,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("fontgate")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FontgateConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FontgateConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<FontgateConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: FontgateConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    cfg.proxy
        .validate()
        .and_then(|()| cfg.fetch.validate())
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
