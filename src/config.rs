//! Load runtime configuration for share links.

use anyhow::Context;
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::codec::SHARE_QUERY_PARAM;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ShareCfg {
    pub origin: String,      // e.g. "https://journal.example.com"
    pub path: String,        // share route
    pub query_param: String, // carries the token
    pub max_url_len: usize,  // SMS/iMessage-safe budget
    pub env: Option<String>, // tag shown to the viewer; APP_ENV overrides
}

impl Default for ShareCfg {
    fn default() -> Self {
        Self {
            origin: "http://localhost:5173".to_string(),
            path: "/share".to_string(),
            query_param: SHARE_QUERY_PARAM.to_string(),
            max_url_len: 2000,
            env: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct FxCfg {
    pub cad_to_usd_rate: Option<f64>,
    pub fx_date: Option<String>, // YYYY-MM-DD the rate was observed
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub share: ShareCfg,
    pub fx: FxCfg,
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg: Self =
            serde_yaml::from_str(&s).with_context(|| format!("parse config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from the first config file that exists, or fall back to defaults.
    pub fn load_or_default(candidates: &[PathBuf]) -> anyhow::Result<Self> {
        match candidates.iter().find(|p| p.exists()) {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// `explicit` (from SHARE_CONFIG) first, then `./config.yaml`, then the
    /// per-user config directory.
    pub fn candidate_paths(explicit: Option<&str>) -> Vec<PathBuf> {
        if let Some(p) = explicit.filter(|p| !p.trim().is_empty()) {
            return vec![PathBuf::from(p)];
        }
        let mut paths = vec![PathBuf::from("config.yaml")];
        if let Some(dirs) = ProjectDirs::from("", "", "trade-share-link") {
            paths.push(dirs.config_dir().join("config.yaml"));
        }
        paths
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.share.query_param.is_empty() {
            anyhow::bail!("share.query_param must not be empty");
        }
        if let Some(rate) = self.fx.cad_to_usd_rate {
            if !(rate.is_finite() && rate > 0.0) {
                anyhow::bail!("fx.cad_to_usd_rate must be positive, got {}", rate);
            }
        }
        Ok(())
    }
}
