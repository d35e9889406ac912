use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::dataset::DEFAULT_DATA_FILE;
use crate::session::SessionConfig;

const CACHE_DIR: &str = "season_radar";
const LOG_FILE: &str = "season_radar.log";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub log_path: Option<PathBuf>,
    pub session: SessionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            log_path: None,
            session: SessionConfig::full(),
        }
    }
}

impl AppConfig {
    /// Defaults, then the JSON file (explicit path or `RADAR_CONFIG`), then env.
    pub fn resolve(config_file: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let file = config_file
            .map(Path::to_path_buf)
            .or_else(|| non_empty_env("RADAR_CONFIG").map(PathBuf::from));
        let mut cfg = match file {
            Some(path) => Self::load_file(&path)?,
            None => Self::default(),
        };
        cfg.apply_env();
        cfg.session = cfg.session.normalized();
        Ok(cfg)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        serde_json::from_str::<Self>(&raw)
            .with_context(|| format!("parse config {}", path.display()))
    }

    pub fn save_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(&tmp, json).context("write config")?;
        fs::rename(&tmp, path).context("swap config")?;
        Ok(())
    }

    pub fn apply_env(&mut self) {
        if let Some(path) = non_empty_env("RADAR_DATA_PATH") {
            self.data_path = PathBuf::from(path);
        }
        if let Some(path) = non_empty_env("RADAR_LOG_FILE") {
            self.log_path = Some(PathBuf::from(path));
        }
        if let Some(max) = env::var("RADAR_MAX_PLAYERS")
            .ok()
            .and_then(|val| val.trim().parse::<usize>().ok())
        {
            self.session.max_players = max;
        }
        if let Some(flag) = env::var("RADAR_TEMPLATE_MODE")
            .ok()
            .and_then(|val| parse_bool(&val))
        {
            self.session.enable_template_mode = flag;
        }
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(default_log_path)
    }
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Some(base) = non_empty_env("XDG_CACHE_HOME") {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = non_empty_env("HOME")?;
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

pub fn default_log_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(LOG_FILE))
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
