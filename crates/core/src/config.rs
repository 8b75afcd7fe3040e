use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{LogvaultError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub http_addr: String,
    /// HS256 secret shared with the external token issuer. Mandatory: there
    /// is no built-in fallback value, and `load` fails when it is unset.
    pub auth_secret: String,
    pub page_size: u32,
    pub upload_max_bytes: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut cfg = Self::base();
        let config_path = config_file_path();
        if let Some(file_overrides) = load_file_overrides(&config_path)? {
            apply_overrides(&mut cfg, file_overrides);
        }
        apply_overrides(&mut cfg, load_env_overrides()?);
        cfg.ensure_secret()?;
        Ok(cfg)
    }

    fn base() -> Self {
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let data_root = env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(home).join(".local/share"));

        Self {
            db_path: data_root.join("logvault/logvault.duckdb"),
            http_addr: "127.0.0.1:8180".to_string(),
            auth_secret: String::new(),
            page_size: 100,
            upload_max_bytes: 50 * 1024 * 1024,
        }
    }

    fn ensure_secret(&self) -> Result<()> {
        if self.auth_secret.is_empty() {
            return Err(LogvaultError::Config(
                "auth_secret is required: set LOGVAULT_AUTH_SECRET or add auth_secret to the config file".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    db_path: Option<PathBuf>,
    http_addr: Option<String>,
    auth_secret: Option<String>,
    page_size: Option<u32>,
    upload_max_bytes: Option<usize>,
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("LOGVAULT_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("logvault/config.toml")
}

fn load_file_overrides(path: &PathBuf) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| LogvaultError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: ConfigOverrides = toml::from_str(&raw)
        .map_err(|e| LogvaultError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn load_env_overrides() -> Result<ConfigOverrides> {
    let page_size = match env::var("LOGVAULT_PAGE_SIZE") {
        Ok(v) => Some(v.parse::<u32>().map_err(|e| {
            LogvaultError::Config(format!("bad LOGVAULT_PAGE_SIZE in environment: {e}"))
        })?),
        Err(_) => None,
    };
    let upload_max_bytes = match env::var("LOGVAULT_UPLOAD_MAX_BYTES") {
        Ok(v) => Some(v.parse::<usize>().map_err(|e| {
            LogvaultError::Config(format!("bad LOGVAULT_UPLOAD_MAX_BYTES in environment: {e}"))
        })?),
        Err(_) => None,
    };

    Ok(ConfigOverrides {
        db_path: env::var("LOGVAULT_DB_PATH").ok().map(PathBuf::from),
        http_addr: env::var("LOGVAULT_HTTP_ADDR").ok(),
        auth_secret: env::var("LOGVAULT_AUTH_SECRET").ok(),
        page_size,
        upload_max_bytes,
    })
}

fn apply_overrides(cfg: &mut Config, overrides: ConfigOverrides) {
    if let Some(v) = overrides.db_path {
        cfg.db_path = v;
    }
    if let Some(v) = overrides.http_addr {
        cfg.http_addr = v;
    }
    if let Some(v) = overrides.auth_secret {
        cfg.auth_secret = v;
    }
    if let Some(v) = overrides.page_size {
        cfg.page_size = v;
    }
    if let Some(v) = overrides.upload_max_bytes {
        cfg.upload_max_bytes = v;
    }
}
