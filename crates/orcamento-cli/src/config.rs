// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use orcamento_pdf::DEFAULT_SERVICE_URL;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "orcamento";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_TIMEOUT: &str = "30s";
const DEFAULT_LOG_FILTER: &str = "info";
pub const CONFIG_PATH_ENV: &str = "ORCAMENTO_CONFIG_PATH";
pub const DOCUMENTS_DIR_ENV: &str = "ORCAMENTO_DOCUMENTS_DIR";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub service: Service,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub share: Share,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            service: Service::default(),
            storage: Storage::default(),
            catalog: Catalog::default(),
            share: Share::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
    pub url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Service {
    fn default() -> Self {
        Self {
            url: Some(DEFAULT_SERVICE_URL.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub documents_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Share {
    pub command: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub filter: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [service], [storage], [catalog], [share], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(url) = &self.service.url {
            orcamento_pdf::parse_service_url(url)
                .with_context(|| format!("invalid [service] url in {}", path.display()))?;
        }

        if let Some(timeout) = &self.service.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "service.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(dir) = &self.storage.documents_dir
            && dir.trim().is_empty()
        {
            bail!(
                "storage.documents_dir in {} must not be empty; remove it to use the default",
                path.display()
            );
        }

        if let Some(command) = &self.share.command
            && command.trim().is_empty()
        {
            bail!(
                "share.command in {} must not be empty; remove it to only save documents",
                path.display()
            );
        }

        Ok(())
    }

    pub fn service_url(&self) -> &str {
        self.service.url.as_deref().unwrap_or(DEFAULT_SERVICE_URL)
    }

    pub fn service_timeout(&self) -> Result<Duration> {
        parse_duration(self.service.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    /// `[storage] documents_dir`, else `ORCAMENTO_DOCUMENTS_DIR`, else the
    /// platform documents folder.
    pub fn documents_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.documents_dir {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = env::var_os(DOCUMENTS_DIR_ENV)
            && !dir.is_empty()
        {
            return Ok(PathBuf::from(dir));
        }
        let root = dirs::document_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
            .ok_or_else(|| {
                anyhow!(
                    "cannot resolve documents directory; set [storage].documents_dir or {DOCUMENTS_DIR_ENV}"
                )
            })?;
        Ok(root.join(APP_NAME))
    }

    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog.path.as_deref().map(PathBuf::from)
    }

    pub fn share_command(&self) -> Option<&str> {
        self.share.command.as_deref().map(str::trim)
    }

    pub fn log_filter(&self) -> &str {
        self.log.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# orcamento config\n# Place this file at: {}\n\nversion = 1\n\n[service]\nurl = \"{}\"\ntimeout = \"{}\"\n\n[storage]\n# Optional. Default is the platform documents dir (for example ~/Documents/orcamento)\n# documents_dir = \"/absolute/path/to/pdfs\"\n\n[catalog]\n# Optional. JSON list of categories replacing the bundled one\n# path = \"/absolute/path/to/catalog.json\"\n\n[share]\n# Optional. Program run with the saved PDF path appended\n# command = \"xdg-open\"\n\n[log]\nfilter = \"{}\"\n",
            path.display(),
            DEFAULT_SERVICE_URL,
            DEFAULT_TIMEOUT,
            DEFAULT_LOG_FILTER,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("timeout duration {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 30s)")
}
