// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use std::env::{self, VarError};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_ENV: &str = "ORCAMENTO_LOG";
pub const LOG_FILE_NAME: &str = "orcamento.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Append to `orcamento.log` inside this directory.
    File(PathBuf),
}

/// `ORCAMENTO_LOG` wins over the configured directive.
pub fn resolve_filter(configured: &str) -> Result<EnvFilter> {
    match env::var(LOG_ENV) {
        Ok(directive) => build_filter(Some(&directive), configured),
        Err(VarError::NotPresent) => build_filter(None, configured),
        Err(VarError::NotUnicode(_)) => bail!("{LOG_ENV} is not valid UTF-8"),
    }
}

fn build_filter(from_env: Option<&str>, configured: &str) -> Result<EnvFilter> {
    if let Some(directive) = from_env {
        return EnvFilter::try_new(directive).with_context(|| {
            format!("invalid {LOG_ENV} value {directive:?}; unset it or try \"info\"")
        });
    }
    EnvFilter::try_new(configured).with_context(|| {
        format!("invalid log filter {configured:?}; try \"info\" or \"orcamento_app=debug\"")
    })
}

pub fn init(configured_filter: &str, target: &LogTarget) -> Result<()> {
    let filter = resolve_filter(configured_filter)?;
    match target {
        LogTarget::Stderr => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
                .context("install log subscriber")?;
        }
        LogTarget::File(dir) => {
            let file = open_log_file(dir)?;
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()
                .context("install log subscriber")?;
        }
    }
    Ok(())
}

fn open_log_file(dir: &Path) -> Result<fs::File> {
    fs::create_dir_all(dir).with_context(|| format!("create log directory {}", dir.display()))?;
    let path = dir.join(LOG_FILE_NAME);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))
}
