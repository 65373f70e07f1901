// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::env;
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Installs a file-backed subscriber when `[log].path` is set. The terminal
/// belongs to the UI, so nothing is ever written to stdout or stderr.
pub fn init(config: &Config) -> Result<bool> {
    let Some(path) = config.log_path() else {
        return Ok(false);
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {} -- check [log].path", path.display()))?;

    let env_spec = env::var("HOARD_LOG").ok();
    let filter = build_filter(env_spec.as_deref(), config.log_level())?;
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()
        .context("install tracing subscriber")?;
    Ok(true)
}

/// `HOARD_LOG` wins over the configured level when set and non-blank.
fn build_filter(env_spec: Option<&str>, level: &str) -> Result<EnvFilter> {
    match env_spec.map(str::trim).filter(|spec| !spec.is_empty()) {
        Some(spec) => EnvFilter::try_new(spec)
            .with_context(|| format!("parse HOARD_LOG directives {spec:?}")),
        None => EnvFilter::try_new(level).with_context(|| format!("parse log level {level:?}")),
    }
}
