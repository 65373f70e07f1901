// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use hoard_app::{DEFAULT_JSON_FILE, DEFAULT_REPORT_FILE};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::runtime::ExportSettings;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "warn";
const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub export: Export,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            export: Export::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Export {
    pub dir: Option<String>,
    pub json_file: Option<String>,
    pub report_file: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub path: Option<String>,
    pub level: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("HOARD_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set HOARD_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(hoard_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
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
                    "config file {} is not versioned. Add `version = 1` and move values under [storage], [export], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Regenerate it with --print-example-config",
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
        if let Some(db_path) = &self.storage.db_path {
            hoard_db::validate_db_path(db_path)?;
        }

        for (key, value) in [
            ("export.json_file", &self.export.json_file),
            ("export.report_file", &self.export.report_file),
        ] {
            if let Some(file) = value
                && (file.trim().is_empty() || file.contains(['/', '\\']))
            {
                bail!(
                    "{key} in {} must be a bare file name, got {file:?}; use export.dir for the directory",
                    path.display()
                );
            }
        }

        if let Some(level) = &self.log.level
            && !LOG_LEVELS.contains(&level.as_str())
        {
            bail!(
                "log.level in {} must be one of {}, got {level:?}",
                path.display(),
                LOG_LEVELS.join("|")
            );
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => hoard_db::default_db_path(),
        }
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            dir: PathBuf::from(self.export.dir.as_deref().unwrap_or(".")),
            json_file: self
                .export
                .json_file
                .clone()
                .unwrap_or_else(|| DEFAULT_JSON_FILE.to_owned()),
            report_file: self
                .export
                .report_file
                .clone()
                .unwrap_or_else(|| DEFAULT_REPORT_FILE.to_owned()),
        }
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log.path.as_deref().map(PathBuf::from)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# hoard config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/hoard/hoard.db)\n# db_path = \"/absolute/path/to/hoard.db\"\n\n[export]\n# Directory for weapon exports; relative paths resolve against the working directory.\ndir = \".\"\njson_file = \"{}\"\nreport_file = \"{}\"\n\n[log]\n# Optional. Without a path nothing is logged; HOARD_LOG overrides the level.\n# path = \"/absolute/path/to/hoard.log\"\nlevel = \"{}\"\n",
            path.display(),
            DEFAULT_JSON_FILE,
            DEFAULT_REPORT_FILE,
            DEFAULT_LOG_LEVEL,
        )
    }
}
