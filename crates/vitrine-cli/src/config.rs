// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vitrine_app::{
    CurrentUser, DEFAULT_PAGE_SIZE, FeatureFlags, NavigationMode, OffererId, UserId,
};

const APP_NAME: &str = "vitrine";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_API_BASE_URL: &str = "http://localhost:5001";
const DEFAULT_API_TIMEOUT: &str = "10s";
const DEFAULT_LOG_LEVEL: &str = "warn";
const MAX_PAGE_SIZE: usize = 100;

pub const CONFIG_PATH_ENV: &str = "VITRINE_CONFIG_PATH";
pub const API_TOKEN_ENV: &str = "VITRINE_API_TOKEN";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub session: Session,
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            ui: Ui::default(),
            session: Session::default(),
            features: Features::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_API_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_API_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ui {
    pub page_size: Option<i64>,
    pub navigation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Session {
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub admin: Option<bool>,
    pub offerer_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Features {
    #[serde(default)]
    pub enabled: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
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
                    "config file {} is not versioned. Add `version = 1` and put values under [api], [ui], [session], [features] and [log]",
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
        if self.api_base_url().is_empty() {
            bail!("api.base_url in {} must not be empty", path.display());
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(page_size) = self.ui.page_size
            && !(1..=MAX_PAGE_SIZE as i64).contains(&page_size)
        {
            bail!(
                "ui.page_size in {} must be between 1 and {MAX_PAGE_SIZE}, got {}",
                path.display(),
                page_size
            );
        }

        if let Some(navigation) = &self.ui.navigation
            && NavigationMode::parse(navigation).is_none()
        {
            bail!(
                "ui.navigation in {} must be \"unified\" or \"legacy\", got {navigation:?}",
                path.display()
            );
        }

        if let Some(offerer_id) = self.session.offerer_id
            && offerer_id <= 0
        {
            bail!(
                "session.offerer_id in {} must be positive, got {}",
                path.display(),
                offerer_id
            );
        }

        if let Some(level) = &self.log.level {
            EnvFilter::try_new(level).with_context(|| {
                format!(
                    "log.level in {} is not a valid filter (for example \"info\" or \"vitrine_app=debug\")",
                    path.display()
                )
            })?;
        }

        Ok(())
    }

    pub fn api_base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim()
            .trim_end_matches('/')
    }

    pub fn api_timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_API_TIMEOUT))
    }

    pub fn api_token(&self) -> Option<String> {
        env::var(API_TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }

    pub fn page_size(&self) -> usize {
        self.ui
            .page_size
            .and_then(|size| usize::try_from(size).ok())
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn navigation(&self) -> NavigationMode {
        self.ui
            .navigation
            .as_deref()
            .and_then(NavigationMode::parse)
            .unwrap_or(NavigationMode::Unified)
    }

    pub fn current_user(&self) -> CurrentUser {
        CurrentUser {
            id: UserId::new(self.session.user_id.unwrap_or(1)),
            email: self.session.email.clone().unwrap_or_default(),
            is_admin: self.session.admin.unwrap_or(false),
            navigation: self.navigation(),
        }
    }

    pub fn offerer(&self) -> Option<OffererId> {
        self.session.offerer_id.map(OffererId::new)
    }

    pub fn features(&self) -> FeatureFlags {
        FeatureFlags::from_names(&self.features.enabled)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# vitrine config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nbase_url = \"{}\"\ntimeout = \"{}\"\n# The API token is read from {} and never stored here.\n\n[ui]\npage_size = {}\n# \"unified\" pins the offerer to the session, \"legacy\" takes it from the URL\nnavigation = \"unified\"\n\n[session]\nadmin = false\n# offerer_id = 1\n\n[features]\n# WIP_ENABLE_NEW_COLLECTIVE_OFFERS_AND_BOOKINGS_STRUCTURE, WIP_ENABLE_OFFER_ADDRESS\nenabled = []\n\n[log]\n# Overridden by VITRINE_LOG\nlevel = \"{}\"\n",
            path.display(),
            DEFAULT_API_BASE_URL,
            DEFAULT_API_TIMEOUT,
            API_TOKEN_ENV,
            DEFAULT_PAGE_SIZE,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
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
            .with_context(|| format!("timeout duration {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
