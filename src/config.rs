// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Runtime configuration.
//!
//! Values come from `ZONESYNC_*` environment variables. When
//! `ZONESYNC_CONFIG` names a YAML file, every key present there overrides
//! the environment:
//!
//! ```yaml
//! api_url: http://pdns:8081
//! api_key: secret
//! server_id: localhost
//! timeout_secs: 10
//! auto_ptr: false
//! pretty_ipv6_ptr: true
//! history_path: /var/lib/zonesync/history.jsonl
//! editable_types: [A, AAAA, CNAME, MX, TXT]
//! reverse_zone_kind: Native
//! reverse_zone_masters: []
//! zones:
//!   example.com:
//!     auto_ptr: true
//!     editable_types: [A, AAAA]
//! ```

use crate::collaborators::{EditPolicy, SettingsStore};
use crate::constants::{
    DEFAULT_API_TIMEOUT_SECS, DEFAULT_API_URL, DEFAULT_EDITABLE_TYPES, DEFAULT_HISTORY_PATH,
    DEFAULT_SERVER_ID, SETTING_AUTO_PTR, SETTING_PRETTY_IPV6_PTR,
};
use crate::engine::auto_ptr::ReverseZoneTemplate;
use crate::records::RRType;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Per-zone overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ZoneConfig {
    /// Boolean settings by name, e.g. `auto_ptr`
    #[serde(flatten)]
    pub settings: HashMap<String, bool>,
    pub editable_types: Option<Vec<RRType>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub api_key: String,
    pub server_id: String,
    pub timeout: Duration,
    pub auto_ptr: bool,
    pub pretty_ipv6_ptr: bool,
    pub history_path: PathBuf,
    pub editable_types: Vec<RRType>,
    pub reverse_zone: ReverseZoneTemplate,
    /// Keyed by zone name without trailing dot
    pub zones: HashMap<String, ZoneConfig>,
}

#[derive(Debug, Deserialize)]
struct ConfigOverride {
    api_url: Option<String>,
    api_key: Option<String>,
    server_id: Option<String>,
    timeout_secs: Option<u64>,
    auto_ptr: Option<bool>,
    pretty_ipv6_ptr: Option<bool>,
    history_path: Option<PathBuf>,
    editable_types: Option<Vec<RRType>>,
    reverse_zone_kind: Option<String>,
    reverse_zone_masters: Option<Vec<String>>,
    #[serde(default)]
    zones: HashMap<String, ZoneConfig>,
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("parse {name}: '{other}' is not a boolean"),
    }
}

fn default_editable_types() -> Vec<RRType> {
    DEFAULT_EDITABLE_TYPES
        .iter()
        .filter_map(|t| t.parse().ok())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            server_id: DEFAULT_SERVER_ID.to_string(),
            timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            auto_ptr: false,
            pretty_ipv6_ptr: false,
            history_path: PathBuf::from(DEFAULT_HISTORY_PATH),
            editable_types: default_editable_types(),
            reverse_zone: ReverseZoneTemplate::default(),
            zones: HashMap::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(value) = lookup("ZONESYNC_API_URL") {
            config.api_url = value;
        }
        if let Some(value) = lookup("ZONESYNC_API_KEY") {
            config.api_key = value;
        }
        if let Some(value) = lookup("ZONESYNC_SERVER_ID") {
            config.server_id = value;
        }
        if let Some(value) = lookup("ZONESYNC_TIMEOUT_SECS") {
            let secs: u64 = value
                .trim()
                .parse()
                .with_context(|| "parse ZONESYNC_TIMEOUT_SECS")?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(value) = lookup("ZONESYNC_AUTO_PTR") {
            config.auto_ptr = parse_bool("ZONESYNC_AUTO_PTR", &value)?;
        }
        if let Some(value) = lookup("ZONESYNC_PRETTY_IPV6_PTR") {
            config.pretty_ipv6_ptr = parse_bool("ZONESYNC_PRETTY_IPV6_PTR", &value)?;
        }
        if let Some(value) = lookup("ZONESYNC_HISTORY_PATH") {
            config.history_path = PathBuf::from(value);
        }
        Ok(config)
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("ZONESYNC_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read ZONESYNC_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        Ok(config)
    }

    /// Apply a YAML override document on top of the current values.
    pub fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let override_cfg: ConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse zonesync config yaml")?;
        if let Some(value) = override_cfg.api_url {
            self.api_url = value;
        }
        if let Some(value) = override_cfg.api_key {
            self.api_key = value;
        }
        if let Some(value) = override_cfg.server_id {
            self.server_id = value;
        }
        if let Some(value) = override_cfg.timeout_secs {
            self.timeout = Duration::from_secs(value);
        }
        if let Some(value) = override_cfg.auto_ptr {
            self.auto_ptr = value;
        }
        if let Some(value) = override_cfg.pretty_ipv6_ptr {
            self.pretty_ipv6_ptr = value;
        }
        if let Some(value) = override_cfg.history_path {
            self.history_path = value;
        }
        if let Some(value) = override_cfg.editable_types {
            self.editable_types = value;
        }
        if let Some(value) = override_cfg.reverse_zone_kind {
            self.reverse_zone.kind = value;
        }
        if let Some(value) = override_cfg.reverse_zone_masters {
            self.reverse_zone.masters = value;
        }
        for (zone, zone_config) in override_cfg.zones {
            self.zones
                .insert(zone.trim_end_matches('.').to_string(), zone_config);
        }
        Ok(())
    }

    fn zone(&self, zone: &str) -> Option<&ZoneConfig> {
        self.zones.get(zone.trim_end_matches('.'))
    }
}

/// Settings and edit policy answered from a fixed [`Config`].
#[derive(Debug, Clone)]
pub struct StaticSettings {
    config: Config,
}

impl StaticSettings {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn global(&self, name: &str) -> bool {
        match name {
            SETTING_AUTO_PTR => self.config.auto_ptr,
            SETTING_PRETTY_IPV6_PTR => self.config.pretty_ipv6_ptr,
            _ => false,
        }
    }
}

#[async_trait]
impl SettingsStore for StaticSettings {
    async fn get_boolean_setting(&self, name: &str, zone: Option<&str>) -> bool {
        zone.and_then(|z| self.config.zone(z))
            .and_then(|z| z.settings.get(name).copied())
            .unwrap_or_else(|| self.global(name))
    }
}

#[async_trait]
impl EditPolicy for StaticSettings {
    async fn editable_types(&self, zone: &str) -> HashSet<RRType> {
        self.config
            .zone(zone)
            .and_then(|z| z.editable_types.clone())
            .unwrap_or_else(|| self.config.editable_types.clone())
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
