// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Apply configuration file
//!
//! TOML file holding the desired Datadog configuration for the CLI, with the
//! usual `DD_*` environment variables layered on top.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::keys;
use crate::reconcile::DesiredConfiguration;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Environment variables that override file values, by canonical key.
const ENV_OVERRIDES: [&str; 5] = [keys::DD_API_KEY, keys::DD_SITE, keys::DD_ENV, keys::DD_SERVICE, keys::DD_VERSION];

/// Configuration consumed by `plan` and `apply`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyConfig {
    #[serde(default)]
    pub log_level: LogLevel,
    pub datadog: DesiredConfiguration,
}

impl ApplyConfig {
    /// Load from TOML file
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_string(), source })?;
        Self::from_toml(&content)
    }

    /// Parse from TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay `DD_*` / `DATADOG_*` variables from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Overlay values from `lookup`. For each key the canonical name is
    /// tried before its aliases; empty values are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for canonical in ENV_OVERRIDES {
            let Some(entry) = keys::entry(canonical) else { continue };
            let found = entry
                .spellings()
                .find_map(|name| lookup(name).filter(|v| !v.trim().is_empty()).map(|v| (name, v)));
            let Some((name, value)) = found else { continue };
            log::debug!("config override from {}", name);

            let dd = &mut self.datadog;
            match canonical {
                keys::DD_API_KEY => dd.api_key = value,
                keys::DD_SITE => dd.site = value,
                keys::DD_ENV => dd.environment = value,
                keys::DD_SERVICE => dd.service = value,
                keys::DD_VERSION => dd.version = Some(value),
                _ => {}
            }
        }
    }

    /// Generate sample config
    pub fn sample_toml() -> String {
        r#"# Datadog APM configuration for an App Service
log_level = "Info"

[datadog]
# 32 hex characters; DD_API_KEY / DATADOG_API_KEY override this
api_key = "00000000000000000000000000000000"
site = "datadoghq.com"
service = "my-service"
environment = "production"
# version = "1.0.0"
log_path = "/home/LogFiles/*.log"
storage_enabled = false
is_dotnet = false

# Linux only: sidecar container
# [datadog.sidecar]
# image = "index.docker.io/datadog/serverless-init:latest"
# port = "8126"
# registry_url = "myregistry.azurecr.io"
# allow_broad_app_settings_access = true

# When is_dotnet = true; unset fields take the defaults
# [datadog.dotnet]
# tracer_home = "/datadog/tracer"
# enable_profiling = "1"
# profiler_id = "{846F5F1C-F9AE-4B07-969E-05C26BC060D8}"
# profiler_path = "/datadog/tracer/Datadog.Trace.ClrProfiler.Native.so"
# log_directory = "/home/LogFiles/dotnet"
"#
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_sample_parses() {
        let cfg = ApplyConfig::from_toml(&ApplyConfig::sample_toml()).unwrap();
        assert_eq!(cfg.log_level, LogLevel::Info);
        assert_eq!(cfg.datadog.service, "my-service");
        assert_eq!(cfg.datadog.site, "datadoghq.com");
        assert!(cfg.datadog.sidecar.is_none());
        assert!(crate::reconcile::validate(&cfg.datadog).is_ok());
    }

    #[test]
    fn test_sub_tables() {
        let cfg = ApplyConfig::from_toml(
            r#"
[datadog]
api_key = "k"
service = "api"
environment = "dev"
is_dotnet = true

[datadog.sidecar]
port = "9126"

[datadog.dotnet]
tracer_home = "/opt/dd"
"#,
        )
        .unwrap();
        assert_eq!(cfg.log_level, LogLevel::Info);
        assert_eq!(cfg.datadog.sidecar.unwrap().port.as_deref(), Some("9126"));
        assert_eq!(cfg.datadog.dotnet.unwrap().tracer_home.as_deref(), Some("/opt/dd"));
        assert_eq!(cfg.datadog.log_path, crate::reconcile::DEFAULT_LOG_PATH);
    }

    #[test]
    fn test_parse_error() {
        let err = ApplyConfig::from_toml("log_level = \"Info\"").unwrap_err();
        assert!(err.to_string().starts_with("TOML parse error"));
    }

    #[test]
    fn test_missing_file() {
        let err = ApplyConfig::from_toml_file("/nonexistent/apm.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/apm.toml"));
    }

    #[test]
    fn test_env_overrides() {
        let mut cfg = ApplyConfig::from_toml(&ApplyConfig::sample_toml()).unwrap();
        cfg.apply_overrides_from(env(&[
            ("DATADOG_API_KEY", "ffffffffffffffffffffffffffffffff"),
            ("DD_SITE", "datadoghq.eu"),
            ("DATADOG_SITE", "us5.datadoghq.com"),
            ("DD_VERSION", "2.1"),
            ("DD_SERVICE", "  "),
        ]));
        assert_eq!(cfg.datadog.api_key, "ffffffffffffffffffffffffffffffff");
        assert_eq!(cfg.datadog.site, "datadoghq.eu");
        assert_eq!(cfg.datadog.version.as_deref(), Some("2.1"));
        assert_eq!(cfg.datadog.service, "my-service");
        assert_eq!(cfg.datadog.environment, "production");
    }

    #[test]
    fn test_log_level_filter() {
        assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
        assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
    }
}
