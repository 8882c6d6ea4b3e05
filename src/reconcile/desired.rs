// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Desired monitoring configuration and the settings it produces

use serde::{Deserialize, Serialize};

use crate::client::SidecarRequest;
use crate::keys;
use crate::monitoring::DEFAULT_SIDECAR_PORT;
use crate::settings::SettingsMap;

pub const DEFAULT_SITE: &str = "datadoghq.com";
pub const DEFAULT_LOG_PATH: &str = "/home/LogFiles/*.log";
pub const DEFAULT_SIDECAR_IMAGE: &str = "index.docker.io/datadog/serverless-init:latest";

/// Host the sidecar is reachable on from the main container.
pub const SIDECAR_HOST: &str = "localhost";
pub const DOGSTATSD_PORT: u16 = 8125;

pub const DEFAULT_DOTNET_TRACER_HOME: &str = "/datadog/tracer";
pub const DEFAULT_CORECLR_ENABLE_PROFILING: &str = "1";
pub const DEFAULT_CORECLR_PROFILER: &str = "{846F5F1C-F9AE-4B07-969E-05C26BC060D8}";
pub const DEFAULT_CORECLR_PROFILER_PATH: &str = "/datadog/tracer/Datadog.Trace.ClrProfiler.Native.so";
pub const DEFAULT_DOTNET_LOG_DIRECTORY: &str = "/home/LogFiles/dotnet";

/// Datadog intake sites accepted by validation.
pub const KNOWN_SITES: &[&str] = &[
    "datadoghq.com",
    "us3.datadoghq.com",
    "us5.datadoghq.com",
    "datadoghq.eu",
    "ap1.datadoghq.com",
    "ddog-gov.com",
];

/// Sidecar container options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidecarOptions {
    pub image: Option<String>,
    pub port: Option<String>,
    pub registry_url: Option<String>,
    pub startup_command: Option<String>,
    pub allow_broad_app_settings_access: Option<bool>,
}

impl SidecarOptions {
    /// Configured port, trimmed, or the default when unset or blank.
    pub fn port_or_default(&self) -> &str {
        self.port.as_deref().map(str::trim).filter(|p| !p.is_empty()).unwrap_or(DEFAULT_SIDECAR_PORT)
    }

    /// Request sent to the provider, with defaults filled in.
    pub fn to_request(&self) -> SidecarRequest {
        SidecarRequest {
            image: trimmed(&self.image).unwrap_or(DEFAULT_SIDECAR_IMAGE).to_string(),
            port: self.port_or_default().to_string(),
            registry_url: trimmed(&self.registry_url).map(str::to_string),
            startup_command: trimmed(&self.startup_command).map(str::to_string),
            allow_broad_app_settings_access: self.allow_broad_app_settings_access.unwrap_or(true),
        }
    }
}

fn trimmed(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// .NET profiler options; absent fields take the documented defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotnetOptions {
    pub tracer_home: Option<String>,
    pub enable_profiling: Option<String>,
    pub profiler_id: Option<String>,
    pub profiler_path: Option<String>,
    pub log_directory: Option<String>,
}

impl DotnetOptions {
    /// The five .NET settings in table order, defaults applied.
    pub fn settings(&self) -> [(&'static str, String); 5] {
        let or = |v: &Option<String>, d: &str| v.clone().unwrap_or_else(|| d.to_string());
        [
            (keys::DD_DOTNET_TRACER_HOME, or(&self.tracer_home, DEFAULT_DOTNET_TRACER_HOME)),
            (keys::CORECLR_ENABLE_PROFILING, or(&self.enable_profiling, DEFAULT_CORECLR_ENABLE_PROFILING)),
            (keys::CORECLR_PROFILER, or(&self.profiler_id, DEFAULT_CORECLR_PROFILER)),
            (keys::CORECLR_PROFILER_PATH, or(&self.profiler_path, DEFAULT_CORECLR_PROFILER_PATH)),
            (keys::DD_TRACE_LOG_DIRECTORY, or(&self.log_directory, DEFAULT_DOTNET_LOG_DIRECTORY)),
        ]
    }
}

/// User intent for monitoring a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredConfiguration {
    pub api_key: String,
    #[serde(default = "default_site")]
    pub site: String,
    pub service: String,
    pub environment: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default = "default_log_path")]
    pub log_path: String,
    #[serde(default)]
    pub is_dotnet: bool,
    #[serde(default)]
    pub storage_enabled: bool,
    #[serde(default)]
    pub sidecar: Option<SidecarOptions>,
    #[serde(default)]
    pub dotnet: Option<DotnetOptions>,
}

fn default_site() -> String {
    DEFAULT_SITE.to_string()
}

fn default_log_path() -> String {
    DEFAULT_LOG_PATH.to_string()
}

impl DesiredConfiguration {
    pub fn new(api_key: impl Into<String>, service: impl Into<String>, environment: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            site: default_site(),
            service: service.into(),
            environment: environment.into(),
            version: None,
            log_path: default_log_path(),
            is_dotnet: false,
            storage_enabled: false,
            sidecar: None,
            dotnet: None,
        }
    }

    /// Sidecar request with defaults for anything left unset.
    pub fn sidecar_request(&self) -> SidecarRequest {
        self.sidecar.clone().unwrap_or_default().to_request()
    }
}

/// Compute the Datadog settings a configuration requires.
///
/// Values are serialized to strings here; nothing native reaches the merge.
/// Text fields are written trimmed, matching what [`super::validate`] checks.
pub fn build_desired_settings(cfg: &DesiredConfiguration) -> SettingsMap {
    let mut out = SettingsMap::new();
    out.insert(keys::DD_API_KEY, cfg.api_key.trim());
    out.insert(keys::DD_SITE, cfg.site.trim());
    out.insert(keys::DD_SERVICE, cfg.service.trim());
    out.insert(keys::DD_ENV, cfg.environment.trim());
    out.insert(keys::DD_SERVERLESS_LOG_PATH, cfg.log_path.trim());
    out.insert(keys::WEBSITES_ENABLE_APP_SERVICE_STORAGE, keys::bool_str(cfg.storage_enabled));
    out.insert(keys::DD_APM_ENABLED, keys::bool_str(true));
    if let Some(version) = trimmed(&cfg.version) {
        out.insert(keys::DD_VERSION, version);
    }

    if cfg.is_dotnet {
        for (key, value) in cfg.dotnet.clone().unwrap_or_default().settings() {
            out.insert(key, value);
        }
    } else {
        let port = cfg.sidecar.as_ref().map(|s| s.port_or_default()).unwrap_or(DEFAULT_SIDECAR_PORT);
        out.insert(keys::DD_TRACE_AGENT_URL, format!("http://{}:{}", SIDECAR_HOST, port));
        out.insert(keys::DD_DOGSTATSD_URL, format!("udp://{}:{}", SIDECAR_HOST, DOGSTATSD_PORT));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_required_keys_always_set() {
        let s = build_desired_settings(&DesiredConfiguration::new(KEY, "web", "prod"));
        assert_eq!(s.get("DD_API_KEY"), Some(KEY));
        assert_eq!(s.get("DD_SITE"), Some("datadoghq.com"));
        assert_eq!(s.get("DD_SERVICE"), Some("web"));
        assert_eq!(s.get("DD_ENV"), Some("prod"));
        assert_eq!(s.get("DD_SERVERLESS_LOG_PATH"), Some(DEFAULT_LOG_PATH));
        assert_eq!(s.get("WEBSITES_ENABLE_APP_SERVICE_STORAGE"), Some("false"));
        assert_eq!(s.get("DD_APM_ENABLED"), Some("true"));
        assert!(!s.contains_key("DD_VERSION"));
    }

    #[test]
    fn test_version_only_when_present() {
        let mut cfg = DesiredConfiguration::new(KEY, "web", "prod");
        cfg.version = Some("1.2.3".into());
        assert_eq!(build_desired_settings(&cfg).get("DD_VERSION"), Some("1.2.3"));
    }

    #[test]
    fn test_non_dotnet_gets_sidecar_urls() {
        let s = build_desired_settings(&DesiredConfiguration::new(KEY, "web", "prod"));
        assert_eq!(s.get("DD_TRACE_AGENT_URL"), Some("http://localhost:8126"));
        assert_eq!(s.get("DD_DOGSTATSD_URL"), Some("udp://localhost:8125"));
        for key in keys::DOTNET_KEYS {
            assert!(!s.contains_key(key));
        }
    }

    #[test]
    fn test_sidecar_port_flows_into_agent_url() {
        let mut cfg = DesiredConfiguration::new(KEY, "web", "prod");
        cfg.sidecar = Some(SidecarOptions { port: Some("9126".into()), ..Default::default() });
        assert_eq!(build_desired_settings(&cfg).get("DD_TRACE_AGENT_URL"), Some("http://localhost:9126"));
    }

    #[test]
    fn test_dotnet_defaults() {
        let mut cfg = DesiredConfiguration::new(KEY, "api", "prod");
        cfg.is_dotnet = true;
        let s = build_desired_settings(&cfg);
        assert_eq!(s.get("DD_DOTNET_TRACER_HOME"), Some(DEFAULT_DOTNET_TRACER_HOME));
        assert_eq!(s.get("CORECLR_ENABLE_PROFILING"), Some("1"));
        assert_eq!(s.get("CORECLR_PROFILER"), Some(DEFAULT_CORECLR_PROFILER));
        assert_eq!(s.get("CORECLR_PROFILER_PATH"), Some(DEFAULT_CORECLR_PROFILER_PATH));
        assert_eq!(s.get("DD_TRACE_LOG_DIRECTORY"), Some(DEFAULT_DOTNET_LOG_DIRECTORY));
        assert!(!s.contains_key("DD_TRACE_AGENT_URL"));
    }

    #[test]
    fn test_dotnet_overrides() {
        let mut cfg = DesiredConfiguration::new(KEY, "api", "prod");
        cfg.is_dotnet = true;
        cfg.dotnet = Some(DotnetOptions { tracer_home: Some("/opt/dd".into()), ..Default::default() });
        let s = build_desired_settings(&cfg);
        assert_eq!(s.get("DD_DOTNET_TRACER_HOME"), Some("/opt/dd"));
        assert_eq!(s.get("CORECLR_ENABLE_PROFILING"), Some("1"));
    }

    #[test]
    fn test_storage_flag_serialized() {
        let mut cfg = DesiredConfiguration::new(KEY, "web", "prod");
        cfg.storage_enabled = true;
        assert_eq!(build_desired_settings(&cfg).get("WEBSITES_ENABLE_APP_SERVICE_STORAGE"), Some("true"));
    }

    #[test]
    fn test_sidecar_request_defaults() {
        let req = DesiredConfiguration::new(KEY, "web", "prod").sidecar_request();
        assert_eq!(req.image, DEFAULT_SIDECAR_IMAGE);
        assert_eq!(req.port, "8126");
        assert!(req.allow_broad_app_settings_access);
    }

    #[test]
    fn test_padded_values_written_trimmed() {
        let mut cfg = DesiredConfiguration::new(KEY, "web", " prod ");
        cfg.site = " datadoghq.eu".into();
        cfg.version = Some("  ".into());
        cfg.sidecar = Some(SidecarOptions {
            port: Some(" 9126 ".into()),
            image: Some(" datadog/serverless-init:1 ".into()),
            ..Default::default()
        });
        assert!(crate::reconcile::validate(&cfg).is_ok());

        let s = build_desired_settings(&cfg);
        assert_eq!(s.get("DD_SITE"), Some("datadoghq.eu"));
        assert_eq!(s.get("DD_ENV"), Some("prod"));
        assert_eq!(s.get("DD_TRACE_AGENT_URL"), Some("http://localhost:9126"));
        assert!(!s.contains_key("DD_VERSION"));

        let req = cfg.sidecar_request();
        assert_eq!(req.port, "9126");
        assert_eq!(req.image, "datadog/serverless-init:1");
    }

    #[test]
    fn test_deserialize_minimal() {
        let cfg: DesiredConfiguration =
            serde_json::from_str(r#"{"api_key":"k","service":"s","environment":"e"}"#).unwrap();
        assert_eq!(cfg.site, DEFAULT_SITE);
        assert_eq!(cfg.log_path, DEFAULT_LOG_PATH);
        assert!(cfg.sidecar.is_none());
    }
}
