// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Inverse path: existing settings back into form fields

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::desired::{DesiredConfiguration, DotnetOptions, SidecarOptions, DEFAULT_LOG_PATH, DEFAULT_SITE};
use super::redact::redact;
use crate::keys;
use crate::settings::SettingsMap;

/// Configuration form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    ApiKey,
    Site,
    Service,
    Environment,
    Version,
    LogPath,
    StorageEnabled,
    IsDotNet,
    DotnetTracerHome,
    DotnetEnableProfiling,
    DotnetProfilerId,
    DotnetProfilerPath,
    DotnetLogDirectory,
    SidecarPort,
}

impl FormField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ApiKey => "apiKey",
            Self::Site => "site",
            Self::Service => "service",
            Self::Environment => "environment",
            Self::Version => "version",
            Self::LogPath => "logPath",
            Self::StorageEnabled => "storageEnabled",
            Self::IsDotNet => "isDotNet",
            Self::DotnetTracerHome => "dotnetTracerHome",
            Self::DotnetEnableProfiling => "dotnetEnableProfiling",
            Self::DotnetProfilerId => "dotnetProfilerId",
            Self::DotnetProfilerPath => "dotnetProfilerPath",
            Self::DotnetLogDirectory => "dotnetLogDirectory",
            Self::SidecarPort => "sidecarPort",
        }
    }
}

/// Canonical key → form field, in precedence order. Aliases are resolved by
/// [`keys::lookup`], canonical spelling first.
const FIELD_TABLE: &[(&str, FormField)] = &[
    (keys::DD_API_KEY, FormField::ApiKey),
    (keys::DD_SITE, FormField::Site),
    (keys::DD_SERVICE, FormField::Service),
    (keys::DD_ENV, FormField::Environment),
    (keys::DD_VERSION, FormField::Version),
    (keys::DD_SERVERLESS_LOG_PATH, FormField::LogPath),
    (keys::WEBSITES_ENABLE_APP_SERVICE_STORAGE, FormField::StorageEnabled),
    (keys::DD_DOTNET_TRACER_HOME, FormField::DotnetTracerHome),
    (keys::CORECLR_ENABLE_PROFILING, FormField::DotnetEnableProfiling),
    (keys::CORECLR_PROFILER, FormField::DotnetProfilerId),
    (keys::CORECLR_PROFILER_PATH, FormField::DotnetProfilerPath),
    (keys::DD_TRACE_LOG_DIRECTORY, FormField::DotnetLogDirectory),
];

/// Form values recovered from existing settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormValues {
    /// Unredacted values; redact only when displaying.
    pub fields: BTreeMap<FormField, String>,
    pub updated_field_names: Vec<String>,
    pub api_key_found: bool,
}

impl FormValues {
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    fn flag(&self, field: FormField) -> bool {
        self.get(field) == Some("true")
    }

    /// Field values safe to print.
    pub fn redacted(&self) -> BTreeMap<FormField, String> {
        self.fields
            .iter()
            .map(|(field, value)| match field {
                FormField::ApiKey => (*field, redact(keys::DD_API_KEY, value)),
                _ => (*field, value.clone()),
            })
            .collect()
    }

    /// Build a configuration from these values, filling gaps with the
    /// documented defaults.
    pub fn to_configuration(&self) -> DesiredConfiguration {
        let text = |field| self.get(field).unwrap_or_default().to_string();
        let mut cfg = DesiredConfiguration::new(text(FormField::ApiKey), text(FormField::Service), text(FormField::Environment));
        cfg.site = self.get(FormField::Site).unwrap_or(DEFAULT_SITE).to_string();
        cfg.version = self.get(FormField::Version).map(str::to_string);
        cfg.log_path = self.get(FormField::LogPath).unwrap_or(DEFAULT_LOG_PATH).to_string();
        cfg.storage_enabled = self.flag(FormField::StorageEnabled);
        cfg.is_dotnet = self.flag(FormField::IsDotNet);
        if let Some(port) = self.get(FormField::SidecarPort) {
            cfg.sidecar = Some(SidecarOptions { port: Some(port.to_string()), ..Default::default() });
        }
        if cfg.is_dotnet {
            let opt = |field| self.get(field).map(str::to_string);
            cfg.dotnet = Some(DotnetOptions {
                tracer_home: opt(FormField::DotnetTracerHome),
                enable_profiling: opt(FormField::DotnetEnableProfiling),
                profiler_id: opt(FormField::DotnetProfilerId),
                profiler_path: opt(FormField::DotnetProfilerPath),
                log_directory: opt(FormField::DotnetLogDirectory),
            });
        }
        cfg
    }
}

/// Port of a trace agent URL such as `http://localhost:9126`.
fn agent_port(url: &str) -> Option<String> {
    let url = url.trim();
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split('/').next().unwrap_or_default();
    let (_, port) = authority.rsplit_once(':')?;
    port.parse::<u16>().ok().filter(|p| *p > 0).map(|p| p.to_string())
}

/// Read recognized settings into form fields.
///
/// Iterates the fixed field table, never the map, so the result is the same
/// whatever order the settings arrive in. Unrecognized keys are ignored. Any
/// .NET profiler key forces `isDotNet`. The sidecar port is read back from
/// the trace agent URL; the host is always rewritten to the sidecar host.
/// [`keys::WRITE_ONLY_KEYS`] have no field.
pub fn extract_form_values(current: &SettingsMap) -> FormValues {
    let mut values = FormValues::default();

    for (canonical, field) in FIELD_TABLE {
        let Some((stored_key, raw)) = keys::lookup(current, canonical) else {
            continue;
        };
        let value = keys::normalize_value(canonical, raw);
        log::debug!("prefill {} from {}", field.name(), stored_key);
        values.fields.insert(*field, value);
        values.updated_field_names.push(field.name().to_string());
        if *field == FormField::ApiKey {
            values.api_key_found = true;
        }
    }

    if let Some((stored_key, url)) = keys::lookup(current, keys::DD_TRACE_AGENT_URL) {
        match agent_port(url) {
            Some(port) => {
                values.fields.insert(FormField::SidecarPort, port);
                values.updated_field_names.push(FormField::SidecarPort.name().to_string());
            }
            None => log::warn!("{} has no usable port, keeping the default", stored_key),
        }
    }

    let has_dotnet = keys::DOTNET_KEYS.iter().any(|k| keys::lookup(current, k).is_some());
    if has_dotnet {
        values.fields.insert(FormField::IsDotNet, keys::bool_str(true).to_string());
        values.updated_field_names.push(FormField::IsDotNet.name().to_string());
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::build_desired_settings;
    use crate::settings::merge;

    fn map(pairs: &[(&str, &str)]) -> SettingsMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_storage_true_normalized() {
        let v = extract_form_values(&map(&[("WEBSITES_ENABLE_APP_SERVICE_STORAGE", "True")]));
        assert_eq!(v.get(FormField::StorageEnabled), Some("true"));
    }

    #[test]
    fn test_storage_unknown_value_is_false() {
        let v = extract_form_values(&map(&[("WEBSITES_ENABLE_APP_SERVICE_STORAGE", "yes")]));
        assert_eq!(v.get(FormField::StorageEnabled), Some("false"));
    }

    #[test]
    fn test_aliases_and_api_key_found() {
        let v = extract_form_values(&map(&[
            ("DATADOG_API_KEY", "0123456789abcdef0123456789abcdef"),
            ("DATADOG_SITE", "datadoghq.eu"),
            ("DD_SERVICE", "web"),
            ("UNRELATED", "ignored"),
        ]));
        assert!(v.api_key_found);
        assert_eq!(v.get(FormField::ApiKey), Some("0123456789abcdef0123456789abcdef"));
        assert_eq!(v.get(FormField::Site), Some("datadoghq.eu"));
        assert_eq!(v.updated_field_names, vec!["apiKey", "site", "service"]);
        assert_eq!(v.fields.len(), 3);
    }

    #[test]
    fn test_canonical_beats_alias() {
        let v = extract_form_values(&map(&[("DATADOG_ENV", "old"), ("DD_ENV", "new")]));
        assert_eq!(v.get(FormField::Environment), Some("new"));
        assert_eq!(v.updated_field_names, vec!["environment"]);
    }

    #[test]
    fn test_order_independent() {
        let pairs = [
            ("DD_VERSION", "2.0"),
            ("DATADOG_VERSION", "1.0"),
            ("CORECLR_PROFILER", "{x}"),
            ("DD_SITE", "datadoghq.com"),
        ];
        let forward = extract_form_values(&map(&pairs));
        let mut reversed_pairs = pairs;
        reversed_pairs.reverse();
        let backward = extract_form_values(&map(&reversed_pairs));
        assert_eq!(forward, backward);
        assert_eq!(forward.get(FormField::Version), Some("2.0"));
    }

    #[test]
    fn test_dotnet_key_forces_flag() {
        let v = extract_form_values(&map(&[("CORECLR_PROFILER_PATH", "/p.so")]));
        assert_eq!(v.get(FormField::IsDotNet), Some("true"));
        assert!(v.updated_field_names.contains(&"isDotNet".to_string()));
        assert!(!v.api_key_found);
    }

    #[test]
    fn test_redaction_is_display_only() {
        let v = extract_form_values(&map(&[("DD_API_KEY", "0123456789abcdef0123456789abcdef")]));
        assert_eq!(v.redacted()[&FormField::ApiKey], format!("{}def", "*".repeat(29)));
        assert_eq!(v.get(FormField::ApiKey), Some("0123456789abcdef0123456789abcdef"));
    }

    #[test]
    fn test_empty_settings() {
        let v = extract_form_values(&SettingsMap::new());
        assert!(v.fields.is_empty());
        assert!(!v.api_key_found);
        let cfg = v.to_configuration();
        assert_eq!(cfg.site, DEFAULT_SITE);
        assert_eq!(cfg.log_path, DEFAULT_LOG_PATH);
        assert!(!cfg.is_dotnet);
    }

    fn assert_round_trip(current: SettingsMap) {
        let cfg = extract_form_values(&current).to_configuration();
        let merged = merge(&current, &build_desired_settings(&cfg));
        for (key, value) in current.iter() {
            let Some(canonical) = keys::canonical_key(key) else { continue };
            if keys::WRITE_ONLY_KEYS.contains(&canonical) {
                continue;
            }
            assert_eq!(
                merged.get(key).map(|v| keys::normalize_value(canonical, v)),
                Some(keys::normalize_value(canonical, value)),
                "key {key}"
            );
            // The canonical spelling the forward path writes must agree too.
            assert_eq!(
                keys::lookup_value(&merged, canonical),
                keys::lookup_value(&current, canonical),
                "{canonical} resolved from {key}"
            );
        }
    }

    #[test]
    fn test_round_trip_sidecar_service() {
        assert_round_trip(map(&[
            ("DD_API_KEY", "0123456789abcdef0123456789abcdef"),
            ("DATADOG_SITE", "us5.datadoghq.com"),
            ("DD_SERVICE", "checkout"),
            ("DD_ENV", "prod"),
            ("DD_VERSION", "7.1"),
            ("DD_SERVERLESS_LOG_PATH", "/home/LogFiles/app/*.log"),
            ("WEBSITES_ENABLE_APP_SERVICE_STORAGE", "True"),
            ("APP_SETTING", "kept"),
        ]));
    }

    #[test]
    fn test_round_trip_custom_agent_port() {
        assert_round_trip(map(&[
            ("DD_API_KEY", "0123456789abcdef0123456789abcdef"),
            ("DD_SERVICE", "checkout"),
            ("DD_ENV", "prod"),
            ("DD_TRACE_AGENT_URL", "http://localhost:9126"),
            ("DD_DOGSTATSD_URL", "udp://localhost:8125"),
        ]));
    }

    #[test]
    fn test_agent_port_read_back() {
        let v = extract_form_values(&map(&[("DD_TRACE_AGENT_URL", "http://localhost:9126/")]));
        assert_eq!(v.get(FormField::SidecarPort), Some("9126"));
        assert_eq!(v.updated_field_names, vec!["sidecarPort"]);
        assert_eq!(v.to_configuration().sidecar_request().port, "9126");

        for url in ["http://localhost", "not a url", "http://localhost:0", "http://localhost:99999"] {
            let v = extract_form_values(&map(&[("DD_TRACE_AGENT_URL", url)]));
            assert_eq!(v.get(FormField::SidecarPort), None, "url {url}");
            assert!(v.to_configuration().sidecar.is_none());
        }
    }

    #[test]
    fn test_write_only_keys_are_rewritten() {
        let current = map(&[("DD_APM_ENABLED", "false"), ("DD_DOGSTATSD_URL", "udp://10.0.0.5:9000")]);
        let values = extract_form_values(&current);
        assert!(values.fields.is_empty());
        let mut cfg = values.to_configuration();
        cfg.api_key = "0123456789abcdef0123456789abcdef".into();
        let merged = merge(&current, &build_desired_settings(&cfg));
        assert_eq!(merged.get("DD_APM_ENABLED"), Some("true"));
        assert_eq!(merged.get("DD_DOGSTATSD_URL"), Some("udp://localhost:8125"));
    }

    #[test]
    fn test_round_trip_dotnet_service() {
        assert_round_trip(map(&[
            ("DATADOG_API_KEY", "ffffffffffffffffffffffffffffffff"),
            ("DD_ENV", "staging"),
            ("DD_SERVICE", "orders"),
            ("CORECLR_ENABLE_PROFILING", "1"),
            ("CORECLR_PROFILER", "{846F5F1C-F9AE-4B07-969E-05C26BC060D8}"),
            ("DD_DOTNET_TRACER_HOME", "/opt/datadog"),
            ("WEBSITES_ENABLE_APP_SERVICE_STORAGE", "0"),
        ]));
    }
}
