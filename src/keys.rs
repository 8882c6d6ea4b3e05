// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Canonical setting keys and alias resolution
//!
//! Providers and older tooling spell the same Datadog setting several ways
//! (`DD_SITE`, `DATADOG_SITE`, `dd_site`). Every monitoring-related lookup
//! goes through this table so callers only ever deal with the canonical name.

use crate::settings::SettingsMap;

pub const DD_API_KEY: &str = "DD_API_KEY";
pub const DD_SITE: &str = "DD_SITE";
pub const DD_SERVICE: &str = "DD_SERVICE";
pub const DD_ENV: &str = "DD_ENV";
pub const DD_VERSION: &str = "DD_VERSION";
pub const DD_SERVERLESS_LOG_PATH: &str = "DD_SERVERLESS_LOG_PATH";
pub const DD_APM_ENABLED: &str = "DD_APM_ENABLED";
pub const DD_TRACE_AGENT_URL: &str = "DD_TRACE_AGENT_URL";
pub const DD_DOGSTATSD_URL: &str = "DD_DOGSTATSD_URL";
pub const WEBSITES_ENABLE_APP_SERVICE_STORAGE: &str = "WEBSITES_ENABLE_APP_SERVICE_STORAGE";

pub const DD_DOTNET_TRACER_HOME: &str = "DD_DOTNET_TRACER_HOME";
pub const CORECLR_ENABLE_PROFILING: &str = "CORECLR_ENABLE_PROFILING";
pub const CORECLR_PROFILER: &str = "CORECLR_PROFILER";
pub const CORECLR_PROFILER_PATH: &str = "CORECLR_PROFILER_PATH";
pub const DD_TRACE_LOG_DIRECTORY: &str = "DD_TRACE_LOG_DIRECTORY";

/// The five keys that only a .NET instrumented service carries.
pub const DOTNET_KEYS: [&str; 5] = [
    DD_DOTNET_TRACER_HOME,
    CORECLR_ENABLE_PROFILING,
    CORECLR_PROFILER,
    CORECLR_PROFILER_PATH,
    DD_TRACE_LOG_DIRECTORY,
];

/// Recognized keys that every apply rewrites and that have no form field:
/// APM is always switched on and DogStatsD always points at the sidecar.
pub const WRITE_ONLY_KEYS: [&str; 2] = [DD_APM_ENABLED, DD_DOGSTATSD_URL];

/// Keys whose values are secrets and must be redacted for display.
pub const SENSITIVE_KEYS: [&str; 2] = [DD_API_KEY, "DATADOG_API_KEY"];

/// One canonical key and the alternative spellings that resolve to it.
#[derive(Debug, Clone, Copy)]
pub struct KeyAlias {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    /// Value is boolean-like and is canonicalized to `"true"`/`"false"`.
    pub boolean: bool,
}

impl KeyAlias {
    /// All spellings in lookup precedence: canonical first, then aliases in order.
    pub fn spellings(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.canonical).chain(self.aliases.iter().copied())
    }
}

const fn alias(canonical: &'static str, aliases: &'static [&'static str]) -> KeyAlias {
    KeyAlias { canonical, aliases, boolean: false }
}

/// Canonicalization table. Order is the precedence used everywhere.
pub const KEY_TABLE: &[KeyAlias] = &[
    alias(DD_API_KEY, &["DATADOG_API_KEY"]),
    alias(DD_SITE, &["DATADOG_SITE"]),
    alias(DD_SERVICE, &["DATADOG_SERVICE"]),
    alias(DD_ENV, &["DATADOG_ENV"]),
    alias(DD_VERSION, &["DATADOG_VERSION"]),
    alias(DD_SERVERLESS_LOG_PATH, &["DATADOG_SERVERLESS_LOG_PATH"]),
    KeyAlias { canonical: WEBSITES_ENABLE_APP_SERVICE_STORAGE, aliases: &[], boolean: true },
    KeyAlias { canonical: DD_APM_ENABLED, aliases: &["DATADOG_APM_ENABLED"], boolean: true },
    alias(DD_TRACE_AGENT_URL, &[]),
    alias(DD_DOGSTATSD_URL, &[]),
    alias(DD_DOTNET_TRACER_HOME, &[]),
    alias(CORECLR_ENABLE_PROFILING, &[]),
    alias(CORECLR_PROFILER, &[]),
    alias(CORECLR_PROFILER_PATH, &[]),
    alias(DD_TRACE_LOG_DIRECTORY, &[]),
];

/// Table entry for a canonical key, if it is a recognized monitoring key.
pub fn entry(canonical: &str) -> Option<&'static KeyAlias> {
    KEY_TABLE.iter().find(|e| e.canonical == canonical)
}

/// Resolve any recognized spelling (alias or odd casing) to its canonical key.
pub fn canonical_key(key: &str) -> Option<&'static str> {
    KEY_TABLE
        .iter()
        .find(|e| e.spellings().any(|s| s.eq_ignore_ascii_case(key)))
        .map(|e| e.canonical)
}

/// Look up a canonical key, falling back to its aliases.
///
/// For each spelling in table order an exact match wins over a
/// case-insensitive one, so the result never depends on map iteration order.
/// Returns the key as it is actually stored plus its value.
pub fn lookup<'a>(settings: &'a SettingsMap, canonical: &str) -> Option<(&'a str, &'a str)> {
    let spellings: Vec<&str> = match entry(canonical) {
        Some(e) => e.spellings().collect(),
        None => vec![canonical],
    };
    for spelling in spellings {
        if let Some((k, v)) = settings.get_key_value(spelling) {
            return Some((k, v));
        }
        if let Some((k, v)) = settings.iter().find(|(k, _)| k.eq_ignore_ascii_case(spelling)) {
            return Some((k, v));
        }
    }
    None
}

/// Value of a canonical key after alias resolution and value normalization.
pub fn lookup_value(settings: &SettingsMap, canonical: &str) -> Option<String> {
    lookup(settings, canonical).map(|(_, v)| normalize_value(canonical, v))
}

/// Canonical boolean string: trim, lowercase, then `"true"` for `true`/`1`,
/// `"false"` for anything else.
pub fn normalize_bool(raw: &str) -> &'static str {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => "true",
        _ => "false",
    }
}

/// Wire representation of a native bool.
pub fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Apply the per-key value normalization (boolean keys only).
pub fn normalize_value(canonical: &str, raw: &str) -> String {
    match entry(canonical) {
        Some(e) if e.boolean => normalize_bool(raw).to_string(),
        _ => raw.to_string(),
    }
}

/// Whether a key holds a secret (case-insensitive).
pub fn is_sensitive(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|s| s.eq_ignore_ascii_case(key))
}

/// Whether a key belongs to Datadog monitoring, in any spelling.
pub fn is_datadog_key(key: &str) -> bool {
    let upper = key.to_ascii_uppercase();
    upper.starts_with("DD_") || upper.starts_with("DATADOG_") || canonical_key(key).is_some()
}
