// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Settings-based runtime fallback for Linux services without a framework tag

use super::RuntimeDescriptor;
use crate::settings::SettingsMap;

const UNKNOWN_VERSION: &str = "Unknown version";

/// How the version of a sniffed runtime is derived.
#[derive(Debug, Clone, Copy)]
enum VersionSource {
    Fixed(&'static str),
    /// Value of this key if present, else "Unknown version".
    ValueOf(&'static str),
}

/// Indicator rule: any of `keys` present selects `language`.
struct Indicator {
    keys: &'static [&'static str],
    language: &'static str,
    version: VersionSource,
}

/// Checked in order; first rule with a matching key wins.
const INDICATORS: &[Indicator] = &[
    Indicator {
        keys: &["CORECLR_ENABLE_PROFILING", "CORECLR_PROFILER", "CORECLR_PROFILER_PATH"],
        language: ".NET Core",
        version: VersionSource::Fixed("Linux"),
    },
    Indicator {
        keys: &["DD_DOTNET_TRACER_HOME", "ASPNETCORE_ENVIRONMENT", "DOTNET_RUNNING_IN_CONTAINER"],
        language: ".NET",
        version: VersionSource::Fixed("Linux"),
    },
    Indicator {
        keys: &["WEBSITE_NODE_DEFAULT_VERSION", "NODE_ENV"],
        language: "Node.js",
        version: VersionSource::ValueOf("WEBSITE_NODE_DEFAULT_VERSION"),
    },
    Indicator {
        keys: &["PYTHON_VERSION", "PYTHONPATH"],
        language: "Python",
        version: VersionSource::ValueOf("PYTHON_VERSION"),
    },
    Indicator {
        keys: &["JAVA_HOME", "JAVA_OPTS"],
        language: "Java",
        version: VersionSource::Fixed(UNKNOWN_VERSION),
    },
    Indicator {
        keys: &["PHP_VERSION"],
        language: "PHP",
        version: VersionSource::ValueOf("PHP_VERSION"),
    },
];

/// Infer the runtime from application settings.
pub fn sniff_runtime(settings: &SettingsMap, raw: &str) -> RuntimeDescriptor {
    for rule in INDICATORS {
        if rule.keys.iter().any(|k| settings.contains_key(k)) {
            let version = match rule.version {
                VersionSource::Fixed(v) => v.to_string(),
                VersionSource::ValueOf(key) => settings
                    .get(key)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .unwrap_or(UNKNOWN_VERSION)
                    .to_string(),
            };
            return RuntimeDescriptor::new(rule.language, version, raw);
        }
    }
    RuntimeDescriptor::new("Linux App Service", "Runtime not detected", raw)
}
