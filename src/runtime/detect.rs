// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Platform and runtime detection rules
//!
//! Precedence, strictly in this order: kind string, Linux framework tag,
//! Windows framework tag, settings sniffing, default.

use super::sniff;
use super::{Classification, Platform, RuntimeDescriptor, ServiceMetadata};
use crate::settings::SettingsMap;

/// Language names for recognized `PREFIX|VALUE` Linux framework prefixes.
const LINUX_PREFIXES: &[(&str, &str)] = &[
    ("DOTNETCORE", ".NET Core"),
    ("NODE", "Node.js"),
    ("PYTHON", "Python"),
    ("PHP", "PHP"),
    ("JAVA", "Java"),
    ("DOCKER", "Docker"),
];

/// Function app kind sub-tokens, checked in order.
const FUNCTION_TOKENS: &[(&str, &str)] = &[
    ("node", "Node.js"),
    ("dotnet", ".NET"),
    ("python", "Python"),
    ("java", "Java"),
];

/// Detect the platform from the kind string alone.
///
/// `linux` wins; any other app kind is Windows, containerized or not. Only a
/// bare container kind with no app token is `Container`.
pub fn detect_platform(kind_tag: &str) -> Platform {
    let kind = kind_tag.to_ascii_lowercase();
    if kind.contains("linux") {
        Platform::Linux
    } else if kind.contains("app") {
        Platform::Windows
    } else if kind.contains("container") {
        Platform::Container
    } else {
        Platform::Unknown
    }
}

/// First non-empty of Linux tag, Windows tag, kind; otherwise "Unknown".
pub fn raw_runtime(meta: &ServiceMetadata) -> String {
    [&meta.linux_framework_tag, &meta.windows_framework_tag, &meta.kind_tag]
        .into_iter()
        .map(|t| t.trim())
        .find(|t| !t.is_empty())
        .unwrap_or("Unknown")
        .to_string()
}

/// Classify a service. Pure: identical inputs always give identical output.
pub fn classify(meta: &ServiceMetadata, settings: &SettingsMap) -> Classification {
    let platform = detect_platform(&meta.kind_tag);
    let raw = raw_runtime(meta);
    let kind = meta.kind_tag.to_ascii_lowercase();
    let linux_tag = meta.linux_framework_tag.trim();
    let windows_tag = meta.windows_framework_tag.trim();

    let mut runtime = if kind.contains("functionapp") {
        function_runtime(&kind, &raw)
    } else if kind.contains("app") {
        if !linux_tag.is_empty() {
            linux_runtime(linux_tag, &raw)
        } else if !windows_tag.is_empty() {
            windows_runtime(windows_tag, &raw)
        } else if platform == Platform::Linux {
            sniff::sniff_runtime(settings, &raw)
        } else {
            // No positive evidence of .NET here; flagged as an assumption.
            let mut d = RuntimeDescriptor::new(".NET Framework", "Default", &raw);
            d.assumed = true;
            d
        }
    } else {
        RuntimeDescriptor::new("Unknown", format!("Unknown kind: {}", meta.kind_tag), &raw)
    };
    runtime.raw_runtime = raw;

    log::debug!(
        "classified kind={:?} as {} / {}",
        meta.kind_tag,
        platform,
        runtime.label()
    );
    Classification { platform, runtime }
}

fn function_runtime(kind: &str, raw: &str) -> RuntimeDescriptor {
    FUNCTION_TOKENS
        .iter()
        .find(|(token, _)| kind.contains(token))
        .map(|(_, language)| RuntimeDescriptor::new(*language, "", raw))
        .unwrap_or_else(|| RuntimeDescriptor::new("Azure Functions", "", raw))
}

fn linux_runtime(tag: &str, raw: &str) -> RuntimeDescriptor {
    let (prefix, value) = tag.split_once('|').unwrap_or((tag, ""));
    let prefix = prefix.trim().to_ascii_uppercase();
    match LINUX_PREFIXES.iter().find(|(p, _)| *p == prefix) {
        Some(("DOCKER", language)) => RuntimeDescriptor::new(*language, "Container", raw),
        Some((_, language)) => RuntimeDescriptor::new(*language, value.trim(), raw),
        None => RuntimeDescriptor::new("Linux", tag, raw),
    }
}

fn windows_runtime(tag: &str, raw: &str) -> RuntimeDescriptor {
    let lower = tag.to_ascii_lowercase();
    let language = if lower.contains("dotnet") {
        ".NET Framework"
    } else if lower.contains("node") {
        "Node.js"
    } else {
        "Windows"
    };
    RuntimeDescriptor::new(language, tag, raw)
}
