// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Existing monitoring setup detection
//!
//! Decides which Datadog mechanism (if any) is already active on a service:
//! a sidecar container on Linux, a site extension on Windows, or bare
//! settings without either.

pub mod inspect;
pub mod status;

pub use inspect::{inspect_service, ServiceInspection};
pub use status::{extract_status, refresh_status, StatusOutcome};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::keys;
use crate::runtime::Platform;
use crate::settings::SettingsMap;

/// Default trace agent port of the Datadog sidecar.
pub const DEFAULT_SIDECAR_PORT: &str = "8126";

/// Placeholder status until the caller refreshes it.
pub const STATUS_CHECKING: &str = "Checking...";

const DATADOG_MARKER: &str = "datadog";

/// Sidecar container attached to a service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidecarContainer {
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub target_port: Option<String>,
    #[serde(default)]
    pub is_main: bool,
    #[serde(default)]
    pub startup_command: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub last_modified_time: Option<String>,
}

impl SidecarContainer {
    fn is_datadog(&self) -> bool {
        contains_marker(&self.name) || contains_marker(&self.image)
    }
}

/// Site extension installed on a Windows service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledExtension {
    pub id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// How monitoring is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mechanism {
    Sidecar,
    Extension,
    SettingsOnly,
    None,
}

impl std::fmt::Display for Mechanism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sidecar => write!(f, "Sidecar"),
            Self::Extension => write!(f, "Extension"),
            Self::SettingsOnly => write!(f, "Settings only"),
            Self::None => write!(f, "None"),
        }
    }
}

/// Detected monitoring setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringSetup {
    pub present: bool,
    pub mechanism: Mechanism,
    /// Mechanism-specific details (container name/image/port/status, or
    /// extension id/version/state).
    pub details: BTreeMap<String, Value>,
}

impl MonitoringSetup {
    pub fn none() -> Self {
        Self { present: false, mechanism: Mechanism::None, details: BTreeMap::new() }
    }

    fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.get(key).and_then(Value::as_str)
    }

    /// Container name when the mechanism is a sidecar.
    pub fn container_name(&self) -> Option<&str> {
        match self.mechanism {
            Mechanism::Sidecar => self.detail_str("containerName"),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.detail_str("status")
    }

    /// Overwrite the displayed status. Last writer wins.
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.details.insert("status".into(), Value::String(status.into()));
    }
}

impl Default for MonitoringSetup {
    fn default() -> Self {
        Self::none()
    }
}

fn contains_marker(value: &str) -> bool {
    value.to_ascii_lowercase().contains(DATADOG_MARKER)
}

/// Determine which monitoring mechanism is already active.
///
/// Sidecars are only considered on Linux and extensions only on Windows, so
/// at most one mechanism is ever reported.
pub fn analyze(platform: Platform, sidecars: &[SidecarContainer], extensions: &[InstalledExtension]) -> MonitoringSetup {
    let setup = match platform {
        Platform::Linux => sidecars.iter().find(|s| s.is_datadog()).map(sidecar_setup),
        Platform::Windows => extensions.iter().find(|e| contains_marker(&e.id)).map(extension_setup),
        _ => None,
    }
    .unwrap_or_else(MonitoringSetup::none);

    log::info!("monitoring on {} platform: {}", platform, setup.mechanism);
    setup
}

fn sidecar_setup(sidecar: &SidecarContainer) -> MonitoringSetup {
    let port = sidecar
        .target_port
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(DEFAULT_SIDECAR_PORT);

    let mut details = BTreeMap::new();
    details.insert("containerName".to_string(), Value::from(sidecar.name.as_str()));
    details.insert("image".to_string(), Value::from(sidecar.image.as_str()));
    details.insert("port".to_string(), Value::from(port));
    details.insert("status".to_string(), Value::from(STATUS_CHECKING));
    if let Some(created) = &sidecar.created_time {
        details.insert("createdTime".to_string(), Value::from(created.as_str()));
    }
    if let Some(modified) = &sidecar.last_modified_time {
        details.insert("lastModifiedTime".to_string(), Value::from(modified.as_str()));
    }

    MonitoringSetup { present: true, mechanism: Mechanism::Sidecar, details }
}

fn extension_setup(extension: &InstalledExtension) -> MonitoringSetup {
    let mut details = BTreeMap::new();
    details.insert("id".to_string(), Value::from(extension.id.as_str()));
    details.insert(
        "version".to_string(),
        Value::from(extension.version.as_deref().unwrap_or("Unknown")),
    );
    details.insert("state".to_string(), Value::from("Installed"));
    if let Some(title) = &extension.title {
        details.insert("title".to_string(), Value::from(title.as_str()));
    }

    MonitoringSetup { present: true, mechanism: Mechanism::Extension, details }
}

/// Refine a `None` result: settings that already carry a Datadog API key mean
/// monitoring was configured without a sidecar or extension.
///
/// Only key names are recorded, never values.
pub fn detect_settings_only(setup: MonitoringSetup, settings: &SettingsMap) -> MonitoringSetup {
    if setup.mechanism != Mechanism::None || keys::lookup(settings, keys::DD_API_KEY).is_none() {
        return setup;
    }
    let names: Vec<Value> = settings
        .keys()
        .filter(|k| keys::is_datadog_key(k))
        .map(Value::from)
        .collect();

    let mut details = BTreeMap::new();
    details.insert("keys".to_string(), Value::Array(names));
    MonitoringSetup { present: true, mechanism: Mechanism::SettingsOnly, details }
}
