// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Runtime platform classification
//!
//! Turns the kind string and framework version tags of an app service into a
//! [`Platform`] and a [`RuntimeDescriptor`]. Classification never fails: any
//! ambiguity resolves to a best-effort descriptor.

pub mod detect;
pub mod sniff;

pub use detect::{classify, detect_platform, raw_runtime};

use serde::{Deserialize, Serialize};

/// Snapshot of service metadata as returned by the management API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMetadata {
    /// Provider kind string, e.g. `app`, `app,linux`, `functionapp,linux`.
    #[serde(default)]
    pub kind_tag: String,
    /// `linuxFxVersion`, e.g. `NODE|18-lts`. Empty when unset.
    #[serde(default)]
    pub linux_framework_tag: String,
    /// `windowsFxVersion` or equivalent. Empty when unset.
    #[serde(default)]
    pub windows_framework_tag: String,
}

impl ServiceMetadata {
    pub fn new(kind_tag: impl Into<String>) -> Self {
        Self { kind_tag: kind_tag.into(), ..Default::default() }
    }

    pub fn with_linux_tag(mut self, tag: impl Into<String>) -> Self {
        self.linux_framework_tag = tag.into();
        self
    }

    pub fn with_windows_tag(mut self, tag: impl Into<String>) -> Self {
        self.windows_framework_tag = tag.into();
        self
    }
}

/// OS / execution environment of an app service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    Linux,
    Container,
    Unknown,
}

impl Platform {
    /// Whether monitoring on this platform is provided by a sidecar container.
    pub fn uses_sidecar(&self) -> bool {
        matches!(self, Platform::Linux)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Windows => write!(f, "Windows"),
            Self::Linux => write!(f, "Linux"),
            Self::Container => write!(f, "Container"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Inferred language / version / raw tag triple
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeDescriptor {
    pub language: String,
    pub version: String,
    /// Most specific raw tag observed; "Unknown" only when no tag exists.
    pub raw_runtime: String,
    /// Set when the descriptor is a default assumption rather than a detection.
    #[serde(default)]
    pub assumed: bool,
}

impl RuntimeDescriptor {
    pub fn new(language: impl Into<String>, version: impl Into<String>, raw_runtime: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            version: version.into(),
            raw_runtime: raw_runtime.into(),
            assumed: false,
        }
    }

    /// Human-readable label, flagging assumed defaults.
    pub fn label(&self) -> String {
        let base = if self.version.is_empty() {
            self.language.clone()
        } else {
            format!("{} {}", self.language, self.version)
        };
        if self.assumed {
            format!("{} (assumed default)", base)
        } else {
            base
        }
    }
}

/// Classification result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub platform: Platform,
    pub runtime: RuntimeDescriptor,
}
