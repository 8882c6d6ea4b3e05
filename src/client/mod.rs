// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Management API collaborator interface
//!
//! The engine never talks to the cloud provider itself. Everything with a
//! side effect goes through [`ManagementApi`], injected by the caller, so the
//! apply flow can be driven by a live client, a snapshot file, or a test mock.

#[cfg(test)]
pub(crate) mod mock;
pub mod snapshot;

pub use snapshot::{ServiceSnapshot, SnapshotApi};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::monitoring::{InstalledExtension, SidecarContainer};
use crate::runtime::ServiceMetadata;
use crate::settings::SettingsMap;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("service not found: {0}")]
    NotFound(String),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Sidecar container definition sent to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SidecarRequest {
    pub image: String,
    pub port: String,
    #[serde(default)]
    pub registry_url: Option<String>,
    #[serde(default)]
    pub startup_command: Option<String>,
    /// Let the sidecar read every app setting (needed for DD_* settings).
    pub allow_broad_app_settings_access: bool,
}

/// Operations the engine consumes from the hosting provider.
///
/// Each call is a single outstanding request; the orchestrator awaits one
/// before issuing the next.
#[async_trait]
pub trait ManagementApi: Send + Sync {
    async fn fetch_service_metadata(&self, service_id: &str) -> Result<ServiceMetadata, ApiError>;

    async fn fetch_current_settings(&self, service_id: &str) -> Result<SettingsMap, ApiError>;

    async fn write_settings(&self, service_id: &str, settings: &SettingsMap) -> Result<(), ApiError>;

    async fn fetch_sidecars(&self, service_id: &str) -> Result<Vec<SidecarContainer>, ApiError>;

    async fn fetch_extensions(&self, service_id: &str) -> Result<Vec<InstalledExtension>, ApiError>;

    async fn configure_sidecar(&self, service_id: &str, request: &SidecarRequest) -> Result<(), ApiError>;

    async fn restart_service(&self, service_id: &str) -> Result<(), ApiError>;

    /// `Ok(None)` when the provider returned no status object at all.
    async fn fetch_sidecar_status(&self, service_id: &str, container_name: &str) -> Result<Option<Value>, ApiError>;
}
