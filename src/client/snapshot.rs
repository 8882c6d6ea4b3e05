// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! File-backed service snapshot
//!
//! Lets the engine run offline against a JSON document describing one
//! service. Writes go back to the same file.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ApiError, ManagementApi, SidecarRequest};
use crate::monitoring::{InstalledExtension, SidecarContainer};
use crate::runtime::ServiceMetadata;
use crate::settings::SettingsMap;

/// Name given to a sidecar created through a snapshot.
pub const SNAPSHOT_SIDECAR_NAME: &str = "datadog-sidecar";

/// Everything the engine reads about a service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSnapshot {
    #[serde(default)]
    pub metadata: ServiceMetadata,
    #[serde(default)]
    pub settings: SettingsMap,
    #[serde(default)]
    pub sidecars: Vec<SidecarContainer>,
    #[serde(default)]
    pub extensions: Vec<InstalledExtension>,
    /// Raw status object returned for the Datadog sidecar, if any.
    #[serde(default)]
    pub sidecar_status: Option<Value>,
    #[serde(default)]
    pub restarts: u32,
}

impl ServiceSnapshot {
    pub fn from_json(content: &str) -> Result<Self, ApiError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Insert or replace the Datadog sidecar entry.
    fn upsert_sidecar(&mut self, request: &SidecarRequest) {
        let entry = SidecarContainer {
            name: SNAPSHOT_SIDECAR_NAME.to_string(),
            image: request.image.clone(),
            target_port: Some(request.port.clone()),
            is_main: false,
            startup_command: request.startup_command.clone(),
            created_time: None,
            last_modified_time: Some(chrono::Utc::now().to_rfc3339()),
        };
        match self.sidecars.iter_mut().find(|s| s.name == SNAPSHOT_SIDECAR_NAME) {
            Some(existing) => {
                let created = existing.created_time.take();
                *existing = SidecarContainer { created_time: created, ..entry };
            }
            None => self.sidecars.push(SidecarContainer {
                created_time: entry.last_modified_time.clone(),
                ..entry
            }),
        }
    }
}

/// [`ManagementApi`] over a snapshot, optionally persisted to disk
pub struct SnapshotApi {
    snapshot: Mutex<ServiceSnapshot>,
    path: Option<PathBuf>,
}

impl SnapshotApi {
    /// In-memory only; writes are not persisted.
    pub fn new(snapshot: ServiceSnapshot) -> Self {
        Self { snapshot: Mutex::new(snapshot), path: None }
    }

    /// Load from a file; every write is saved back to it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let path = path.into();
        let snapshot = ServiceSnapshot::from_file(&path)?;
        Ok(Self { snapshot: Mutex::new(snapshot), path: Some(path) })
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Result<ServiceSnapshot, ApiError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ServiceSnapshot>, ApiError> {
        self.snapshot
            .lock()
            .map_err(|_| ApiError::InvalidResponse("snapshot lock poisoned".into()))
    }

    fn update(&self, f: impl FnOnce(&mut ServiceSnapshot)) -> Result<(), ApiError> {
        let mut snapshot = self.lock()?;
        f(&mut snapshot);
        if let Some(path) = &self.path {
            let content = serde_json::to_string_pretty(&*snapshot)?;
            std::fs::write(path, content)?;
            log::debug!("snapshot saved to {}", path.display());
        }
        Ok(())
    }
}

#[async_trait]
impl ManagementApi for SnapshotApi {
    async fn fetch_service_metadata(&self, _service_id: &str) -> Result<ServiceMetadata, ApiError> {
        Ok(self.lock()?.metadata.clone())
    }

    async fn fetch_current_settings(&self, _service_id: &str) -> Result<SettingsMap, ApiError> {
        Ok(self.lock()?.settings.clone())
    }

    async fn write_settings(&self, _service_id: &str, settings: &SettingsMap) -> Result<(), ApiError> {
        self.update(|s| s.settings = settings.clone())
    }

    async fn fetch_sidecars(&self, _service_id: &str) -> Result<Vec<SidecarContainer>, ApiError> {
        Ok(self.lock()?.sidecars.clone())
    }

    async fn fetch_extensions(&self, _service_id: &str) -> Result<Vec<InstalledExtension>, ApiError> {
        Ok(self.lock()?.extensions.clone())
    }

    async fn configure_sidecar(&self, _service_id: &str, request: &SidecarRequest) -> Result<(), ApiError> {
        self.update(|s| s.upsert_sidecar(request))
    }

    async fn restart_service(&self, _service_id: &str) -> Result<(), ApiError> {
        self.update(|s| s.restarts += 1)
    }

    async fn fetch_sidecar_status(&self, _service_id: &str, container_name: &str) -> Result<Option<Value>, ApiError> {
        let snapshot = self.lock()?;
        if !snapshot.sidecars.iter().any(|s| s.name == container_name) {
            return Err(ApiError::NotFound(container_name.to_string()));
        }
        Ok(snapshot.sidecar_status.clone())
    }
}
