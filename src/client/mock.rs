// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! In-memory collaborator with failure injection, for tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{ApiError, ManagementApi, SidecarRequest};
use crate::monitoring::{InstalledExtension, SidecarContainer};
use crate::runtime::ServiceMetadata;
use crate::settings::SettingsMap;

#[derive(Default)]
struct MockState {
    metadata: ServiceMetadata,
    settings: SettingsMap,
    sidecars: Vec<SidecarContainer>,
    extensions: Vec<InstalledExtension>,
    status: Option<Value>,
    failures: HashMap<String, String>,
    calls: Vec<String>,
    written: Vec<SettingsMap>,
    sidecar_requests: Vec<SidecarRequest>,
    restarts: u32,
}

pub(crate) struct MockApi {
    state: Mutex<MockState>,
}

impl MockApi {
    pub fn new() -> Self {
        Self { state: Mutex::new(MockState::default()) }
    }

    fn with(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn with_metadata(self, metadata: ServiceMetadata) -> Self {
        self.with(|s| s.metadata = metadata)
    }

    pub fn with_settings(self, settings: SettingsMap) -> Self {
        self.with(|s| s.settings = settings)
    }

    pub fn with_sidecars(self, sidecars: Vec<SidecarContainer>) -> Self {
        self.with(|s| s.sidecars = sidecars)
    }

    pub fn with_extensions(self, extensions: Vec<InstalledExtension>) -> Self {
        self.with(|s| s.extensions = extensions)
    }

    pub fn with_status(self, status: Option<Value>) -> Self {
        self.with(|s| s.status = status)
    }

    /// Make `operation` fail with `message`.
    pub fn failing(self, operation: &str, message: &str) -> Self {
        self.with(|s| {
            s.failures.insert(operation.to_string(), message.to_string());
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn written(&self) -> Vec<SettingsMap> {
        self.state.lock().unwrap().written.clone()
    }

    pub fn sidecar_requests(&self) -> Vec<SidecarRequest> {
        self.state.lock().unwrap().sidecar_requests.clone()
    }

    pub fn restarts(&self) -> u32 {
        self.state.lock().unwrap().restarts
    }

    fn record(&self, call: String, operation: &str) -> Result<std::sync::MutexGuard<'_, MockState>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if let Some(message) = state.failures.get(operation).cloned() {
            return Err(ApiError::Request(message));
        }
        Ok(state)
    }
}

#[async_trait]
impl ManagementApi for MockApi {
    async fn fetch_service_metadata(&self, _service_id: &str) -> Result<ServiceMetadata, ApiError> {
        let state = self.record("fetch_service_metadata".into(), "fetch_service_metadata")?;
        Ok(state.metadata.clone())
    }

    async fn fetch_current_settings(&self, _service_id: &str) -> Result<SettingsMap, ApiError> {
        let state = self.record("fetch_current_settings".into(), "fetch_current_settings")?;
        Ok(state.settings.clone())
    }

    async fn write_settings(&self, _service_id: &str, settings: &SettingsMap) -> Result<(), ApiError> {
        let mut state = self.record("write_settings".into(), "write_settings")?;
        state.settings = settings.clone();
        state.written.push(settings.clone());
        Ok(())
    }

    async fn fetch_sidecars(&self, _service_id: &str) -> Result<Vec<SidecarContainer>, ApiError> {
        let state = self.record("fetch_sidecars".into(), "fetch_sidecars")?;
        Ok(state.sidecars.clone())
    }

    async fn fetch_extensions(&self, _service_id: &str) -> Result<Vec<InstalledExtension>, ApiError> {
        let state = self.record("fetch_extensions".into(), "fetch_extensions")?;
        Ok(state.extensions.clone())
    }

    async fn configure_sidecar(&self, _service_id: &str, request: &SidecarRequest) -> Result<(), ApiError> {
        let mut state = self.record("configure_sidecar".into(), "configure_sidecar")?;
        state.sidecar_requests.push(request.clone());
        Ok(())
    }

    async fn restart_service(&self, _service_id: &str) -> Result<(), ApiError> {
        let mut state = self.record("restart_service".into(), "restart_service")?;
        state.restarts += 1;
        Ok(())
    }

    async fn fetch_sidecar_status(&self, _service_id: &str, container_name: &str) -> Result<Option<Value>, ApiError> {
        let state = self.record(format!("fetch_sidecar_status:{}", container_name), "fetch_sidecar_status")?;
        Ok(state.status.clone())
    }
}
