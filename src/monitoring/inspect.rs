// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! One-shot read of a service through the management API

use serde::{Deserialize, Serialize};

use super::{analyze, detect_settings_only, MonitoringSetup};
use crate::client::{ApiError, ManagementApi};
use crate::runtime::{classify, Classification};
use crate::settings::SettingsMap;

/// Everything the configurator shows before an apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInspection {
    pub classification: Classification,
    pub setup: MonitoringSetup,
    #[serde(skip)]
    pub settings: SettingsMap,
}

/// Fetch metadata and settings, classify, then analyze existing monitoring.
///
/// Sidecars and extensions are always fetched; `analyze` applies the
/// platform gate.
pub async fn inspect_service(api: &dyn ManagementApi, service_id: &str) -> Result<ServiceInspection, ApiError> {
    let meta = api.fetch_service_metadata(service_id).await?;
    let settings = api.fetch_current_settings(service_id).await?;
    let classification = classify(&meta, &settings);

    let sidecars = api.fetch_sidecars(service_id).await?;
    let extensions = api.fetch_extensions(service_id).await?;
    let setup = detect_settings_only(analyze(classification.platform, &sidecars, &extensions), &settings);

    Ok(ServiceInspection { classification, setup, settings })
}
