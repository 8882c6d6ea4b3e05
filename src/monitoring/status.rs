// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Sidecar status refresh
//!
//! The management API returns container status in several shapes. The
//! display status is taken from the first recognized field; a response with
//! none of them still counts as evidence the container exists.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::MonitoringSetup;
use crate::client::{ApiError, ManagementApi};

/// Fields probed for a status, in order.
const STATUS_PATHS: &[&[&str]] = &[
    &["status"],
    &["state"],
    &["properties", "status"],
    &["properties", "state"],
    &["properties", "runState"],
    &["details", "status"],
];

pub const STATUS_RUNNING: &str = "Running";
pub const STATUS_UNAVAILABLE: &str = "Status unavailable";
pub const STATUS_FETCH_FAILED: &str = "Status fetch failed";

/// Result of one status refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusOutcome {
    /// A response was received; carries the extracted (or defaulted) status.
    Reported(String),
    /// The API answered with no status object at all.
    Unavailable,
    /// The fetch itself failed.
    FetchFailed(String),
}

impl StatusOutcome {
    /// Text shown to the user.
    pub fn display(&self) -> &str {
        match self {
            Self::Reported(s) => s,
            Self::Unavailable => STATUS_UNAVAILABLE,
            Self::FetchFailed(_) => STATUS_FETCH_FAILED,
        }
    }

    /// Map a raw collaborator response onto an outcome.
    pub fn from_response(response: Result<Option<Value>, ApiError>) -> Self {
        match response {
            Ok(Some(raw)) if !raw.is_null() => Self::Reported(extract_status(&raw)),
            Ok(_) => Self::Unavailable,
            Err(e) => Self::FetchFailed(e.to_string()),
        }
    }
}

/// Value at `path` as display text. Numeric and boolean states (some
/// providers report codes) are rendered as-is; blank strings, nulls and
/// nested objects do not match.
fn probe(raw: &Value, path: &[&str]) -> Option<String> {
    let mut node = raw;
    for segment in path {
        node = node.get(*segment)?;
    }
    match node {
        Value::String(s) => Some(s.trim()).filter(|s| !s.is_empty()).map(str::to_string),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Extract a display status from a received status object.
///
/// Falls back to "Running" when no recognized field is present; the raw
/// shape is logged so unexpected formats can be diagnosed.
pub fn extract_status(raw: &Value) -> String {
    if let Some(status) = STATUS_PATHS.iter().find_map(|path| probe(raw, path)) {
        return status;
    }
    log::warn!("unrecognized sidecar status shape, assuming running: {}", raw);
    STATUS_RUNNING.to_string()
}

/// Fetch the sidecar status and write it into `setup.details.status`.
///
/// Concurrent refreshes are not de-duplicated; whichever completes last
/// determines the stored status. No-op returning `Unavailable` when the setup
/// has no sidecar.
pub async fn refresh_status(api: &dyn ManagementApi, service_id: &str, setup: &mut MonitoringSetup) -> StatusOutcome {
    let Some(container) = setup.container_name().map(str::to_string) else {
        return StatusOutcome::Unavailable;
    };
    let outcome = StatusOutcome::from_response(api.fetch_sidecar_status(service_id, &container).await);
    if let StatusOutcome::FetchFailed(reason) = &outcome {
        log::warn!("status fetch for sidecar {} failed: {}", container, reason);
    }
    setup.set_status(outcome.display());
    setup.details.insert(
        "lastChecked".into(),
        Value::from(chrono::Utc::now().to_rfc3339()),
    );
    outcome
}
