// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Apply steps and the per-platform step plan

use serde::{Deserialize, Serialize};

use crate::runtime::Platform;

/// Discrete unit of an apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepId {
    Settings,
    Sidecar,
    Restart,
}

impl StepId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Settings => "settings",
            Self::Sidecar => "sidecar",
            Self::Restart => "restart",
        }
    }

    /// Display name
    pub fn title(&self) -> &'static str {
        match self {
            Self::Settings => "Update application settings",
            Self::Sidecar => "Configure Datadog sidecar",
            Self::Restart => "Restart app service",
        }
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pending → Running → Completed | Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Error,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::Running => write!(f, "Running"),
            Self::Completed => write!(f, "Completed"),
            Self::Error => write!(f, "Error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyStep {
    pub id: StepId,
    pub name: String,
    pub status: StepStatus,
    pub error: Option<String>,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
}

impl ApplyStep {
    pub fn new(id: StepId) -> Self {
        Self {
            id,
            name: id.title().to_string(),
            status: StepStatus::Pending,
            error: None,
            started_at: None,
            finished_at: None,
        }
    }

    pub(crate) fn start(&mut self) {
        debug_assert_eq!(self.status, StepStatus::Pending);
        self.status = StepStatus::Running;
        self.started_at = Some(now_rfc3339());
    }

    pub(crate) fn complete(&mut self) {
        debug_assert_eq!(self.status, StepStatus::Running);
        self.status = StepStatus::Completed;
        self.finished_at = Some(now_rfc3339());
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        debug_assert_eq!(self.status, StepStatus::Running);
        self.status = StepStatus::Error;
        self.error = Some(message.into());
        self.finished_at = Some(now_rfc3339());
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Ordered steps for one apply. Linux services get a sidecar step between
/// the settings write and the restart.
pub fn plan_steps(platform: Platform) -> Vec<ApplyStep> {
    let ids: &[StepId] = if platform.uses_sidecar() {
        &[StepId::Settings, StepId::Sidecar, StepId::Restart]
    } else {
        &[StepId::Settings, StepId::Restart]
    };
    ids.iter().copied().map(ApplyStep::new).collect()
}
