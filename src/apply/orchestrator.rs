// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Sequential apply driver
//!
//! Runs the step plan one step at a time against an injected
//! [`ManagementApi`]. A failing step is marked `Error`, later steps stay
//! `Pending`, and nothing already applied is rolled back: re-running the
//! apply merges the same settings to the same result.

use serde::{Deserialize, Serialize};

use super::plan::{plan_steps, ApplyStep, StepId, StepStatus};
use crate::client::{ApiError, ManagementApi};
use crate::error::ApmError;
use crate::reconcile::{build_desired_settings, validate, DesiredConfiguration, ValidationError};
use crate::runtime::Platform;
use crate::settings::{merge, SettingsMap};

/// Final state of one apply invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyReport {
    pub service_id: String,
    pub steps: Vec<ApplyStep>,
    /// Settings written by the settings step, if it completed.
    #[serde(skip)]
    pub merged_settings: Option<SettingsMap>,
}

impl ApplyReport {
    pub fn succeeded(&self) -> bool {
        self.steps.iter().all(|s| s.status == StepStatus::Completed)
    }

    pub fn failed_step(&self) -> Option<&ApplyStep> {
        self.steps.iter().find(|s| s.status == StepStatus::Error)
    }

    pub fn step(&self, id: StepId) -> Option<&ApplyStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Collapse into a `Result`, surfacing the failed step as an error.
    pub fn into_result(self) -> Result<Self, ApmError> {
        if let Some(step) = self.failed_step() {
            return Err(ApmError::StepFailed {
                step: step.id.to_string(),
                message: step.error.clone().unwrap_or_default(),
            });
        }
        Ok(self)
    }
}

/// Drives the apply steps for one service
pub struct Orchestrator<'a> {
    api: &'a dyn ManagementApi,
}

impl<'a> Orchestrator<'a> {
    pub fn new(api: &'a dyn ManagementApi) -> Self {
        Self { api }
    }

    /// Validate, then run every planned step in order.
    pub async fn run(&self, service_id: &str, platform: Platform, cfg: &DesiredConfiguration) -> Result<ApplyReport, ValidationError> {
        self.run_with_observer(service_id, platform, cfg, |_| {}).await
    }

    /// Same as [`Orchestrator::run`], calling `observer` with the whole step
    /// list after every status transition.
    pub async fn run_with_observer<F>(
        &self,
        service_id: &str,
        platform: Platform,
        cfg: &DesiredConfiguration,
        mut observer: F,
    ) -> Result<ApplyReport, ValidationError>
    where
        F: FnMut(&[ApplyStep]),
    {
        validate(cfg)?;

        let mut report = ApplyReport {
            service_id: service_id.to_string(),
            steps: plan_steps(platform),
            merged_settings: None,
        };
        observer(&report.steps);

        for index in 0..report.steps.len() {
            let id = report.steps[index].id;
            report.steps[index].start();
            log::info!("[{}] step {} running", service_id, id);
            observer(&report.steps);

            match self.execute(id, service_id, cfg, &mut report.merged_settings).await {
                Ok(()) => {
                    report.steps[index].complete();
                    log::info!("[{}] step {} completed", service_id, id);
                    observer(&report.steps);
                }
                Err(e) => {
                    report.steps[index].fail(e.to_string());
                    log::warn!("[{}] step {} failed: {}", service_id, id, e);
                    observer(&report.steps);
                    break;
                }
            }
        }
        Ok(report)
    }

    async fn execute(
        &self,
        id: StepId,
        service_id: &str,
        cfg: &DesiredConfiguration,
        merged: &mut Option<SettingsMap>,
    ) -> Result<(), ApiError> {
        match id {
            StepId::Settings => {
                let current = self.api.fetch_current_settings(service_id).await?;
                let desired = build_desired_settings(cfg);
                let next = merge(&current, &desired);
                log::debug!(
                    "[{}] writing {} settings ({} Datadog keys)",
                    service_id,
                    next.len(),
                    desired.len()
                );
                self.api.write_settings(service_id, &next).await?;
                *merged = Some(next);
                Ok(())
            }
            StepId::Sidecar => self.api.configure_sidecar(service_id, &cfg.sidecar_request()).await,
            StepId::Restart => self.api.restart_service(service_id).await,
        }
    }
}
