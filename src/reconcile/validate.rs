// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Structural validation of a desired configuration
//!
//! Runs before any apply step. All issues are collected so the user can fix
//! everything in one pass.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::desired::{DesiredConfiguration, KNOWN_SITES};

pub const API_KEY_LEN: usize = 32;

/// One rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into() }
    }
}

impl std::fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{}", join_issues(.0))]
    Invalid(Vec<FieldIssue>),
}

impl ValidationError {
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            Self::Invalid(issues) => issues,
        }
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

fn is_api_key(value: &str) -> bool {
    value.len() == API_KEY_LEN && value.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}

/// Check a configuration before it is applied.
pub fn validate(cfg: &DesiredConfiguration) -> Result<(), ValidationError> {
    let mut issues = Vec::new();

    if !is_api_key(&cfg.api_key) {
        issues.push(FieldIssue::new("api_key", "must be 32 lowercase hex characters"));
    }
    if cfg.site.trim().is_empty() {
        issues.push(FieldIssue::new("site", "is required"));
    } else if !KNOWN_SITES.contains(&cfg.site.trim()) {
        issues.push(FieldIssue::new("site", format!("unknown Datadog site '{}'", cfg.site)));
    }
    if cfg.service.trim().is_empty() {
        issues.push(FieldIssue::new("service", "is required"));
    } else if cfg.service.chars().any(char::is_whitespace) {
        issues.push(FieldIssue::new("service", "must not contain whitespace"));
    }
    if cfg.environment.trim().is_empty() {
        issues.push(FieldIssue::new("environment", "is required"));
    }
    if cfg.log_path.trim().is_empty() {
        issues.push(FieldIssue::new("log_path", "is required"));
    }
    if let Some(sidecar) = &cfg.sidecar {
        if let Some(port) = &sidecar.port {
            if !matches!(port.trim().parse::<u16>(), Ok(p) if p > 0) {
                issues.push(FieldIssue::new("sidecar.port", format!("'{}' is not a valid port", port)));
            }
        }
        if matches!(&sidecar.image, Some(image) if image.trim().is_empty()) {
            issues.push(FieldIssue::new("sidecar.image", "must not be empty"));
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Invalid(issues))
    }
}
