// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Error types for the APM configurator

use std::io;
use thiserror::Error;

use crate::client::ApiError;
use crate::config::ConfigError;
use crate::reconcile::ValidationError;

/// Result type alias for configurator operations
pub type Result<T> = std::result::Result<T, ApmError>;

/// Main error type for the APM configurator
#[derive(Error, Debug)]
pub enum ApmError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Desired configuration rejected before any step ran
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Management API collaborator failure
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Apply finished with a failed step
    #[error("Apply failed at step '{step}': {message}")]
    StepFailed { step: String, message: String },
}
