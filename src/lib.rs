// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! # App Service APM configurator
//!
//! Decision and reconciliation engine for enabling Datadog APM on a cloud
//! app service:
//!
//! - [`runtime`]: classify a service into a platform and runtime descriptor
//! - [`monitoring`]: detect an existing sidecar or site extension, and refresh
//!   sidecar status
//! - [`reconcile`]: compute desired settings, validate input, and prefill a
//!   form from existing settings
//! - [`settings`]: non-destructive merge and change preview
//! - [`apply`]: ordered apply steps with per-step status
//!
//! All I/O goes through the injected [`client::ManagementApi`].
//!
//! ## Example
//!
//! ```no_run
//! use apmlib::{classify, ServiceMetadata, SettingsMap};
//!
//! let meta = ServiceMetadata::new("app,linux").with_linux_tag("NODE|18-lts");
//! let c = classify(&meta, &SettingsMap::new());
//! println!("{} {}", c.platform, c.runtime.label());
//! ```

pub mod apply;
pub mod client;
pub mod config;
pub mod error;
pub mod keys;
pub mod monitoring;
pub mod reconcile;
pub mod runtime;
pub mod settings;

pub use apply::{plan_steps, ApplyReport, ApplyStep, Orchestrator, StepId, StepStatus};
pub use client::{ApiError, ManagementApi, ServiceSnapshot, SidecarRequest, SnapshotApi};
pub use config::{ApplyConfig, ConfigError, LogLevel};
pub use error::{ApmError, Result};
pub use monitoring::{analyze, detect_settings_only, inspect_service, InstalledExtension, Mechanism, MonitoringSetup, SidecarContainer};
pub use reconcile::{build_desired_settings, extract_form_values, redact, validate, DesiredConfiguration, FormValues, ValidationError};
pub use runtime::{classify, Classification, Platform, RuntimeDescriptor, ServiceMetadata};
pub use settings::{diff, merge, SettingsMap};
