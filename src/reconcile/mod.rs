// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Settings reconciliation
//!
//! Forward path: [`build_desired_settings`] turns a [`DesiredConfiguration`]
//! into the Datadog settings it needs, which [`crate::settings::merge`] then
//! folds into the current map. Inverse path: [`extract_form_values`] reads an
//! existing map back into form fields so a user can start from what is there.

pub mod desired;
pub mod extract;
pub mod redact;
pub mod validate;

pub use desired::{
    build_desired_settings, DesiredConfiguration, DotnetOptions, SidecarOptions, DEFAULT_LOG_PATH,
    DEFAULT_SIDECAR_IMAGE, DEFAULT_SITE, KNOWN_SITES,
};
pub use extract::{extract_form_values, FormField, FormValues};
pub use redact::redact;
pub use validate::{validate, FieldIssue, ValidationError};
