// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Apply orchestration
//!
//! A plan of discrete steps (settings write, sidecar configuration, restart)
//! executed in order against a [`crate::client::ManagementApi`].

pub mod orchestrator;
pub mod plan;

pub use orchestrator::{ApplyReport, Orchestrator};
pub use plan::{plan_steps, ApplyStep, StepId, StepStatus};
