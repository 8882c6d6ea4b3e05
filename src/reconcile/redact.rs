// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Display-only redaction of secret setting values

use crate::keys;

const VISIBLE_SUFFIX: usize = 3;

/// Mask a setting value for display.
///
/// Sensitive keys keep only their last three characters; values of three
/// characters or fewer are fully masked. Length is preserved. Other keys are
/// returned unchanged.
pub fn redact(key: &str, value: &str) -> String {
    if !keys::is_sensitive(key) {
        return value.to_string();
    }
    let len = value.chars().count();
    if len <= VISIBLE_SUFFIX {
        return "*".repeat(len);
    }
    let suffix: String = value.chars().skip(len - VISIBLE_SUFFIX).collect();
    format!("{}{}", "*".repeat(len - VISIBLE_SUFFIX), suffix)
}
