// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Application settings map and non-destructive merge
//!
//! A [`SettingsMap`] is the full key/value configuration of a service as the
//! hosting provider stores it. Values are always strings (the provider's wire
//! format). Nothing here mutates a caller's map: every merge returns a new one.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::reconcile::redact;

/// Ordered setting-key → setting-value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsMap(BTreeMap<String, String>);

impl SettingsMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn get_key_value(&self, key: &str) -> Option<(&str, &str)> {
        self.0.get_key_value(key).map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Insert, returning the previous value. Only used while building new maps.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Copy of this map without the given keys.
    pub fn without<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> SettingsMap {
        let drop: Vec<&str> = keys.into_iter().collect();
        self.iter()
            .filter(|(k, _)| !drop.contains(k))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl From<BTreeMap<String, String>> for SettingsMap {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, String)> for SettingsMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for SettingsMap {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Right-biased union: `desired` overwrites same-key entries, every other
/// `current` entry is carried over untouched.
pub fn merge(current: &SettingsMap, desired: &SettingsMap) -> SettingsMap {
    let mut merged = current.clone();
    for (k, v) in desired.iter() {
        merged.insert(k, v);
    }
    merged
}

/// What a merge would do to one desired key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Added,
    Updated,
    Unchanged,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Updated => write!(f, "updated"),
            Self::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Preview entry for a single desired key. Values are display-redacted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingChange {
    pub key: String,
    pub kind: ChangeKind,
    pub before: Option<String>,
    pub after: String,
}

/// Dry-run preview of `merge(current, desired)`, one entry per desired key.
pub fn diff(current: &SettingsMap, desired: &SettingsMap) -> Vec<SettingChange> {
    desired
        .iter()
        .map(|(key, after)| {
            let before = current.get(key);
            let kind = match before {
                None => ChangeKind::Added,
                Some(b) if b == after => ChangeKind::Unchanged,
                Some(_) => ChangeKind::Updated,
            };
            SettingChange {
                key: key.to_string(),
                kind,
                before: before.map(|b| redact(key, b)),
                after: redact(key, after),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> SettingsMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_merge_adds_without_dropping() {
        let current = map(&[("FOO", "bar")]);
        let desired = map(&[("DD_SITE", "datadoghq.eu")]);
        let merged = merge(&current, &desired);
        assert_eq!(merged, map(&[("FOO", "bar"), ("DD_SITE", "datadoghq.eu")]));
    }

    #[test]
    fn test_merge_desired_wins_on_conflict() {
        let current = map(&[("DD_ENV", "dev"), ("OTHER", "x")]);
        let desired = map(&[("DD_ENV", "prod")]);
        let merged = merge(&current, &desired);
        assert_eq!(merged.get("DD_ENV"), Some("prod"));
        assert_eq!(merged.get("OTHER"), Some("x"));
    }

    #[test]
    fn test_merge_leaves_inputs_untouched() {
        let current = map(&[("A", "1")]);
        let desired = map(&[("A", "2"), ("B", "3")]);
        let _ = merge(&current, &desired);
        assert_eq!(current, map(&[("A", "1")]));
        assert_eq!(desired.len(), 2);
    }

    #[test]
    fn test_merge_non_destructive_outside_desired_keys() {
        let current = map(&[
            ("WEBSITE_RUN_FROM_PACKAGE", "1"),
            ("DD_SITE", "datadoghq.com"),
            ("ConnectionStrings__Db", "Server=db"),
            ("DATADOG_ENV", "legacy"),
        ]);
        let desired = map(&[("DD_SITE", "datadoghq.eu"), ("DD_ENV", "prod")]);
        let merged = merge(&current, &desired);
        let desired_keys: Vec<&str> = desired.keys().collect();
        assert_eq!(
            merged.without(desired_keys.iter().copied()),
            current.without(desired_keys.iter().copied())
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let current = map(&[("FOO", "bar"), ("DD_ENV", "dev")]);
        let desired = map(&[("DD_ENV", "prod")]);
        let once = merge(&current, &desired);
        let twice = merge(&once, &desired);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_diff_kinds() {
        let current = map(&[("DD_ENV", "prod"), ("DD_SITE", "datadoghq.com")]);
        let desired = map(&[("DD_ENV", "prod"), ("DD_SITE", "datadoghq.eu"), ("DD_SERVICE", "web")]);
        let changes = diff(&current, &desired);
        let kind = |k: &str| changes.iter().find(|c| c.key == k).map(|c| c.kind);
        assert_eq!(kind("DD_ENV"), Some(ChangeKind::Unchanged));
        assert_eq!(kind("DD_SITE"), Some(ChangeKind::Updated));
        assert_eq!(kind("DD_SERVICE"), Some(ChangeKind::Added));
    }

    #[test]
    fn test_diff_redacts_api_key() {
        let current = SettingsMap::new();
        let desired = map(&[("DD_API_KEY", "0123456789abcdef0123456789abcdef")]);
        let changes = diff(&current, &desired);
        assert_eq!(changes[0].after, format!("{}def", "*".repeat(29)));
    }

    #[test]
    fn test_settings_map_serde_is_plain_object() {
        let s = map(&[("A", "1")]);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"A":"1"}"#);
        let back: SettingsMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
