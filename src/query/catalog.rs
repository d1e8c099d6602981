// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Components that only exist inside the runtime (no external system behind them).
const LOCAL_COMPONENTS: &[&str] = &[
    "bean",
    "class",
    "controlbus",
    "cron",
    "dataformat",
    "direct",
    "language",
    "log",
    "mock",
    "ref",
    "scheduler",
    "seda",
    "stub",
    "timer",
    "validator",
    "vertx",
    "xslt",
];

/// Components that talk to something outside the process.
const REMOTE_COMPONENTS: &[&str] = &[
    "amqp",
    "aws2-s3",
    "aws2-sqs",
    "cxf",
    "file",
    "ftp",
    "http",
    "https",
    "jdbc",
    "jms",
    "kafka",
    "mongodb",
    "mqtt",
    "netty-http",
    "paho",
    "platform-http",
    "rest",
    "sftp",
    "smtp",
    "sql",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub remote: bool,
}

/// Known components by scheme. Lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<SmolStr, ComponentInfo>", into = "BTreeMap<SmolStr, ComponentInfo>")]
pub struct ComponentCatalog {
    components: BTreeMap<SmolStr, ComponentInfo>,
}

impl Default for ComponentCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ComponentCatalog {
    pub fn empty() -> Self {
        Self { components: BTreeMap::new() }
    }

    /// Catalog with the common components preloaded.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for scheme in LOCAL_COMPONENTS {
            catalog.register(*scheme, false);
        }
        for scheme in REMOTE_COMPONENTS {
            catalog.register(*scheme, true);
        }
        catalog
    }

    pub fn from_json_str(input: &str) -> Result<Self, CatalogError> {
        serde_json::from_str(input).map_err(|err| CatalogError(err.to_string()))
    }

    /// Adds or replaces a component. Returns the previous entry.
    pub fn register(&mut self, scheme: impl AsRef<str>, remote: bool) -> Option<ComponentInfo> {
        self.components.insert(normalize(scheme.as_ref()), ComponentInfo { remote })
    }

    pub fn get(&self, scheme: &str) -> Option<ComponentInfo> {
        self.components.get(normalize(scheme).as_str()).copied()
    }

    /// `None` when the scheme is unknown.
    pub fn is_remote(&self, scheme: &str) -> Option<bool> {
        self.get(scheme).map(|info| info.remote)
    }

    pub fn contains(&self, scheme: &str) -> bool {
        self.get(scheme).is_some()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl From<BTreeMap<SmolStr, ComponentInfo>> for ComponentCatalog {
    fn from(components: BTreeMap<SmolStr, ComponentInfo>) -> Self {
        let components = components
            .into_iter()
            .map(|(scheme, info)| (normalize(&scheme), info))
            .collect();
        Self { components }
    }
}

impl From<ComponentCatalog> for BTreeMap<SmolStr, ComponentInfo> {
    fn from(catalog: ComponentCatalog) -> Self {
        catalog.components
    }
}

fn normalize(scheme: &str) -> SmolStr {
    if scheme.bytes().any(|b| b.is_ascii_uppercase()) {
        SmolStr::new(scheme.to_ascii_lowercase())
    } else {
        SmolStr::new(scheme)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogError(String);

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid component catalog: {}", self.0)
    }
}

impl std::error::Error for CatalogError {}

#[cfg(test)]
mod tests {
    use super::ComponentCatalog;

    #[test]
    fn builtin_catalog_splits_local_and_remote() {
        let catalog = ComponentCatalog::default();
        assert_eq!(catalog.is_remote("log"), Some(false));
        assert_eq!(catalog.is_remote("timer"), Some(false));
        assert_eq!(catalog.is_remote("kafka"), Some(true));
        assert_eq!(catalog.is_remote("HTTPS"), Some(true));
        assert_eq!(catalog.is_remote("acme-bus"), None);
    }

    #[test]
    fn json_catalog_normalizes_schemes() {
        let catalog = ComponentCatalog::from_json_str(
            r#"{"Acme-Bus": {"remote": true}, "audit": {"remote": false}}"#,
        )
        .expect("catalog");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.is_remote("acme-bus"), Some(true));
        assert_eq!(catalog.is_remote("AUDIT"), Some(false));
        assert!(!catalog.contains("log"));

        let json = serde_json::to_value(&catalog).expect("json");
        assert_eq!(json["acme-bus"]["remote"], true);
    }

    #[test]
    fn register_replaces_existing_entries() {
        let mut catalog = ComponentCatalog::empty();
        assert!(catalog.is_empty());
        assert_eq!(catalog.register("file", false), None);
        assert_eq!(catalog.register("FILE", true).map(|info| info.remote), Some(false));
        assert_eq!(catalog.is_remote("file"), Some(true));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = ComponentCatalog::from_json_str("[1, 2]").expect_err("not a map");
        assert!(err.to_string().starts_with("invalid component catalog"));
    }
}
