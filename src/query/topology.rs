// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Cross-file index of route entries and the call sites that reach them.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{
    walk, EndpointKey, EndpointUri, FileName, Integration, RouteId, StepId, StepKind, StepNode,
    VisitContext,
};

/// A route, qualified by the file that defines it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RouteRef {
    pub route: RouteId,
    pub file: FileName,
}

impl RouteRef {
    pub fn new(route: RouteId, file: FileName) -> Self {
        Self { route, file }
    }
}

/// A step inside a route that either provides or calls an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EndpointSite {
    pub route: RouteRef,
    pub step: StepId,
}

type SiteMap = BTreeMap<EndpointKey, BTreeSet<EndpointSite>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyIndex {
    #[serde(with = "site_map")]
    entries: SiteMap,
    #[serde(with = "site_map")]
    callers: SiteMap,
    version: u64,
}

impl TopologyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_integrations<'a>(integrations: impl IntoIterator<Item = &'a Integration>) -> Self {
        let mut index = Self::new();
        for integration in integrations {
            index.index_integration(integration);
        }
        index
    }

    /// Bumped by every effective change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn add_entry(&mut self, key: EndpointKey, site: EndpointSite) -> bool {
        let added = self.entries.entry(key).or_default().insert(site);
        self.touch(added)
    }

    pub fn add_caller(&mut self, key: EndpointKey, site: EndpointSite) -> bool {
        let added = self.callers.entry(key).or_default().insert(site);
        self.touch(added)
    }

    /// Drops every entry and caller defined in `file`.
    pub fn remove_file(&mut self, file: &FileName) -> bool {
        let removed = retain_sites(&mut self.entries, file) | retain_sites(&mut self.callers, file);
        self.touch(removed)
    }

    /// Replaces whatever `integration`'s file contributed before.
    ///
    /// Every route entry registers under its endpoint key; Kamelet definition files also register
    /// their routes under `kamelet:<name>`. Plain `to` call sites and Kamelet calls register as
    /// callers. Dynamic targets cannot be resolved statically and polls consume rather than call,
    /// so neither registers.
    pub fn index_integration(&mut self, integration: &Integration) {
        let file = integration.file();
        let (entries, callers) = collect_sites(integration);

        let unchanged = entries == sites_in_file(&self.entries, file)
            && callers == sites_in_file(&self.callers, file);
        if unchanged {
            return;
        }

        retain_sites(&mut self.entries, file);
        retain_sites(&mut self.callers, file);
        for (key, site) in entries {
            self.entries.entry(key).or_default().insert(site);
        }
        for (key, site) in callers {
            self.callers.entry(key).or_default().insert(site);
        }
        self.version += 1;
    }

    pub fn entries_for<'a>(&'a self, key: &EndpointKey) -> impl Iterator<Item = &'a EndpointSite> + 'a {
        self.entries.get(key).into_iter().flatten()
    }

    pub fn callers_of<'a>(&'a self, key: &EndpointKey) -> impl Iterator<Item = &'a EndpointSite> + 'a {
        self.callers.get(key).into_iter().flatten()
    }

    pub fn entry_keys(&self) -> impl Iterator<Item = &EndpointKey> {
        self.entries.keys()
    }

    fn touch(&mut self, changed: bool) -> bool {
        if changed {
            self.version += 1;
        }
        changed
    }
}

type SiteList = BTreeSet<(EndpointKey, EndpointSite)>;

fn collect_sites(integration: &Integration) -> (SiteList, SiteList) {
    let file = integration.file();
    let kamelet = integration.kamelet().map(EndpointKey::kamelet);
    let mut entries = SiteList::new();
    let mut callers = SiteList::new();

    let mut visitor = |step: &StepNode, _siblings: &[StepNode], ctx: &VisitContext<'_>| {
        let Some(route) = ctx.route else {
            return;
        };
        let site = || EndpointSite {
            route: RouteRef::new(route.clone(), file.clone()),
            step: step.uuid().clone(),
        };
        match step.kind() {
            StepKind::RouteStart => {
                if let Some(key) = step.uri().and_then(parsed_key) {
                    entries.insert((key, site()));
                }
                if let Some(key) = kamelet.clone() {
                    entries.insert((key, site()));
                }
            }
            StepKind::PlainTo => {
                if let Some(key) = step.uri().and_then(parsed_key) {
                    callers.insert((key, site()));
                }
            }
            StepKind::KameletCall => {
                if let Some(name) = step.kamelet_name() {
                    callers.insert((EndpointKey::kamelet(name), site()));
                }
            }
            _ => {}
        }
    };
    walk(integration.elements(), &mut visitor);

    (entries, callers)
}

fn sites_in_file(map: &SiteMap, file: &FileName) -> SiteList {
    map.iter()
        .flat_map(|(key, sites)| sites.iter().map(move |site| (key, site)))
        .filter(|(_, site)| &site.route.file == file)
        .map(|(key, site)| (key.clone(), site.clone()))
        .collect()
}

fn parsed_key(uri: &str) -> Option<EndpointKey> {
    match EndpointUri::parse(uri) {
        Ok(uri) => Some(uri.key()),
        Err(err) => {
            tracing::debug!(%err, "skipping unparseable endpoint in topology index");
            None
        }
    }
}

fn retain_sites(map: &mut SiteMap, file: &FileName) -> bool {
    let mut removed = false;
    map.retain(|_, sites| {
        let before = sites.len();
        sites.retain(|site| &site.route.file != file);
        removed |= sites.len() != before;
        !sites.is_empty()
    });
    removed
}

/// JSON object keys must be strings, so the maps travel as `[key, sites]` pairs.
mod site_map {
    use std::collections::BTreeSet;

    use serde::{Deserialize, Deserializer, Serializer};

    use super::{EndpointSite, SiteMap};
    use crate::model::EndpointKey;

    pub(super) fn serialize<S: Serializer>(map: &SiteMap, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(map.iter())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SiteMap, D::Error> {
        let pairs = Vec::<(EndpointKey, BTreeSet<EndpointSite>)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().filter(|(_, sites)| !sites.is_empty()).collect())
    }
}
