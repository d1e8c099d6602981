// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! External link classification.
//!
//! Route entries become incoming links, call sites become outgoing links. Each link is tagged
//! with how it leaves the diagram: to another route the user can navigate to, to a remote
//! system, or not at all (internal).

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use smallvec::SmallVec;

use super::catalog::ComponentCatalog;
use super::topology::{RouteRef, TopologyIndex};
use crate::config::RoutingOptions;
use crate::layout::overlap::{resolve_overlaps, DockAnchor, OverlapOutcome};
use crate::model::{
    walk, EndpointKey, EndpointUri, Integration, RouteId, StepId, StepKind, StepNode, VisitContext,
    KAMELET_SCHEME,
};
use crate::registry::PositionSnapshot;

pub type RouteTargets = SmallVec<[RouteRef; 2]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkRole {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkCategory {
    /// Stays inside the runtime; drawn in-diagram when the target entry is rendered.
    Internal,
    Remote,
    /// Other routes the user can jump to.
    Navigable,
    Poll,
    Dynamic,
}

/// Outcome of classifying one entry or call site, before geometry is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub uuid: StepId,
    pub route: Option<RouteId>,
    pub role: LinkRole,
    pub category: LinkCategory,
    pub endpoint: Option<EndpointKey>,
    pub targets: RouteTargets,
    /// Entry step in the same file an internal call lands on.
    pub local_target: Option<StepId>,
}

/// A classified link anchored to its node's rendered header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedLink {
    pub uuid: StepId,
    pub route: Option<RouteId>,
    pub role: LinkRole,
    pub category: LinkCategory,
    pub endpoint: Option<EndpointKey>,
    pub vertical_anchor: f64,
    pub targets: RouteTargets,
    pub local_target: Option<StepId>,
}

impl ClassifiedLink {
    fn anchored(classification: Classification, vertical_anchor: f64) -> Self {
        let Classification { uuid, route, role, category, endpoint, targets, local_target } =
            classification;
        Self { uuid, route, role, category, endpoint, vertical_anchor, targets, local_target }
    }
}

impl DockAnchor for ClassifiedLink {
    fn anchor(&self) -> f64 {
        self.vertical_anchor
    }

    fn set_anchor(&mut self, anchor: f64) {
        self.vertical_anchor = anchor;
    }

    fn tie_key(&self) -> &str {
        self.uuid.as_str()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkSet {
    pub incoming: Vec<ClassifiedLink>,
    pub outgoing: Vec<ClassifiedLink>,
    pub internal: Vec<ClassifiedLink>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LaneOutcomes {
    pub incoming: OverlapOutcome,
    pub outgoing: OverlapOutcome,
}

impl LinkSet {
    /// Spaces the incoming and outgoing dock lanes independently. Internal links have no dock.
    pub fn resolve_overlaps(&mut self, options: &RoutingOptions) -> LaneOutcomes {
        LaneOutcomes {
            incoming: resolve_overlaps(&mut self.incoming, options),
            outgoing: resolve_overlaps(&mut self.outgoing, options),
        }
    }

    pub fn len(&self) -> usize {
        self.incoming.len() + self.outgoing.len() + self.internal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassifiedLink> {
        self.incoming.iter().chain(&self.outgoing).chain(&self.internal)
    }
}

struct Classifier<'a> {
    integration: &'a Integration,
    catalog: &'a ComponentCatalog,
    topology: &'a TopologyIndex,
    options: &'a RoutingOptions,
    /// Entries defined in this file, by endpoint key.
    local_entries: BTreeMap<EndpointKey, StepId>,
}

impl<'a> Classifier<'a> {
    fn new(
        integration: &'a Integration,
        catalog: &'a ComponentCatalog,
        topology: &'a TopologyIndex,
        options: &'a RoutingOptions,
    ) -> Self {
        let mut local_entries = BTreeMap::new();
        let kamelet = integration.kamelet().map(EndpointKey::kamelet);
        for (_, route) in integration.routes() {
            for (_, entries) in route.children() {
                for entry in entries.iter().filter(|step| step.kind() == StepKind::RouteStart) {
                    if let Some(Ok(uri)) = entry.uri().map(EndpointUri::parse) {
                        local_entries.entry(uri.key()).or_insert_with(|| entry.uuid().clone());
                    }
                    if let Some(key) = kamelet.clone() {
                        local_entries.entry(key).or_insert_with(|| entry.uuid().clone());
                    }
                }
            }
        }
        Self { integration, catalog, topology, options, local_entries }
    }

    fn classify(&self, step: &StepNode, route: Option<&RouteId>) -> Option<Classification> {
        match step.kind() {
            StepKind::RouteStart => self.classify_entry(step, route),
            kind if kind.is_call_site() => Some(self.classify_call(step, route)),
            _ => None,
        }
    }

    fn classify_entry(&self, step: &StepNode, route: Option<&RouteId>) -> Option<Classification> {
        let uri = match step.uri().map(EndpointUri::parse) {
            Some(Ok(uri)) => uri,
            Some(Err(err)) => {
                tracing::debug!(step = %step.uuid(), %err, "unparseable entry endpoint; treating as remote");
                return Some(self.link(step, route, LinkRole::Incoming, LinkCategory::Remote, None));
            }
            None => return None,
        };

        if self.options.is_placeholder_entry(&uri.base()) {
            return None;
        }

        let key = uri.key();
        if self.options.is_navigable_scheme(uri.scheme()) {
            let targets = self.callers(&key);
            let mut link =
                self.link(step, route, LinkRole::Incoming, LinkCategory::Navigable, Some(key));
            link.targets = targets;
            return Some(link);
        }

        match self.catalog.is_remote(uri.scheme()) {
            Some(false) => None,
            _ => Some(self.link(step, route, LinkRole::Incoming, LinkCategory::Remote, Some(key))),
        }
    }

    fn classify_call(&self, step: &StepNode, route: Option<&RouteId>) -> Classification {
        let outgoing = |category, endpoint| self.link(step, route, LinkRole::Outgoing, category, endpoint);

        if let Some(name) = step.kamelet_name() {
            return self.navigable_or_internal(step, route, EndpointKey::kamelet(name));
        }

        let parsed = step.uri().map(EndpointUri::parse);
        let uri = match step.kind() {
            StepKind::Poll => return outgoing(LinkCategory::Poll, endpoint_key(parsed)),
            StepKind::DynamicTo => return outgoing(LinkCategory::Dynamic, endpoint_key(parsed)),
            _ => match parsed {
                Some(Ok(uri)) => uri,
                Some(Err(err)) => {
                    tracing::debug!(step = %step.uuid(), %err, "unparseable call endpoint; treating as remote");
                    return outgoing(LinkCategory::Remote, None);
                }
                None => return outgoing(LinkCategory::Remote, None),
            },
        };

        if uri.scheme() == KAMELET_SCHEME || self.options.is_navigable_scheme(uri.scheme()) {
            return self.navigable_or_internal(step, route, uri.key());
        }
        match self.catalog.is_remote(uri.scheme()) {
            Some(false) => outgoing(LinkCategory::Internal, Some(uri.key())),
            _ => outgoing(LinkCategory::Remote, Some(uri.key())),
        }
    }

    fn navigable_or_internal(
        &self,
        step: &StepNode,
        route: Option<&RouteId>,
        key: EndpointKey,
    ) -> Classification {
        if let Some(entry) = self.local_entries.get(&key) {
            let mut link = self.link(step, route, LinkRole::Outgoing, LinkCategory::Internal, Some(key));
            link.local_target = Some(entry.clone());
            return link;
        }

        let own = route.map(|route| RouteRef::new(route.clone(), self.integration.file().clone()));
        let targets = self
            .topology
            .entries_for(&key)
            .map(|site| site.route.clone())
            .filter(|target| Some(target) != own.as_ref())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut link = self.link(step, route, LinkRole::Outgoing, LinkCategory::Navigable, Some(key));
        link.targets = targets;
        link
    }

    /// Routes in other files that call `key`, deduplicated and sorted.
    fn callers(&self, key: &EndpointKey) -> RouteTargets {
        let own_file = self.integration.file();
        self.topology
            .callers_of(key)
            .filter(|site| &site.route.file != own_file)
            .map(|site| site.route.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn link(
        &self,
        step: &StepNode,
        route: Option<&RouteId>,
        role: LinkRole,
        category: LinkCategory,
        endpoint: Option<EndpointKey>,
    ) -> Classification {
        Classification {
            uuid: step.uuid().clone(),
            route: route.cloned(),
            role,
            category,
            endpoint,
            targets: RouteTargets::new(),
            local_target: None,
        }
    }
}

fn endpoint_key<E>(parsed: Option<Result<EndpointUri, E>>) -> Option<EndpointKey> {
    parsed.and_then(Result::ok).map(|uri| uri.key())
}

/// Classifies every route entry and call site of `integration`, in document order.
///
/// Classification never fails: unknown or unparseable endpoints become remote links. Hidden
/// entries (placeholders and local components such as timers) produce nothing.
pub fn classify_integration(
    integration: &Integration,
    catalog: &ComponentCatalog,
    topology: &TopologyIndex,
    options: &RoutingOptions,
) -> Vec<Classification> {
    let classifier = Classifier::new(integration, catalog, topology, options);
    let mut out = Vec::new();
    let mut visitor = |step: &StepNode, _siblings: &[StepNode], ctx: &VisitContext<'_>| {
        if let Some(classification) = classifier.classify(step, ctx.route) {
            out.push(classification);
        }
    };
    walk(integration.elements(), &mut visitor);
    out
}

/// Attaches each classification to its node's header center and sorts links into lanes.
///
/// Classifications without geometry are dropped. Lanes are ordered by anchor, then uuid.
pub fn anchor_links(
    classifications: impl IntoIterator<Item = Classification>,
    snapshot: &PositionSnapshot,
) -> LinkSet {
    let mut set = LinkSet::default();
    for classification in classifications {
        let Some(record) = snapshot.get(&classification.uuid) else {
            tracing::debug!(step = %classification.uuid, "dropping link without geometry");
            continue;
        };
        let link = ClassifiedLink::anchored(classification, record.header_rect.center_y());
        let lane = match (link.category, link.role) {
            (LinkCategory::Internal, _) => &mut set.internal,
            (_, LinkRole::Incoming) => &mut set.incoming,
            (_, LinkRole::Outgoing) => &mut set.outgoing,
        };
        lane.push(link);
    }

    for lane in [&mut set.incoming, &mut set.outgoing, &mut set.internal] {
        lane.sort_by(|a, b| {
            a.vertical_anchor
                .total_cmp(&b.vertical_anchor)
                .then_with(|| a.uuid.cmp(&b.uuid))
        });
    }
    set
}
