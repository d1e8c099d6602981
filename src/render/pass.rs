// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use serde::Serialize;

use super::paths::{edge_path, internal_path, link_path, ConnectorPath, DiagramFrame};
use crate::config::RoutingOptions;
use crate::layout::{derive_edges, Edge};
use crate::model::{FileName, Integration, StepIndex};
use crate::query::{
    anchor_links, classify_integration, ComponentCatalog, LaneOutcomes, LinkSet, TopologyIndex,
};
use crate::registry::PositionSnapshot;

/// Everything the rendering layer needs to draw connectors for one diagram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderOutput {
    pub edges: Vec<Edge>,
    pub edge_paths: Vec<ConnectorPath>,
    pub links: LinkSet,
    pub lanes: LaneOutcomes,
    pub link_paths: Vec<ConnectorPath>,
    pub internal_paths: Vec<ConnectorPath>,
}

impl RenderOutput {
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// The diagram and the versions of the three inputs that can change between passes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CacheKey {
    pub file: FileName,
    pub document: u64,
    pub registry: u64,
    pub topology: u64,
}

/// One full recomputation over a consistent set of inputs.
#[derive(Debug, Clone, Copy)]
pub struct RenderPass<'a> {
    integration: &'a Integration,
    snapshot: &'a PositionSnapshot,
    catalog: &'a ComponentCatalog,
    topology: &'a TopologyIndex,
    options: &'a RoutingOptions,
}

impl<'a> RenderPass<'a> {
    pub fn new(
        integration: &'a Integration,
        snapshot: &'a PositionSnapshot,
        catalog: &'a ComponentCatalog,
        topology: &'a TopologyIndex,
        options: &'a RoutingOptions,
    ) -> Self {
        Self { integration, snapshot, catalog, topology, options }
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            file: self.integration.file().clone(),
            document: self.integration.version(),
            registry: self.snapshot.version(),
            topology: self.topology.version(),
        }
    }

    pub fn run(&self) -> RenderOutput {
        let snapshot = self.snapshot;
        let options = self.options;

        let index = StepIndex::build(self.integration);
        let edges = derive_edges(snapshot, Some(&index));
        let edge_paths = edges
            .iter()
            .filter_map(|edge| edge_path(edge, snapshot, options))
            .collect::<Vec<_>>();

        let classifications =
            classify_integration(self.integration, self.catalog, self.topology, options);
        let mut links = anchor_links(classifications, snapshot);
        let lanes = links.resolve_overlaps(options);

        let link_paths = match DiagramFrame::from_snapshot(snapshot) {
            Some(frame) => links
                .incoming
                .iter()
                .chain(&links.outgoing)
                .filter_map(|link| link_path(link, snapshot, &frame, options))
                .collect(),
            None => Vec::new(),
        };
        let internal_paths = links
            .internal
            .iter()
            .filter_map(|link| internal_path(link, snapshot, options))
            .collect();

        tracing::debug!(
            file = %self.integration.file(),
            edges = edges.len(),
            links = links.len(),
            "render pass complete"
        );

        RenderOutput { edges, edge_paths, links, lanes, link_paths, internal_paths }
    }
}

#[derive(Debug)]
struct CachedPass {
    key: CacheKey,
    options: RoutingOptions,
    snapshot: PositionSnapshot,
    output: Arc<RenderOutput>,
}

impl CachedPass {
    fn matches(&self, pass: &RenderPass<'_>, key: &CacheKey) -> bool {
        self.key == *key
            && self.options == *pass.options
            && self.snapshot.same_records(pass.snapshot)
    }
}

/// Memoizes the last pass for one diagram.
///
/// Keyed by the file, the document, registry and topology versions, the routing options and the
/// snapshot's records, so standalone snapshots (which all carry version 0) never alias. A catalog
/// change is not versioned; call [`RenderCache::invalidate`] after swapping catalogs.
#[derive(Debug, Default)]
pub struct RenderCache {
    last: Option<CachedPass>,
    hits: u64,
    misses: u64,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_run(&mut self, pass: &RenderPass<'_>) -> Arc<RenderOutput> {
        let key = pass.cache_key();
        if let Some(cached) = self.last.as_ref().filter(|cached| cached.matches(pass, &key)) {
            self.hits += 1;
            return Arc::clone(&cached.output);
        }

        self.misses += 1;
        let output = Arc::new(pass.run());
        self.last = Some(CachedPass {
            key,
            options: pass.options.clone(),
            snapshot: pass.snapshot.clone(),
            output: Arc::clone(&output),
        });
        output
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
