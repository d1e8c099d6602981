// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::model::{ParentRef, StepId, StepIndex};
use crate::registry::{PositionRecord, PositionSnapshot};


/// Which rectangle of a node an edge attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeAnchor {
    Header,
    /// The node's body; edges leave from its footer.
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub from: StepId,
    pub to: StepId,
    pub from_anchor: EdgeAnchor,
    pub to_anchor: EdgeAnchor,
}

impl Edge {
    pub fn new(from: StepId, to: StepId, from_anchor: EdgeAnchor, to_anchor: EdgeAnchor) -> Self {
        Self { from, to, from_anchor, to_anchor }
    }

    /// `"{from}->{to}"`, unique per render pass.
    pub fn key(&self) -> String {
        edge_key(&self.from, &self.to)
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

pub fn edge_key(from: &StepId, to: &StepId) -> String {
    format!("{from}->{to}")
}

struct EdgeDerivation<'a> {
    snapshot: &'a PositionSnapshot,
    index: Option<&'a StepIndex>,
    /// Parent per record after validation against the step tree.
    parents: BTreeMap<&'a StepId, Option<&'a ParentRef>>,
    /// Rendered children per parent uuid.
    children: BTreeMap<&'a StepId, Vec<&'a PositionRecord>>,
    edges: BTreeMap<String, Edge>,
}

impl<'a> EdgeDerivation<'a> {
    fn new(snapshot: &'a PositionSnapshot, index: Option<&'a StepIndex>) -> Self {
        let mut parents = BTreeMap::new();
        let mut children = BTreeMap::<&StepId, Vec<&PositionRecord>>::new();

        for record in snapshot.records() {
            if index.is_some_and(|index| !index.contains(&record.uuid)) {
                tracing::debug!(step = %record.uuid, "ignoring stale position record");
                continue;
            }
            let parent = match (record.parent(), index) {
                (Some(parent), Some(index)) if !index.contains(&parent.uuid) => {
                    tracing::warn!(
                        step = %record.uuid,
                        parent = %parent.uuid,
                        "reported parent is not part of the step tree; treating step as root-level"
                    );
                    None
                }
                (parent, _) => parent,
            };
            if let Some(parent) = parent {
                children.entry(&parent.uuid).or_default().push(record);
            }
            parents.insert(&record.uuid, parent);
        }

        for siblings in children.values_mut() {
            siblings.sort_by(|a, b| {
                (!a.adjacency.inside_steps, a.adjacency.position_index, &a.uuid).cmp(&(
                    !b.adjacency.inside_steps,
                    b.adjacency.position_index,
                    &b.uuid,
                ))
            });
        }

        Self { snapshot, index, parents, children, edges: BTreeMap::new() }
    }

    /// Rendered and, when the tree is known, still part of it.
    fn is_live(&self, uuid: &StepId) -> bool {
        self.snapshot.contains(uuid) && self.index.map_or(true, |index| index.contains(uuid))
    }

    fn parent_of(&self, record: &PositionRecord) -> Option<&'a ParentRef> {
        self.parents.get(&record.uuid).copied().flatten()
    }

    fn has_body(&self, uuid: &StepId) -> bool {
        self.children.get(uuid).is_some_and(|children| !children.is_empty())
    }

    fn first_in_steps(&self, uuid: &StepId) -> Option<&'a PositionRecord> {
        self.children
            .get(uuid)?
            .iter()
            .copied()
            .find(|child| child.adjacency.inside_steps && child.adjacency.is_first())
    }

    fn exit_anchor(&self, record: &PositionRecord) -> EdgeAnchor {
        if self.has_body(&record.uuid) {
            EdgeAnchor::Body
        } else {
            EdgeAnchor::Header
        }
    }

    /// Walks up from `start` to the step that runs after the enclosing construct.
    fn reconvergence_target(&self, start: &StepId) -> Option<&'a StepId> {
        let snapshot = self.snapshot;
        let mut cursor = snapshot.get(start)?;
        // Bounded so a malformed parent chain cannot loop forever.
        for _ in 0..=snapshot.len() {
            let parent = self.parent_of(cursor);
            if parent.is_some_and(|parent| parent.kind.is_parallel()) {
                return None;
            }
            if cursor.adjacency.inside_steps {
                if let Some(next) = cursor.adjacency.next_step.as_ref() {
                    return Some(next);
                }
            }
            cursor = snapshot.get(&parent?.uuid)?;
        }
        tracing::warn!(step = %start, "parent chain does not terminate; skipping branch exit");
        None
    }

    fn add(&mut self, from: &StepId, to: &StepId, from_anchor: EdgeAnchor, to_anchor: EdgeAnchor) {
        if from == to {
            return;
        }
        if !self.is_live(from) || !self.is_live(to) {
            tracing::debug!(%from, %to, "dropping edge with missing geometry");
            return;
        }
        let edge = Edge::new(from.clone(), to.clone(), from_anchor, to_anchor);
        self.edges.insert(edge.key(), edge);
    }

    fn visit(&mut self, record: &'a PositionRecord) {
        let parent = self.parent_of(record);
        let adjacency = &record.adjacency;
        let merges_itself = record.kind.is_merging() && self.has_body(&record.uuid);

        // Branch entry: the branching construct's header feeds each branch head.
        if let Some(parent) = parent {
            let heads_branch = parent.kind.is_parallel()
                || !adjacency.inside_steps
                || adjacency.is_first();
            if parent.kind.is_branching() && heads_branch {
                self.add(&parent.uuid, &record.uuid, EdgeAnchor::Header, EdgeAnchor::Header);
            }
        }

        // Branch exit: the last step of a branch rejoins wherever the construct continues.
        if let Some(parent) = parent {
            if parent.kind.reconverges()
                && adjacency.inside_steps
                && adjacency.is_last()
                && !merges_itself
            {
                if let Some(target) = self.reconvergence_target(&parent.uuid) {
                    let anchor = self.exit_anchor(record);
                    self.add(&record.uuid, target, anchor, EdgeAnchor::Header);
                }
            }
        }

        // Sequential: next step in the same `steps` sequence.
        if let Some(next) = adjacency.next_step.as_ref() {
            let parallel = parent.is_some_and(|parent| parent.kind.is_parallel());
            if adjacency.inside_steps && !parallel && !merges_itself {
                let anchor = self.exit_anchor(record);
                self.add(&record.uuid, next, anchor, EdgeAnchor::Header);
            }
        }

        // Nested body: header into the first step; branching kinds are covered by branch entry.
        if !record.kind.is_branching() {
            if let Some(first) = self.first_in_steps(&record.uuid) {
                self.add(&record.uuid, &first.uuid, EdgeAnchor::Header, EdgeAnchor::Header);
            }
        }
    }
}

/// Derives the control-flow edges between rendered steps.
///
/// Every record contributes independently; candidates are keyed by `"{from}->{to}"` so each
/// pair appears once. Candidates whose endpoints have no geometry are dropped. With an `index`,
/// records whose reported parent is missing from the step tree are treated as root-level and
/// records whose own step is gone are ignored.
///
/// The result is sorted by edge key.
pub fn derive_edges(snapshot: &PositionSnapshot, index: Option<&StepIndex>) -> Vec<Edge> {
    let mut derivation = EdgeDerivation::new(snapshot, index);

    let live = derivation.parents.keys().copied().collect::<Vec<_>>();
    for uuid in live {
        if let Some(record) = snapshot.get(uuid) {
            derivation.visit(record);
        }
    }

    derivation.edges.into_values().collect()
}
