// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Position registry: last-known screen geometry and adjacency of every rendered step.
//!
//! The registry is the only shared mutable structure. Writers (the node renderers) call
//! [`PositionRegistry::report`], [`PositionRegistry::remove`] and [`PositionRegistry::clear`];
//! the engine never reads the live map, it works on a [`PositionSnapshot`]. Snapshots share the
//! map with the registry until the next write, which copies it (copy-on-write), so a snapshot
//! never observes a half-applied measurement cycle.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::model::{ParentRef, Rect, StepEntry, StepId, StepKind};


/// Tree adjacency as reported by the renderer alongside the geometry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Adjacency {
    pub parent: Option<ParentRef>,
    pub prev_step: Option<StepId>,
    pub next_step: Option<StepId>,
    pub position_index: usize,
    pub sibling_count: usize,
    /// `true` inside a `steps` sequence, `false` inside a single-purpose slot.
    pub inside_steps: bool,
}

impl Adjacency {
    pub fn root() -> Self {
        Self {
            sibling_count: 1,
            ..Self::default()
        }
    }

    pub fn from_entry(entry: &StepEntry) -> Self {
        Self {
            parent: entry.parent.clone(),
            prev_step: entry.prev_step.clone(),
            next_step: entry.next_step.clone(),
            position_index: entry.position_index,
            sibling_count: entry.sibling_count,
            inside_steps: entry.inside_steps(),
        }
    }

    pub fn is_first(&self) -> bool {
        self.position_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.position_index + 1 >= self.sibling_count
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub uuid: StepId,
    pub kind: StepKind,
    pub header_rect: Rect,
    pub body_rect: Rect,
    pub adjacency: Adjacency,
}

impl PositionRecord {
    pub fn new(
        uuid: StepId,
        kind: StepKind,
        header_rect: Rect,
        body_rect: Rect,
        adjacency: Adjacency,
    ) -> Self {
        Self { uuid, kind, header_rect, body_rect, adjacency }
    }

    pub fn parent(&self) -> Option<&ParentRef> {
        self.adjacency.parent.as_ref()
    }

    pub fn parent_kind(&self) -> Option<StepKind> {
        self.adjacency.parent.as_ref().map(|parent| parent.kind)
    }
}

type RecordMap = BTreeMap<StepId, PositionRecord>;

/// Immutable view of the registry taken at one point in time.
#[derive(Debug, Clone, Default)]
pub struct PositionSnapshot {
    records: Arc<RecordMap>,
    version: u64,
}

impl PositionSnapshot {
    /// Builds a standalone snapshot, e.g. for a host that measures everything in one go.
    pub fn from_records(records: impl IntoIterator<Item = PositionRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.uuid.clone(), record))
            .collect::<RecordMap>();
        Self { records: Arc::new(records), version: 0 }
    }

    pub fn get(&self, uuid: &StepId) -> Option<&PositionRecord> {
        self.records.get(uuid)
    }

    pub fn contains(&self, uuid: &StepId) -> bool {
        self.records.contains_key(uuid)
    }

    pub fn records(&self) -> impl Iterator<Item = &PositionRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Registry version the snapshot was taken at.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// `true` when both snapshots hold the same records. Snapshots sharing storage compare in O(1).
    pub fn same_records(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.records, &other.records) || self.records == other.records
    }

    /// Bounding box of every header and body rectangle.
    pub fn bounds(&self) -> Option<Rect> {
        self.records
            .values()
            .flat_map(|record| [record.header_rect, record.body_rect])
            .filter(|rect| !rect.is_empty())
            .reduce(|acc, rect| acc.union(&rect))
    }
}

#[derive(Debug, Default)]
pub(crate) struct RegistryState {
    records: Arc<RecordMap>,
    version: u64,
}

impl RegistryState {
    pub(crate) fn report(&mut self, record: PositionRecord) -> bool {
        if self.records.get(&record.uuid) == Some(&record) {
            return false;
        }
        Arc::make_mut(&mut self.records).insert(record.uuid.clone(), record);
        self.version = self.version.saturating_add(1);
        true
    }

    pub(crate) fn remove(&mut self, uuid: &StepId) -> Option<PositionRecord> {
        if !self.records.contains_key(uuid) {
            return None;
        }
        let removed = Arc::make_mut(&mut self.records).remove(uuid);
        self.version = self.version.saturating_add(1);
        removed
    }

    pub(crate) fn clear(&mut self) -> bool {
        if self.records.is_empty() {
            return false;
        }
        self.records = Arc::new(RecordMap::new());
        self.version = self.version.saturating_add(1);
        true
    }

    pub(crate) fn version(&self) -> u64 {
        self.version
    }
}

/// Thread-safe keyed store of [`PositionRecord`]s; last writer wins per key.
#[derive(Debug, Default)]
pub struct PositionRegistry {
    state: RwLock<RegistryState>,
}

impl PositionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts a record. Returns `false` when the stored record was already identical.
    pub fn report(&self, record: PositionRecord) -> bool {
        self.state.write().report(record)
    }

    pub fn remove(&self, uuid: &StepId) -> Option<PositionRecord> {
        self.state.write().remove(uuid)
    }

    pub fn clear(&self) {
        self.state.write().clear();
    }

    pub fn get(&self, uuid: &StepId) -> Option<PositionRecord> {
        self.state.read().records.get(uuid).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().records.is_empty()
    }

    /// Bumped by every mutation that changed the stored records.
    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    pub fn snapshot(&self) -> PositionSnapshot {
        let state = self.state.read();
        PositionSnapshot {
            records: Arc::clone(&state.records),
            version: state.version,
        }
    }

    /// Runs `f` under a single write lock, so a batch lands atomically.
    pub(crate) fn with_state_mut<R>(&self, f: impl FnOnce(&mut RegistryState) -> R) -> R {
        f(&mut self.state.write())
    }
}
