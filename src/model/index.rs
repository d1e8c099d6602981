// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tree adjacency derived from an [`Integration`].
//!
//! The rendering layer uses this to fill in the adjacency of its position reports; the edge
//! engine uses it to reject reports whose parent no longer exists in the tree.

use std::collections::BTreeMap;

use super::document::Integration;
use super::ids::{RouteId, StepId};
use super::step::{walk, ChildSlot, StepKind, StepNode, VisitContext};

/// Immediate structural parent of a step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ParentRef {
    pub uuid: StepId,
    pub kind: StepKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEntry {
    pub kind: StepKind,
    pub parent: Option<ParentRef>,
    pub route: Option<RouteId>,
    pub slot: Option<ChildSlot>,
    pub position_index: usize,
    pub sibling_count: usize,
    pub prev_step: Option<StepId>,
    pub next_step: Option<StepId>,
    pub has_children: bool,
}

impl StepEntry {
    pub fn inside_steps(&self) -> bool {
        self.slot.is_some_and(ChildSlot::is_steps)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepIndex {
    entries: BTreeMap<StepId, StepEntry>,
}

impl StepIndex {
    pub fn build(integration: &Integration) -> Self {
        Self::build_from(integration.elements())
    }

    pub fn build_from(roots: &[StepNode]) -> Self {
        let mut entries = BTreeMap::<StepId, StepEntry>::new();

        let mut visitor = |step: &StepNode, siblings: &[StepNode], ctx: &VisitContext<'_>| {
            let idx = ctx.position_index;
            // Only a `steps` sequence has execution order between siblings.
            let sequential = ctx.slot.is_some_and(ChildSlot::is_steps);
            let prev_step = (sequential && idx > 0).then(|| siblings[idx - 1].uuid().clone());
            let next_step = if sequential {
                siblings.get(idx + 1).map(|next| next.uuid().clone())
            } else {
                None
            };

            entries.insert(
                step.uuid().clone(),
                StepEntry {
                    kind: step.kind(),
                    parent: ctx.parent.map(|parent| ParentRef {
                        uuid: parent.uuid().clone(),
                        kind: parent.kind(),
                    }),
                    route: ctx.route.cloned(),
                    slot: ctx.slot,
                    position_index: idx,
                    sibling_count: ctx.sibling_count,
                    prev_step,
                    next_step,
                    has_children: step.children().iter().any(|(_, nodes)| !nodes.is_empty()),
                },
            );
        };
        walk(roots, &mut visitor);

        Self { entries }
    }

    pub fn get(&self, uuid: &StepId) -> Option<&StepEntry> {
        self.entries.get(uuid)
    }

    pub fn contains(&self, uuid: &StepId) -> bool {
        self.entries.contains_key(uuid)
    }

    pub fn entries(&self) -> &BTreeMap<StepId, StepEntry> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::StepIndex;
    use crate::model::fixtures::{choice_route, sid};
    use crate::model::{ChildSlot, StepKind};

    #[test]
    fn sequential_neighbours_only_exist_inside_steps() {
        let index = StepIndex::build(&choice_route());

        let w1 = index.get(&sid("w1")).expect("when entry");
        assert_eq!(w1.slot, Some(ChildSlot::When));
        assert!(!w1.inside_steps());
        assert_eq!(w1.next_step, None);
        assert_eq!(w1.position_index, 0);
        assert_eq!(w1.sibling_count, 2);

        let choice = index.get(&sid("choice")).expect("choice entry");
        assert!(choice.inside_steps());
        assert_eq!(choice.prev_step, Some(sid("log-in")));
        assert_eq!(choice.next_step, Some(sid("done")));
        assert!(choice.has_children);
    }

    #[test]
    fn parents_carry_their_kind_and_route() {
        let index = StepIndex::build(&choice_route());
        let entry = index.get(&sid("w2-a")).expect("entry");
        let parent = entry.parent.as_ref().expect("parent");
        assert_eq!(parent.uuid, sid("w2"));
        assert_eq!(parent.kind, StepKind::When);
        assert_eq!(entry.route.as_ref().map(|r| r.as_str()), Some("choose"));
        assert!(!entry.has_children);
    }
}
