// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Vertical spacing of dock markers that share a lane.

use serde::Serialize;

use crate::config::RoutingOptions;

/// Something with a vertical anchor in a dock lane.
pub trait DockAnchor {
    fn anchor(&self) -> f64;
    fn set_anchor(&mut self, anchor: f64);
    /// Breaks ties between equal anchors so the order is stable.
    fn tie_key(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OverlapOutcome {
    /// No pair violated the clearance.
    AlreadyClear,
    /// Markers were pushed apart; `passes` full scans moved something.
    Resolved { passes: usize },
    /// The pass limit was hit; the input anchors were restored.
    Unresolved { passes: usize },
}

impl OverlapOutcome {
    pub fn is_resolved(self) -> bool {
        !matches!(self, Self::Unresolved { .. })
    }
}

/// Sorts `anchors` ascending and pushes them apart until neighbours are at least
/// `min_clearance` apart.
///
/// A violating anchor moves to exactly `min_clearance` below its (already adjusted) predecessor.
/// The full scan repeats until nothing moves. If `max_passes` scans still move something the
/// sorted, unadjusted anchors are restored and [`OverlapOutcome::Unresolved`] is returned.
pub fn resolve_anchor_overlaps(
    anchors: &mut [f64],
    min_clearance: f64,
    max_passes: usize,
) -> OverlapOutcome {
    anchors.sort_by(f64::total_cmp);
    let original = anchors.to_vec();

    for pass in 0..max_passes {
        if !push_apart(anchors, min_clearance) {
            return if pass == 0 {
                OverlapOutcome::AlreadyClear
            } else {
                OverlapOutcome::Resolved { passes: pass }
            };
        }
    }

    if is_clear(anchors, min_clearance) {
        return OverlapOutcome::Resolved { passes: max_passes };
    }

    tracing::warn!(
        markers = anchors.len(),
        max_passes,
        "overlap resolution did not settle; keeping overlapping layout"
    );
    anchors.copy_from_slice(&original);
    OverlapOutcome::Unresolved { passes: max_passes }
}

/// Same as [`resolve_anchor_overlaps`] for a lane of markers; `items` ends up sorted by anchor.
pub fn resolve_overlaps<T: DockAnchor>(items: &mut [T], options: &RoutingOptions) -> OverlapOutcome {
    items.sort_by(|a, b| {
        a.anchor().total_cmp(&b.anchor()).then_with(|| a.tie_key().cmp(b.tie_key()))
    });

    let mut anchors = items.iter().map(DockAnchor::anchor).collect::<Vec<_>>();
    let outcome =
        resolve_anchor_overlaps(&mut anchors, options.min_clearance, options.max_overlap_passes);
    for (item, anchor) in items.iter_mut().zip(anchors) {
        item.set_anchor(anchor);
    }
    outcome
}

fn push_apart(anchors: &mut [f64], min_clearance: f64) -> bool {
    let mut moved = false;
    for idx in 1..anchors.len() {
        let floor = anchors[idx - 1] + min_clearance;
        if anchors[idx] < floor {
            anchors[idx] = floor;
            moved = true;
        }
    }
    moved
}

fn is_clear(anchors: &[f64], min_clearance: f64) -> bool {
    anchors.windows(2).all(|pair| pair[1] >= pair[0] + min_clearance)
}
