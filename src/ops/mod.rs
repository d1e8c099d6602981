// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Position report messages.
//!
//! The rendering layer talks to the registry only through these three messages. A measurement
//! cycle can be delivered as one batch so the engine never sees it half applied.

use serde::{Deserialize, Serialize};

use crate::model::StepId;
use crate::registry::{PositionRecord, PositionRegistry};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PositionOp {
    /// A node mounted or was re-measured.
    Report(PositionRecord),
    /// A node unmounted.
    Remove { uuid: StepId },
    /// The whole document was replaced or navigated away from.
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyResult {
    /// Registry version after the batch.
    pub version: u64,
    /// Number of messages that actually changed the stored records.
    pub changed: usize,
}

impl ApplyResult {
    pub fn is_noop(&self) -> bool {
        self.changed == 0
    }
}

/// Applies `ops` in order under a single write lock.
pub fn apply_ops<I>(registry: &PositionRegistry, ops: I) -> ApplyResult
where
    I: IntoIterator<Item = PositionOp>,
{
    registry.with_state_mut(|state| {
        let mut changed = 0usize;
        for op in ops {
            let effective = match op {
                PositionOp::Report(record) => state.report(record),
                PositionOp::Remove { uuid } => state.remove(&uuid).is_some(),
                PositionOp::Clear => state.clear(),
            };
            if effective {
                changed += 1;
            }
        }
        ApplyResult { version: state.version(), changed }
    })
}
