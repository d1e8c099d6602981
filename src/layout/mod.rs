// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Topology passes over measured geometry.
//!
//! Derives control-flow edges between rendered steps and spaces dock markers apart.

pub mod edges;
pub mod overlap;

pub use edges::{derive_edges, edge_key, Edge, EdgeAnchor};
pub use overlap::{resolve_anchor_overlaps, resolve_overlaps, DockAnchor, OverlapOutcome};
