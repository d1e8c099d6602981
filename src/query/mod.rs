// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over integrations.
//!
//! Classifies how each route entry and call site connects to the world outside the diagram,
//! backed by a component catalog and a cross-file topology index.

pub mod catalog;
pub mod links;
pub mod topology;

pub use catalog::{CatalogError, ComponentCatalog, ComponentInfo};
pub use links::{
    anchor_links, classify_integration, Classification, ClassifiedLink, LaneOutcomes,
    LinkCategory, LinkRole, LinkSet, RouteTargets,
};
pub use topology::{EndpointSite, RouteRef, TopologyIndex};
