// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Connector output for the rendering layer.
//!
//! A render pass turns one position snapshot into edges, dock links and the curve geometry for
//! each of them. Output is plain data (`serde::Serialize`) so it can cross into any renderer.

pub mod pass;
pub mod paths;

pub use pass::{CacheKey, RenderCache, RenderOutput, RenderPass};
pub use paths::{
    edge_path, internal_path, link_path, ArrowPlacement, ConnectorPath, DiagramFrame, PathSegment,
};
