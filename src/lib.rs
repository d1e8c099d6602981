// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Flowlines: flow topology and connection routing for visual integration-route editors.
//!
//! The rendering layer reports where each step ended up on screen ([`registry`]). A render
//! pass ([`render::RenderPass`]) then derives the control-flow edges between steps
//! ([`layout::edges`]), classifies how entries and call sites leave the diagram
//! ([`query::links`]), spaces dock markers apart ([`layout::overlap`]) and builds the connector
//! curves ([`render::paths`]).

pub mod config;
pub mod layout;
pub mod model;
pub mod ops;
pub mod query;
pub mod registry;
pub mod render;

pub use config::{RoutingOptions, RoutingOptionsError};
