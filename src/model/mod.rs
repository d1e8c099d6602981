// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Step tree model and geometry primitives.
//!
//! Integrations contain routes; routes contain a typed tree of steps. The routing engine only
//! ever reads a snapshot of this model.

pub mod document;
pub mod endpoint;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod geometry;
pub mod ids;
pub mod index;
pub mod step;

pub use document::{Integration, IntegrationError};
pub use endpoint::{EndpointKey, EndpointParseError, EndpointUri, KAMELET_SCHEME};
pub use geometry::{Point, Rect};
pub use ids::{FileName, Id, IdError, RouteId, StepId};
pub use index::{ParentRef, StepEntry, StepIndex};
pub use step::{
    walk, ChildSlot, ParseStepKindError, StepBody, StepKind, StepNode, StepVisitor, VisitContext,
};
