// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;
use std::fmt;

use smol_str::SmolStr;

use super::ids::{FileName, RouteId, StepId};
use super::step::{walk, StepKind, StepNode, VisitContext};

/// One integration file: its top-level routes and route configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Integration {
    file: FileName,
    version: u64,
    kamelet: Option<SmolStr>,
    elements: Vec<StepNode>,
}

impl Integration {
    pub fn new(file: FileName) -> Self {
        Self {
            file,
            version: 0,
            kamelet: None,
            elements: Vec::new(),
        }
    }

    pub fn new_with(file: FileName, elements: Vec<StepNode>) -> Self {
        Self {
            file,
            version: 0,
            kamelet: None,
            elements,
        }
    }

    pub fn file(&self) -> &FileName {
        &self.file
    }

    /// Document revision; the editor bumps it on every change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    pub fn bump_version(&mut self) -> u64 {
        self.version = self.version.saturating_add(1);
        self.version
    }

    /// Name of the Kamelet this file defines, if it is a Kamelet definition.
    pub fn kamelet(&self) -> Option<&str> {
        self.kamelet.as_deref()
    }

    pub fn set_kamelet<T: Into<SmolStr>>(&mut self, kamelet: Option<T>) {
        self.kamelet = kamelet.map(Into::into);
    }

    pub fn elements(&self) -> &[StepNode] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut Vec<StepNode> {
        &mut self.elements
    }

    pub fn routes(&self) -> impl Iterator<Item = (&RouteId, &StepNode)> {
        self.elements
            .iter()
            .filter_map(|element| element.route_id().map(|route_id| (route_id, element)))
    }

    pub fn find(&self, uuid: &StepId) -> Option<&StepNode> {
        find_in(&self.elements, uuid)
    }

    /// Checks the structural invariants the routing engine relies on.
    pub fn validate(&self) -> Result<(), IntegrationError> {
        let mut seen = BTreeSet::<StepId>::new();
        let mut error = None;

        let mut visitor = |step: &StepNode, _siblings: &[StepNode], ctx: &VisitContext<'_>| {
            if error.is_some() {
                return;
            }
            if !seen.insert(step.uuid().clone()) {
                error = Some(IntegrationError::DuplicateStep(step.uuid().clone()));
                return;
            }
            let top_level = matches!(step.kind(), StepKind::Route | StepKind::RouteConfiguration);
            if top_level != ctx.parent.is_none() {
                error = Some(IntegrationError::Misplaced {
                    uuid: step.uuid().clone(),
                    kind: step.kind(),
                });
            }
        };
        walk(&self.elements, &mut visitor);

        match error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn find_in<'a>(nodes: &'a [StepNode], uuid: &StepId) -> Option<&'a StepNode> {
    for node in nodes {
        if node.uuid() == uuid {
            return Some(node);
        }
        for (_slot, children) in node.children() {
            if let Some(found) = find_in(children, uuid) {
                return Some(found);
            }
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrationError {
    DuplicateStep(StepId),
    /// Routes and route configurations must be top-level, everything else nested.
    Misplaced { uuid: StepId, kind: StepKind },
}

impl fmt::Display for IntegrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateStep(uuid) => write!(f, "step uuid {uuid} is used more than once"),
            Self::Misplaced { uuid, kind } => {
                write!(f, "step {uuid} of kind {kind} is placed at the wrong nesting level")
            }
        }
    }
}

impl std::error::Error for IntegrationError {}
