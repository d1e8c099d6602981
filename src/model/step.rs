// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Typed step tree.
//!
//! Every construct declares its child slots statically; traversal goes through
//! [`StepVisitor`] and [`walk`] instead of inspecting fields by name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use smol_str::SmolStr;

use super::ids::{RouteId, StepId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    Route,
    RouteStart,
    RouteConfiguration,
    Choice,
    When,
    Otherwise,
    Multicast,
    LoadBalance,
    Try,
    Catch,
    Finally,
    PlainTo,
    DynamicTo,
    Poll,
    KameletCall,
    Processor,
}

impl StepKind {
    pub const ALL: [StepKind; 16] = [
        Self::Route,
        Self::RouteStart,
        Self::RouteConfiguration,
        Self::Choice,
        Self::When,
        Self::Otherwise,
        Self::Multicast,
        Self::LoadBalance,
        Self::Try,
        Self::Catch,
        Self::Finally,
        Self::PlainTo,
        Self::DynamicTo,
        Self::Poll,
        Self::KameletCall,
        Self::Processor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Route => "route",
            Self::RouteStart => "route-start",
            Self::RouteConfiguration => "route-configuration",
            Self::Choice => "choice",
            Self::When => "when",
            Self::Otherwise => "otherwise",
            Self::Multicast => "multicast",
            Self::LoadBalance => "load-balance",
            Self::Try => "try",
            Self::Catch => "catch",
            Self::Finally => "finally",
            Self::PlainTo => "plain-to",
            Self::DynamicTo => "dynamic-to",
            Self::Poll => "poll",
            Self::KameletCall => "kamelet-call",
            Self::Processor => "processor",
        }
    }

    /// Constructs that fan out into branches drawn from their own header.
    pub fn is_branching(self) -> bool {
        matches!(
            self,
            Self::Choice | Self::Multicast | Self::LoadBalance | Self::Try | Self::RouteConfiguration
        )
    }

    /// Branching constructs whose steps run side by side and never reconverge.
    pub fn is_parallel(self) -> bool {
        matches!(self, Self::Multicast | Self::LoadBalance)
    }

    /// Parents whose last step flows into whatever the enclosing construct runs next.
    pub fn reconverges(self) -> bool {
        matches!(self, Self::Try | Self::When | Self::Otherwise | Self::Catch | Self::Finally)
    }

    /// Constructs whose own branches already carry the flow to the next step.
    pub fn is_merging(self) -> bool {
        matches!(self, Self::Choice | Self::Try)
    }

    pub fn is_call_site(self) -> bool {
        matches!(self, Self::PlainTo | Self::DynamicTo | Self::Poll | Self::KameletCall)
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStepKindError(String);

impl fmt::Display for ParseStepKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown step kind {:?}", self.0)
    }
}

impl std::error::Error for ParseStepKindError {}

impl FromStr for StepKind {
    type Err = ParseStepKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseStepKindError(s.to_owned()))
    }
}

/// Named child container of a construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChildSlot {
    From,
    Steps,
    When,
    Otherwise,
    DoCatch,
    DoFinally,
    Clauses,
}

impl ChildSlot {
    pub fn is_steps(self) -> bool {
        self == Self::Steps
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepBody {
    Route { route_id: RouteId, from: Box<StepNode> },
    RouteStart { uri: String, steps: Vec<StepNode> },
    RouteConfiguration { clauses: Vec<StepNode> },
    Choice { when: Vec<StepNode>, otherwise: Option<Box<StepNode>> },
    When { expression: String, steps: Vec<StepNode> },
    Otherwise { steps: Vec<StepNode> },
    Multicast { steps: Vec<StepNode> },
    LoadBalance { steps: Vec<StepNode> },
    Try { steps: Vec<StepNode>, do_catch: Vec<StepNode>, do_finally: Option<Box<StepNode>> },
    Catch { exceptions: Vec<String>, steps: Vec<StepNode> },
    Finally { steps: Vec<StepNode> },
    To { uri: String },
    ToDynamic { uri: String },
    Poll { uri: String },
    Kamelet { name: SmolStr },
    Processor { name: SmolStr, steps: Vec<StepNode> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepNode {
    uuid: StepId,
    body: StepBody,
}

pub type ChildList<'a> = SmallVec<[(ChildSlot, &'a [StepNode]); 3]>;

impl StepNode {
    pub fn new(uuid: StepId, body: StepBody) -> Self {
        Self { uuid, body }
    }

    pub fn route(uuid: StepId, route_id: RouteId, from: StepNode) -> Self {
        Self::new(uuid, StepBody::Route { route_id, from: Box::new(from) })
    }

    pub fn route_start(uuid: StepId, uri: impl Into<String>, steps: Vec<StepNode>) -> Self {
        Self::new(uuid, StepBody::RouteStart { uri: uri.into(), steps })
    }

    pub fn route_configuration(uuid: StepId, clauses: Vec<StepNode>) -> Self {
        Self::new(uuid, StepBody::RouteConfiguration { clauses })
    }

    pub fn choice(uuid: StepId, when: Vec<StepNode>, otherwise: Option<StepNode>) -> Self {
        Self::new(uuid, StepBody::Choice { when, otherwise: otherwise.map(Box::new) })
    }

    pub fn when(uuid: StepId, expression: impl Into<String>, steps: Vec<StepNode>) -> Self {
        Self::new(uuid, StepBody::When { expression: expression.into(), steps })
    }

    pub fn otherwise(uuid: StepId, steps: Vec<StepNode>) -> Self {
        Self::new(uuid, StepBody::Otherwise { steps })
    }

    pub fn multicast(uuid: StepId, steps: Vec<StepNode>) -> Self {
        Self::new(uuid, StepBody::Multicast { steps })
    }

    pub fn load_balance(uuid: StepId, steps: Vec<StepNode>) -> Self {
        Self::new(uuid, StepBody::LoadBalance { steps })
    }

    pub fn try_catch(
        uuid: StepId,
        steps: Vec<StepNode>,
        do_catch: Vec<StepNode>,
        do_finally: Option<StepNode>,
    ) -> Self {
        Self::new(uuid, StepBody::Try { steps, do_catch, do_finally: do_finally.map(Box::new) })
    }

    pub fn catch(uuid: StepId, exceptions: Vec<String>, steps: Vec<StepNode>) -> Self {
        Self::new(uuid, StepBody::Catch { exceptions, steps })
    }

    pub fn finally(uuid: StepId, steps: Vec<StepNode>) -> Self {
        Self::new(uuid, StepBody::Finally { steps })
    }

    pub fn to(uuid: StepId, uri: impl Into<String>) -> Self {
        Self::new(uuid, StepBody::To { uri: uri.into() })
    }

    pub fn to_dynamic(uuid: StepId, uri: impl Into<String>) -> Self {
        Self::new(uuid, StepBody::ToDynamic { uri: uri.into() })
    }

    pub fn poll(uuid: StepId, uri: impl Into<String>) -> Self {
        Self::new(uuid, StepBody::Poll { uri: uri.into() })
    }

    pub fn kamelet(uuid: StepId, name: impl Into<SmolStr>) -> Self {
        Self::new(uuid, StepBody::Kamelet { name: name.into() })
    }

    pub fn processor(uuid: StepId, name: impl Into<SmolStr>, steps: Vec<StepNode>) -> Self {
        Self::new(uuid, StepBody::Processor { name: name.into(), steps })
    }

    pub fn uuid(&self) -> &StepId {
        &self.uuid
    }

    pub fn body(&self) -> &StepBody {
        &self.body
    }

    pub fn kind(&self) -> StepKind {
        match &self.body {
            StepBody::Route { .. } => StepKind::Route,
            StepBody::RouteStart { .. } => StepKind::RouteStart,
            StepBody::RouteConfiguration { .. } => StepKind::RouteConfiguration,
            StepBody::Choice { .. } => StepKind::Choice,
            StepBody::When { .. } => StepKind::When,
            StepBody::Otherwise { .. } => StepKind::Otherwise,
            StepBody::Multicast { .. } => StepKind::Multicast,
            StepBody::LoadBalance { .. } => StepKind::LoadBalance,
            StepBody::Try { .. } => StepKind::Try,
            StepBody::Catch { .. } => StepKind::Catch,
            StepBody::Finally { .. } => StepKind::Finally,
            StepBody::To { .. } => StepKind::PlainTo,
            StepBody::ToDynamic { .. } => StepKind::DynamicTo,
            StepBody::Poll { .. } => StepKind::Poll,
            StepBody::Kamelet { .. } => StepKind::KameletCall,
            StepBody::Processor { .. } => StepKind::Processor,
        }
    }

    /// Endpoint URI of entries and call sites.
    pub fn uri(&self) -> Option<&str> {
        match &self.body {
            StepBody::RouteStart { uri, .. }
            | StepBody::To { uri }
            | StepBody::ToDynamic { uri }
            | StepBody::Poll { uri } => Some(uri),
            _ => None,
        }
    }

    pub fn kamelet_name(&self) -> Option<&str> {
        match &self.body {
            StepBody::Kamelet { name } => Some(name),
            _ => None,
        }
    }

    pub fn route_id(&self) -> Option<&RouteId> {
        match &self.body {
            StepBody::Route { route_id, .. } => Some(route_id),
            _ => None,
        }
    }

    /// All child containers in render order. Empty containers are included.
    pub fn children(&self) -> ChildList<'_> {
        let mut out = ChildList::new();
        match &self.body {
            StepBody::Route { from, .. } => {
                out.push((ChildSlot::From, std::slice::from_ref(from.as_ref())));
            }
            StepBody::RouteConfiguration { clauses } => {
                out.push((ChildSlot::Clauses, clauses.as_slice()));
            }
            StepBody::Choice { when, otherwise } => {
                out.push((ChildSlot::When, when.as_slice()));
                if let Some(otherwise) = otherwise {
                    out.push((ChildSlot::Otherwise, std::slice::from_ref(otherwise.as_ref())));
                }
            }
            StepBody::Try { steps, do_catch, do_finally } => {
                out.push((ChildSlot::Steps, steps.as_slice()));
                out.push((ChildSlot::DoCatch, do_catch.as_slice()));
                if let Some(do_finally) = do_finally {
                    out.push((ChildSlot::DoFinally, std::slice::from_ref(do_finally.as_ref())));
                }
            }
            StepBody::RouteStart { steps, .. }
            | StepBody::When { steps, .. }
            | StepBody::Otherwise { steps }
            | StepBody::Multicast { steps }
            | StepBody::LoadBalance { steps }
            | StepBody::Catch { steps, .. }
            | StepBody::Finally { steps }
            | StepBody::Processor { steps, .. } => {
                out.push((ChildSlot::Steps, steps.as_slice()));
            }
            StepBody::To { .. }
            | StepBody::ToDynamic { .. }
            | StepBody::Poll { .. }
            | StepBody::Kamelet { .. } => {}
        }
        out
    }

    /// The `steps` sequence, if this construct has one.
    pub fn steps(&self) -> &[StepNode] {
        self.children()
            .into_iter()
            .find_map(|(slot, nodes)| slot.is_steps().then_some(nodes))
            .unwrap_or(&[])
    }
}

/// Where a visited step sits in the tree.
#[derive(Debug, Clone, Copy)]
pub struct VisitContext<'a> {
    pub parent: Option<&'a StepNode>,
    pub route: Option<&'a RouteId>,
    /// `None` for top-level elements.
    pub slot: Option<ChildSlot>,
    pub position_index: usize,
    pub sibling_count: usize,
    pub depth: usize,
}

pub trait StepVisitor {
    /// Called once per step, parents before children.
    fn visit(&mut self, step: &StepNode, siblings: &[StepNode], ctx: &VisitContext<'_>);
}

impl<F> StepVisitor for F
where
    F: FnMut(&StepNode, &[StepNode], &VisitContext<'_>),
{
    fn visit(&mut self, step: &StepNode, siblings: &[StepNode], ctx: &VisitContext<'_>) {
        self(step, siblings, ctx)
    }
}

/// Depth-first, pre-order traversal over `roots` and all nested child slots.
pub fn walk<V: StepVisitor + ?Sized>(roots: &[StepNode], visitor: &mut V) {
    for (idx, root) in roots.iter().enumerate() {
        let ctx = VisitContext {
            parent: None,
            route: root.route_id(),
            slot: None,
            position_index: idx,
            sibling_count: roots.len(),
            depth: 0,
        };
        walk_step(root, roots, &ctx, visitor);
    }
}

fn walk_step<'a, V: StepVisitor + ?Sized>(
    step: &'a StepNode,
    siblings: &'a [StepNode],
    ctx: &VisitContext<'a>,
    visitor: &mut V,
) {
    visitor.visit(step, siblings, ctx);

    let route = step.route_id().or(ctx.route);
    for (slot, children) in step.children() {
        for (idx, child) in children.iter().enumerate() {
            let child_ctx = VisitContext {
                parent: Some(step),
                route,
                slot: Some(slot),
                position_index: idx,
                sibling_count: children.len(),
                depth: ctx.depth + 1,
            };
            walk_step(child, children, &child_ctx, visitor);
        }
    }
}
