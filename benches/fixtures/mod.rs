// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use std::collections::BTreeMap;

use flowlines::model::{
    walk, FileName, Integration, Rect, RouteId, StepId, StepIndex, StepNode, VisitContext,
};
use flowlines::registry::{Adjacency, PositionRecord, PositionSnapshot};

const ROW: f64 = 60.0;
const INDENT: f64 = 30.0;
const HEADER_WIDTH: f64 = 180.0;
const HEADER_HEIGHT: f64 = 40.0;

fn step_id(value: String) -> StepId {
    StepId::new(value).expect("valid step id")
}

fn route_id(value: String) -> RouteId {
    RouteId::new(value).expect("valid route id")
}

fn file_name(value: String) -> FileName {
    FileName::new(value).expect("valid file name")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteParams {
    pub routes: usize,
    pub steps_per_route: usize,
    /// Every n-th step is a choice with `branches` when clauses.
    pub choice_every: usize,
    pub branches: usize,
    /// Every n-th step is a call to another route's `direct` entry.
    pub call_every: usize,
}

impl RouteParams {
    pub const fn new(
        routes: usize,
        steps_per_route: usize,
        choice_every: usize,
        branches: usize,
        call_every: usize,
    ) -> Self {
        Self { routes, steps_per_route, choice_every, branches, call_every }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    MediumBranchy,
    LargeCallHeavy,
}

impl Case {
    pub const fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::MediumBranchy => "medium_branchy",
            Self::LargeCallHeavy => "large_call_heavy",
        }
    }

    pub const fn params(self) -> RouteParams {
        match self {
            Self::Small => RouteParams::new(2, 12, 4, 2, 5),
            Self::MediumBranchy => RouteParams::new(6, 40, 3, 4, 7),
            Self::LargeCallHeavy => RouteParams::new(20, 80, 6, 3, 2),
        }
    }
}

fn step(route: usize, idx: usize, params: RouteParams) -> StepNode {
    let uuid = |suffix: &str| step_id(format!("r{route:03}-s{idx:04}{suffix}"));

    if params.choice_every > 0 && idx % params.choice_every == params.choice_every - 1 {
        let when = (0..params.branches)
            .map(|branch| {
                StepNode::when(
                    uuid(&format!("-w{branch}")),
                    format!("${{header.branch}} == {branch}"),
                    vec![
                        StepNode::to(uuid(&format!("-w{branch}-a")), "log:branch"),
                        StepNode::to(uuid(&format!("-w{branch}-b")), "kafka:audit"),
                    ],
                )
            })
            .collect();
        let otherwise =
            StepNode::otherwise(uuid("-o"), vec![StepNode::to(uuid("-o-a"), "log:fallback")]);
        return StepNode::choice(uuid(""), when, Some(otherwise));
    }

    if params.call_every > 0 && idx % params.call_every == 0 {
        let target = (route + 1 + idx) % params.routes.max(1);
        return StepNode::to(uuid(""), format!("direct:route-{target:03}"));
    }

    match idx % 3 {
        0 => StepNode::to(uuid(""), "log:step"),
        1 => StepNode::poll(uuid(""), "file:inbox"),
        _ => StepNode::to_dynamic(uuid(""), "http:${header.host}"),
    }
}

/// Deterministic integration with `params.routes` routes in one file.
pub fn integration(file: &str, params: RouteParams) -> Integration {
    let elements = (0..params.routes)
        .map(|route| {
            let steps = (0..params.steps_per_route).map(|idx| step(route, idx, params)).collect();
            StepNode::route(
                step_id(format!("r{route:03}")),
                route_id(format!("route-{route:03}")),
                StepNode::route_start(
                    step_id(format!("r{route:03}-from")),
                    format!("direct:route-{route:03}"),
                    steps,
                ),
            )
        })
        .collect();
    Integration::new_with(file_name(file.to_owned()), elements)
}

pub fn fixture(case: Case) -> Integration {
    integration(&format!("{}.yaml", case.id()), case.params())
}

/// The fixture plus `callers` files whose routes call into it.
pub fn workspace(case: Case, callers: usize) -> Vec<Integration> {
    let params = case.params();
    let mut files = vec![fixture(case)];
    for caller in 0..callers {
        let caller_params = RouteParams { call_every: 1, choice_every: 0, ..params };
        files.push(integration(&format!("caller-{caller:02}.yaml"), caller_params));
    }
    files
}

/// Stacks every step top to bottom in pre-order, indenting by depth.
pub fn stacked_snapshot(integration: &Integration) -> PositionSnapshot {
    let index = StepIndex::build(integration);

    let mut headers = BTreeMap::<StepId, Rect>::new();
    let mut order = Vec::<StepId>::new();
    let mut visitor = |step: &StepNode, _siblings: &[StepNode], ctx: &VisitContext<'_>| {
        let rect = Rect::new(
            ctx.depth as f64 * INDENT,
            order.len() as f64 * ROW,
            HEADER_WIDTH,
            HEADER_HEIGHT,
        );
        headers.insert(step.uuid().clone(), rect);
        order.push(step.uuid().clone());
    };
    walk(integration.elements(), &mut visitor);

    let mut bodies = headers.clone();
    for uuid in &order {
        let header = headers[uuid];
        let mut cursor = index.get(uuid).and_then(|entry| entry.parent.clone());
        while let Some(parent) = cursor {
            if let Some(body) = bodies.get_mut(&parent.uuid) {
                *body = body.union(&header);
            }
            cursor = index.get(&parent.uuid).and_then(|entry| entry.parent.clone());
        }
    }

    PositionSnapshot::from_records(order.into_iter().map(|uuid| {
        let entry = index.get(&uuid).expect("indexed step");
        PositionRecord::new(
            uuid.clone(),
            entry.kind,
            headers[&uuid],
            bodies[&uuid],
            Adjacency::from_entry(entry),
        )
    }))
}

/// Cheap order-sensitive checksum so results cannot be optimized away.
pub fn checksum_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> u64 {
    keys.into_iter().fold(0u64, |acc, key| {
        key.bytes().fold(acc.rotate_left(5), |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)))
    })
}
