// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::document::Integration;
use super::geometry::Rect;
use super::ids::{FileName, RouteId, StepId};
use super::index::StepIndex;
use super::step::{walk, StepNode, VisitContext};
use crate::registry::{Adjacency, PositionRecord, PositionSnapshot};

pub(crate) fn sid(value: &str) -> StepId {
    StepId::new(value).expect("step id")
}

pub(crate) fn rid(value: &str) -> RouteId {
    RouteId::new(value).expect("route id")
}

pub(crate) fn fid(value: &str) -> FileName {
    FileName::new(value).expect("file name")
}

fn route(uuid: &str, route_id: &str, from_uuid: &str, uri: &str, steps: Vec<StepNode>) -> StepNode {
    StepNode::route(sid(uuid), rid(route_id), StepNode::route_start(sid(from_uuid), uri, steps))
}

/// `timer -> log-in -> choice(w1[a, b], w2[a]) -> done`
pub(crate) fn choice_route() -> Integration {
    let choice = StepNode::choice(
        sid("choice"),
        vec![
            StepNode::when(
                sid("w1"),
                "${header.kind} == 'a'",
                vec![StepNode::to(sid("w1-a"), "log:a"), StepNode::to(sid("w1-b"), "log:b")],
            ),
            StepNode::when(sid("w2"), "${header.kind} == 'b'", vec![StepNode::to(sid("w2-a"), "log:c")]),
        ],
        None,
    );

    Integration::new_with(
        fid("choose.yaml"),
        vec![route(
            "r-choose",
            "choose",
            "from",
            "timer:tick",
            vec![
                StepNode::processor(sid("log-in"), "log", vec![]),
                choice,
                StepNode::to(sid("done"), "log:done"),
            ],
        )],
    )
}

/// `direct:guarded -> try(t-a, t-b; catch c1[c1-a]; finally f1[f1-a]) -> after`
pub(crate) fn try_route() -> Integration {
    let guarded = StepNode::try_catch(
        sid("try"),
        vec![StepNode::to(sid("t-a"), "log:a"), StepNode::to(sid("t-b"), "log:b")],
        vec![StepNode::catch(
            sid("c1"),
            vec!["java.io.IOException".to_owned()],
            vec![StepNode::to(sid("c1-a"), "log:failed")],
        )],
        Some(StepNode::finally(sid("f1"), vec![StepNode::to(sid("f1-a"), "log:cleanup")])),
    );

    Integration::new_with(
        fid("guarded.yaml"),
        vec![route(
            "r-guarded",
            "guarded",
            "from",
            "direct:guarded",
            vec![guarded, StepNode::to(sid("after"), "log:after")],
        )],
    )
}

/// `direct:fanout -> multicast(m-a, filter[m-b-1]) -> m-next`, `balance` alongside.
pub(crate) fn multicast_route() -> Integration {
    let fanout = StepNode::multicast(
        sid("multicast"),
        vec![
            StepNode::to(sid("m-a"), "log:a"),
            StepNode::processor(sid("m-b"), "filter", vec![StepNode::to(sid("m-b-1"), "log:b")]),
        ],
    );

    Integration::new_with(
        fid("fanout.yaml"),
        vec![route(
            "r-fanout",
            "fanout",
            "from",
            "direct:fanout",
            vec![fanout, StepNode::to(sid("m-next"), "log:next")],
        )],
    )
}

/// Orders file: calls into other files, a same-file helper, a kamelet and remote systems.
pub(crate) fn orders_file() -> Integration {
    Integration::new_with(
        fid("orders.yaml"),
        vec![
            route(
                "r-orders",
                "orders",
                "orders-from",
                "direct:orders",
                vec![
                    StepNode::to(sid("call-audit"), "direct:audit"),
                    StepNode::to_dynamic(sid("call-dynamic"), "direct:${header.target}"),
                    StepNode::poll(sid("poll-inbox"), "file:inbox"),
                    StepNode::to(sid("call-kafka"), "kafka:payments"),
                    StepNode::kamelet(sid("call-slack"), "slack-sink"),
                    StepNode::to(sid("call-helper"), "direct:helper"),
                    StepNode::to(sid("call-log"), "log:done"),
                    StepNode::to(sid("call-unknown"), "acme-bus:queue"),
                ],
            ),
            route("r-helper", "helper", "helper-from", "direct:helper", vec![]),
        ],
    )
}

pub(crate) fn audit_file() -> Integration {
    Integration::new_with(
        fid("audit.yaml"),
        vec![route(
            "r-audit",
            "audit",
            "audit-from",
            "direct:audit",
            vec![StepNode::to(sid("audit-log"), "log:audit")],
        )],
    )
}

pub(crate) fn billing_file() -> Integration {
    Integration::new_with(
        fid("billing.yaml"),
        vec![route(
            "r-billing",
            "billing",
            "billing-from",
            "timer:bill",
            vec![StepNode::to(sid("billing-call-orders"), "direct:orders")],
        )],
    )
}

pub(crate) fn slack_kamelet_file() -> Integration {
    let mut doc = Integration::new_with(
        fid("slack-sink.kamelet.yaml"),
        vec![route(
            "r-slack",
            "slack-sink-template",
            "slack-from",
            "kamelet:source",
            vec![StepNode::to(sid("slack-post"), "https://hooks.slack.com/services")],
        )],
    );
    doc.set_kamelet(Some("slack-sink"));
    doc
}

pub(crate) const ROW: f64 = 60.0;
pub(crate) const INDENT: f64 = 30.0;
pub(crate) const HEADER_WIDTH: f64 = 160.0;
pub(crate) const HEADER_HEIGHT: f64 = 34.0;

/// Stacks every step of `doc` top to bottom in pre-order, indenting by depth.
///
/// Body rectangles cover the header plus every descendant header.
pub(crate) fn stacked_records(doc: &Integration) -> Vec<PositionRecord> {
    let index = StepIndex::build(doc);

    let mut headers = BTreeMap::<StepId, Rect>::new();
    let mut order = Vec::<StepId>::new();
    let mut visitor = |step: &StepNode, _siblings: &[StepNode], ctx: &VisitContext<'_>| {
        let row = order.len() as f64;
        let rect = Rect::new(ctx.depth as f64 * INDENT, row * ROW, HEADER_WIDTH, HEADER_HEIGHT);
        headers.insert(step.uuid().clone(), rect);
        order.push(step.uuid().clone());
    };
    walk(doc.elements(), &mut visitor);

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

    order
        .into_iter()
        .map(|uuid| {
            let entry = index.get(&uuid).expect("indexed step");
            PositionRecord::new(
                uuid.clone(),
                entry.kind,
                headers[&uuid],
                bodies[&uuid],
                Adjacency::from_entry(entry),
            )
        })
        .collect()
}

pub(crate) fn stacked_snapshot(doc: &Integration) -> PositionSnapshot {
    PositionSnapshot::from_records(stacked_records(doc))
}
