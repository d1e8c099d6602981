// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Connector geometry for edges, dock links and in-diagram calls.
//!
//! Paths are sequences of straight runs joined by quadratic turns. Coordinates are screen
//! coordinates (`y` grows downwards).

use std::fmt::Write as _;

use serde::Serialize;

use crate::config::RoutingOptions;
use crate::layout::{Edge, EdgeAnchor};
use crate::model::{Point, Rect};
use crate::query::{ClassifiedLink, LinkCategory, LinkRole};
use crate::registry::{PositionRecord, PositionSnapshot};

const EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PathSegment {
    MoveTo { to: Point },
    LineTo { to: Point },
    QuadTo { control: Point, to: Point },
}

impl PathSegment {
    pub fn end(&self) -> Point {
        match self {
            Self::MoveTo { to } | Self::LineTo { to } | Self::QuadTo { to, .. } => *to,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowPlacement {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorPath {
    pub key: String,
    pub segments: Vec<PathSegment>,
    pub arrow: ArrowPlacement,
    /// Set for dock links and in-diagram calls.
    pub category: Option<LinkCategory>,
    /// Dock marker position for links that leave the diagram.
    pub dock: Option<Point>,
}

impl ConnectorPath {
    fn new(key: String, segments: Vec<PathSegment>) -> Self {
        Self { key, segments, arrow: ArrowPlacement::End, category: None, dock: None }
    }

    pub fn start(&self) -> Option<Point> {
        self.segments.first().map(PathSegment::end)
    }

    pub fn end(&self) -> Option<Point> {
        self.segments.last().map(PathSegment::end)
    }

    /// SVG path data using absolute `M`, `L` and `Q` commands.
    pub fn to_svg_path(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            if !out.is_empty() {
                out.push(' ');
            }
            // Writing to a String cannot fail.
            let _ = match segment {
                PathSegment::MoveTo { to } => write!(out, "M {} {}", to.x, to.y),
                PathSegment::LineTo { to } => write!(out, "L {} {}", to.x, to.y),
                PathSegment::QuadTo { control, to } => {
                    write!(out, "Q {} {} {} {}", control.x, control.y, to.x, to.y)
                }
            };
        }
        out
    }
}

/// Horizontal extent of the rendered diagram; docks sit just outside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiagramFrame {
    pub left: f64,
    pub right: f64,
}

impl DiagramFrame {
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }

    pub fn from_snapshot(snapshot: &PositionSnapshot) -> Option<Self> {
        snapshot.bounds().map(|bounds| Self::new(bounds.left(), bounds.right()))
    }
}

fn anchor_rect(record: &PositionRecord, anchor: EdgeAnchor) -> Rect {
    match anchor {
        EdgeAnchor::Header => record.header_rect,
        EdgeAnchor::Body => record.body_rect,
    }
}

/// Path from the bottom of `edge.from` to the top of `edge.to`.
///
/// When the target starts below the source the path runs down, across and down again through
/// two turns of radius `min(curve_radius, gap / 2, horizontal offset / 2)`. Otherwise it leaves
/// from the side of the source facing the target and turns once into the target's top, with
/// the same radius bound.
pub fn edge_path(
    edge: &Edge,
    snapshot: &PositionSnapshot,
    options: &RoutingOptions,
) -> Option<ConnectorPath> {
    let Some((from, to)) = snapshot.get(&edge.from).zip(snapshot.get(&edge.to)) else {
        tracing::debug!(edge = %edge, "no geometry for edge path");
        return None;
    };
    let source = anchor_rect(from, edge.from_anchor);
    let target = anchor_rect(to, edge.to_anchor).top_center();

    let below = source.bottom_center();
    let segments = if target.y > below.y + EPSILON {
        elbow_vertical(below, target, options.curve_radius)
    } else {
        let side = if target.x >= source.center_x() {
            source.right_center()
        } else {
            source.left_center()
        };
        single_turn(side, target, options.curve_radius)
    };

    Some(ConnectorPath::new(edge.key(), segments))
}

/// Path between a dock marker at the diagram edge and the linked node's header.
///
/// Incoming links run from a dock left of the frame into the header's left side; outgoing links
/// run from the header's right side to a dock right of the frame. Polls point back at the node.
pub fn link_path(
    link: &ClassifiedLink,
    snapshot: &PositionSnapshot,
    frame: &DiagramFrame,
    options: &RoutingOptions,
) -> Option<ConnectorPath> {
    let Some(record) = snapshot.get(&link.uuid) else {
        tracing::debug!(step = %link.uuid, "no geometry for link path");
        return None;
    };
    let header = record.header_rect;

    let (start, end, dock) = match link.role {
        LinkRole::Incoming => {
            let dock = Point::new(frame.left - options.dock_offset, link.vertical_anchor);
            (dock, header.left_center(), dock)
        }
        LinkRole::Outgoing => {
            let dock = Point::new(frame.right + options.dock_offset, link.vertical_anchor);
            (header.right_center(), dock, dock)
        }
    };

    let mut path = ConnectorPath::new(
        format!("link:{}", link.uuid),
        elbow_horizontal(start, end, options.curve_radius),
    );
    path.arrow = match link.category {
        LinkCategory::Poll => ArrowPlacement::Start,
        _ => ArrowPlacement::End,
    };
    path.category = Some(link.category);
    path.dock = Some(dock);
    Some(path)
}

/// In-diagram connector from a call site to a route entry rendered in the same diagram.
///
/// Leaves the call header on the right, bows out `internal_bow` past the wider of the two
/// headers and comes back into the entry header's right side.
pub fn internal_path(
    link: &ClassifiedLink,
    snapshot: &PositionSnapshot,
    options: &RoutingOptions,
) -> Option<ConnectorPath> {
    let target = link.local_target.as_ref()?;
    let (Some(from), Some(to)) = (snapshot.get(&link.uuid), snapshot.get(target)) else {
        tracing::debug!(step = %link.uuid, %target, "no geometry for in-diagram call");
        return None;
    };

    let start = from.header_rect.right_center();
    let end = to.header_rect.right_center();
    let bow_x = start.x.max(end.x) + options.internal_bow;
    let dy = end.y - start.y;
    let sy = direction(dy);
    let radius = options
        .curve_radius
        .min(dy.abs() / 2.0)
        .min(bow_x - start.x)
        .min(bow_x - end.x)
        .max(0.0);

    let segments = if dy.abs() < EPSILON {
        vec![move_to(start), line_to(end)]
    } else {
        vec![
            move_to(start),
            line_to(Point::new(bow_x - radius, start.y)),
            quad_to(Point::new(bow_x, start.y), Point::new(bow_x, start.y + sy * radius)),
            line_to(Point::new(bow_x, end.y - sy * radius)),
            quad_to(Point::new(bow_x, end.y), Point::new(bow_x - radius, end.y)),
            line_to(end),
        ]
    };

    let mut path = ConnectorPath::new(format!("call:{}->{}", link.uuid, target), segments);
    path.category = Some(link.category);
    Some(path)
}

fn move_to(to: Point) -> PathSegment {
    PathSegment::MoveTo { to }
}

fn line_to(to: Point) -> PathSegment {
    PathSegment::LineTo { to }
}

fn quad_to(control: Point, to: Point) -> PathSegment {
    PathSegment::QuadTo { control, to }
}

fn direction(delta: f64) -> f64 {
    if delta < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Down, across at the vertical midpoint, down again.
fn elbow_vertical(start: Point, end: Point, max_radius: f64) -> Vec<PathSegment> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    if dx.abs() < EPSILON || dy.abs() < EPSILON {
        return vec![move_to(start), line_to(end)];
    }

    let (sx, sy) = (direction(dx), direction(dy));
    let radius = max_radius.min(dy.abs() / 2.0).min(dx.abs() / 2.0).max(0.0);
    let mid = start.y + dy / 2.0;
    vec![
        move_to(start),
        line_to(Point::new(start.x, mid - sy * radius)),
        quad_to(Point::new(start.x, mid), Point::new(start.x + sx * radius, mid)),
        line_to(Point::new(end.x - sx * radius, mid)),
        quad_to(Point::new(end.x, mid), Point::new(end.x, mid + sy * radius)),
        line_to(end),
    ]
}

/// Across, down at the horizontal midpoint, across again.
fn elbow_horizontal(start: Point, end: Point, max_radius: f64) -> Vec<PathSegment> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    if dx.abs() < EPSILON || dy.abs() < EPSILON {
        return vec![move_to(start), line_to(end)];
    }

    let (sx, sy) = (direction(dx), direction(dy));
    let radius = max_radius.min(dy.abs() / 2.0).min(dx.abs() / 2.0).max(0.0);
    let mid = start.x + dx / 2.0;
    vec![
        move_to(start),
        line_to(Point::new(mid - sx * radius, start.y)),
        quad_to(Point::new(mid, start.y), Point::new(mid, start.y + sy * radius)),
        line_to(Point::new(mid, end.y - sy * radius)),
        quad_to(Point::new(mid, end.y), Point::new(mid + sx * radius, end.y)),
        line_to(end),
    ]
}

/// Across to the target column, then one turn into it.
fn single_turn(start: Point, end: Point, max_radius: f64) -> Vec<PathSegment> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    if dx.abs() < EPSILON || dy.abs() < EPSILON {
        return vec![move_to(start), line_to(end)];
    }

    let (sx, sy) = (direction(dx), direction(dy));
    let radius = max_radius.min(dy.abs() / 2.0).min(dx.abs() / 2.0).max(0.0);
    vec![
        move_to(start),
        line_to(Point::new(end.x - sx * radius, start.y)),
        quad_to(Point::new(end.x, start.y), Point::new(end.x, start.y + sy * radius)),
        line_to(end),
    ]
}
