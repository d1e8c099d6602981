// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tunables for classification, overlap resolution and connector geometry.

use std::fmt;

use serde::Deserialize;
use smol_str::SmolStr;

pub const DEFAULT_MIN_CLEARANCE: f64 = 40.0;
pub const DEFAULT_CURVE_RADIUS: f64 = 20.0;
pub const DEFAULT_DOCK_OFFSET: f64 = 30.0;
pub const DEFAULT_INTERNAL_BOW: f64 = 30.0;
pub const DEFAULT_MAX_OVERLAP_PASSES: usize = 1024;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoutingOptions {
    /// Minimum vertical distance between two dock markers in the same lane.
    pub min_clearance: f64,
    /// Upper bound for the radius of connector turns.
    pub curve_radius: f64,
    /// Horizontal distance of dock markers from the diagram edge.
    pub dock_offset: f64,
    /// How far in-diagram call connectors bow out to the right of their nodes.
    pub internal_bow: f64,
    /// Guard for the overlap resolver's fixed-point loop.
    pub max_overlap_passes: usize,
    /// Component schemes other routes can call into (`direct`, `seda`, ...).
    pub navigable_schemes: Vec<SmolStr>,
    /// Entry URIs that only exist to host a reusable fragment; never drawn.
    pub placeholder_entries: Vec<SmolStr>,
}

impl Default for RoutingOptions {
    fn default() -> Self {
        Self {
            min_clearance: DEFAULT_MIN_CLEARANCE,
            curve_radius: DEFAULT_CURVE_RADIUS,
            dock_offset: DEFAULT_DOCK_OFFSET,
            internal_bow: DEFAULT_INTERNAL_BOW,
            max_overlap_passes: DEFAULT_MAX_OVERLAP_PASSES,
            navigable_schemes: vec![
                SmolStr::new_static("direct"),
                SmolStr::new_static("seda"),
                SmolStr::new_static("vertx"),
            ],
            placeholder_entries: vec![SmolStr::new_static("kamelet:source")],
        }
    }
}

impl RoutingOptions {
    pub fn from_json_str(input: &str) -> Result<Self, RoutingOptionsError> {
        let options: Self =
            serde_json::from_str(input).map_err(|err| RoutingOptionsError::Parse(err.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), RoutingOptionsError> {
        let finite_positive = |value: f64| value.is_finite() && value > 0.0;
        let finite_non_negative = |value: f64| value.is_finite() && value >= 0.0;

        if !finite_positive(self.min_clearance) {
            return Err(RoutingOptionsError::InvalidValue {
                field: "min_clearance",
                value: self.min_clearance,
            });
        }
        if !finite_non_negative(self.curve_radius) {
            return Err(RoutingOptionsError::InvalidValue {
                field: "curve_radius",
                value: self.curve_radius,
            });
        }
        if !finite_non_negative(self.dock_offset) {
            return Err(RoutingOptionsError::InvalidValue {
                field: "dock_offset",
                value: self.dock_offset,
            });
        }
        if !finite_non_negative(self.internal_bow) {
            return Err(RoutingOptionsError::InvalidValue {
                field: "internal_bow",
                value: self.internal_bow,
            });
        }
        if self.max_overlap_passes == 0 {
            return Err(RoutingOptionsError::ZeroOverlapPasses);
        }
        Ok(())
    }

    pub fn is_navigable_scheme(&self, scheme: &str) -> bool {
        self.navigable_schemes.iter().any(|candidate| candidate.eq_ignore_ascii_case(scheme))
    }

    pub fn is_placeholder_entry(&self, base_uri: &str) -> bool {
        self.placeholder_entries.iter().any(|candidate| candidate == base_uri)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoutingOptionsError {
    Parse(String),
    InvalidValue { field: &'static str, value: f64 },
    ZeroOverlapPasses,
}

impl fmt::Display for RoutingOptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "invalid routing options: {message}"),
            Self::InvalidValue { field, value } => {
                write!(f, "routing option {field} has invalid value {value}")
            }
            Self::ZeroOverlapPasses => {
                f.write_str("routing option max_overlap_passes must be at least 1")
            }
        }
    }
}

impl std::error::Error for RoutingOptionsError {}
