// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::{apply_ops, PositionOp};
use crate::model::fixtures::{choice_route, sid, stacked_records};
use crate::registry::PositionRegistry;

#[test]
fn apply_ops_counts_only_effective_messages() {
    let registry = PositionRegistry::new();
    let records = stacked_records(&choice_route());
    let count = records.len();

    let result = apply_ops(&registry, records.iter().cloned().map(PositionOp::Report));
    assert_eq!(result.changed, count);
    assert_eq!(result.version, registry.version());

    let repeat = apply_ops(&registry, records.into_iter().map(PositionOp::Report));
    assert!(repeat.is_noop());
    assert_eq!(repeat.version, result.version);
}

#[test]
fn apply_ops_runs_in_order() {
    let registry = PositionRegistry::new();
    let records = stacked_records(&choice_route());
    let first = records[0].clone();

    let result = apply_ops(
        &registry,
        [
            PositionOp::Report(first.clone()),
            PositionOp::Clear,
            PositionOp::Report(records[1].clone()),
            PositionOp::Remove { uuid: sid("never-reported") },
        ],
    );

    assert_eq!(result.changed, 3);
    assert!(registry.get(&first.uuid).is_none());
    assert!(registry.get(&records[1].uuid).is_some());
}

#[test]
fn ops_deserialize_from_tagged_json() {
    let json = r#"[
        {"op": "remove", "uuid": "w1-a"},
        {"op": "clear"}
    ]"#;
    let ops: Vec<PositionOp> = serde_json::from_str(json).expect("ops");
    assert_eq!(ops, vec![PositionOp::Remove { uuid: sid("w1-a") }, PositionOp::Clear]);

    let record = stacked_records(&choice_route()).remove(2);
    let encoded = serde_json::to_string(&PositionOp::Report(record.clone())).expect("encode");
    assert!(encoded.starts_with(r#"{"op":"report""#));
    let decoded: PositionOp = serde_json::from_str(&encoded).expect("decode");
    assert_eq!(decoded, PositionOp::Report(record));
}
