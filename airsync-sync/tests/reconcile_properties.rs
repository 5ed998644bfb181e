// Property-based tests for the reconciler.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::{BTreeMap, BTreeSet};

use airsync_core::{Identifier, Operation, Record, RecordSet, Target};
use airsync_sync::{reconcile, ReconciliationSummary};
use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Small key space so the two sides overlap often.
fn arb_email() -> impl Strategy<Value = String> {
    r"[a-e]{1,2}@x\.io"
}

/// A narrow window of whole seconds so equal timestamps are common.
fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..5).prop_map(|offset| Utc.timestamp_opt(1_704_067_200 + offset, 0).unwrap())
}

fn arb_set() -> impl Strategy<Value = RecordSet> {
    prop::collection::btree_map(arb_email(), arb_instant(), 0..8).prop_map(to_set)
}

fn to_set(entries: BTreeMap<String, DateTime<Utc>>) -> RecordSet {
    RecordSet::try_from_records(
        entries
            .into_iter()
            .map(|(email, at)| Record::new(Identifier::parse(&email).unwrap(), at)),
    )
    .unwrap()
}

fn flip(target: Option<Target>) -> Option<Target> {
    target.map(|t| match t {
        Target::Airtable => Target::Csv,
        Target::Csv => Target::Airtable,
    })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    /// Every identifier in the union appears exactly once, in ascending order.
    #[test]
    fn output_is_sorted_union(csv in arb_set(), remote in arb_set()) {
        let rows = reconcile(&csv, &remote);

        let expected: Vec<String> = csv
            .identifiers()
            .chain(remote.identifiers())
            .map(|id| id.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let actual: Vec<String> = rows.iter().map(|r| r.identifier.to_string()).collect();
        prop_assert_eq!(actual, expected);
    }

    /// Swapping the sides keeps operations and flips targets.
    #[test]
    fn swapping_sides_mirrors_targets(csv in arb_set(), remote in arb_set()) {
        let forward = reconcile(&csv, &remote);
        let backward = reconcile(&remote, &csv);
        prop_assert_eq!(forward.len(), backward.len());
        for (f, b) in forward.iter().zip(&backward) {
            prop_assert_eq!(&f.identifier, &b.identifier);
            prop_assert_eq!(f.operation, b.operation);
            prop_assert_eq!(f.target, flip(b.target));
        }
    }

    /// A set reconciled against itself needs nothing.
    #[test]
    fn self_reconciliation_is_all_none(set in arb_set()) {
        let rows = reconcile(&set, &set);
        prop_assert_eq!(rows.len(), set.len());
        prop_assert!(rows.iter().all(|r| r.operation == Operation::None && r.target.is_none()));
    }

    /// Target is present exactly when the operation is not NONE.
    #[test]
    fn target_presence_matches_operation(csv in arb_set(), remote in arb_set()) {
        for row in reconcile(&csv, &remote) {
            prop_assert_eq!(row.target.is_none(), row.operation == Operation::None);
        }
    }

    /// Against an empty side, everything is a CREATE on that side.
    #[test]
    fn empty_side_gets_every_create(set in arb_set()) {
        let rows = reconcile(&set, &RecordSet::new());
        prop_assert!(rows
            .iter()
            .all(|r| r.operation == Operation::Create && r.target == Some(Target::Airtable)));

        let summary = ReconciliationSummary::from_rows(&reconcile(&RecordSet::new(), &set));
        prop_assert_eq!(summary.create_csv, set.len());
        prop_assert_eq!(summary.total, set.len());
    }
}
