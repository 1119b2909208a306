//! Property-based tests for the partition rules.
//!
//! Run with: cargo test -p sf-convert -- proptest

use proptest::prelude::*;
use sf_brep::SolidRecord;
use sf_convert::PartitionRule;
use sf_mesh::{Aabb, Axis, Point3};

fn arb_solids() -> impl Strategy<Value = Vec<SolidRecord>> {
    prop::collection::vec(-1000.0..1000.0f64, 1..40).prop_map(|centers| {
        centers
            .into_iter()
            .map(|x| SolidRecord {
                entity_id: 0,
                bounds: Aabb::new(
                    Point3::new(x - 1.0, -1.0, -1.0),
                    Point3::new(x + 1.0, 1.0, 1.0),
                ),
            })
            .collect()
    })
}

fn spatial_split() -> PartitionRule {
    PartitionRule::SpatialSplit {
        axis: Axis::X,
        low_label: "left".to_owned(),
        high_label: "right".to_owned(),
    }
}

proptest! {
    /// Spatial split is a disjoint cover: every solid lands in exactly
    /// one group, in enumeration order.
    #[test]
    fn spatial_split_is_a_disjoint_cover(solids in arb_solids()) {
        let groups = spatial_split().partition(&solids).expect("non-empty input");
        prop_assert_eq!(groups.len(), 2);

        let mut all: Vec<usize> = groups
            .iter()
            .flat_map(|g| g.members.iter().copied())
            .collect();
        all.sort_unstable();
        let expected: Vec<usize> = (0..solids.len()).collect();
        prop_assert_eq!(all, expected, "no solid dropped or duplicated");
    }

    /// Extracted singleton plus remainder reconstruct the original
    /// ordered set.
    #[test]
    fn ordinal_extract_reconstructs_the_input(
        solids in arb_solids(),
        raw_index in 0usize..40,
    ) {
        let index = raw_index % solids.len();
        let rule = PartitionRule::OrdinalExtract {
            index,
            label: "extracted".to_owned(),
            rest_label: "rest".to_owned(),
        };
        let groups = rule.partition(&solids).expect("valid index");

        prop_assert_eq!(groups[0].members.clone(), vec![index]);
        let mut reconstructed = groups[1].members.clone();
        reconstructed.insert(
            groups[1].members.iter().filter(|&&i| i < index).count(),
            index,
        );
        let expected: Vec<usize> = (0..solids.len()).collect();
        prop_assert_eq!(reconstructed, expected);
    }

    /// Out-of-range indices always fail, never partially execute.
    #[test]
    fn ordinal_extract_rejects_bad_indices(solids in arb_solids(), extra in 0usize..10) {
        let rule = PartitionRule::OrdinalExtract {
            index: solids.len() + extra,
            label: "extracted".to_owned(),
            rest_label: "rest".to_owned(),
        };
        prop_assert!(rule.partition(&solids).is_err());
    }
}
