//! Partitioning an assembly's solids into named output groups.

use serde::{Deserialize, Serialize};
use tracing::info;

use sf_brep::SolidRecord;
use sf_mesh::Axis;

use crate::error::{ConvertError, ConvertResult};

/// An ordered set of solid ordinals sharing one output file.
///
/// The label becomes part of the output file name. An empty member list
/// is a valid (no-op) group; the job runner skips it without error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidGroup {
    /// Human-readable group label, e.g. `left` or `lens_bed`.
    pub label: String,
    /// Catalog ordinals of the member solids, in enumeration order.
    pub members: Vec<usize>,
}

/// How to split an assembly's solids into groups.
///
/// Every rule produces a disjoint cover of the input: each solid lands
/// in exactly one group, none are dropped or duplicated.
///
/// # Example
///
/// ```
/// use sf_convert::PartitionRule;
///
/// let rule: PartitionRule = serde_json::from_str(
///     r#"{ "type": "ordinal_extract", "index": 8, "label": "lens_bed" }"#,
/// )?;
/// assert!(matches!(rule, PartitionRule::OrdinalExtract { index: 8, .. }));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PartitionRule {
    /// Split by position relative to the centroid midpoint on one axis.
    ///
    /// The midpoint is `(min + max) / 2` over the member centroids, a
    /// single threshold rather than a balanced split: group sizes may
    /// be arbitrarily unequal when centroids cluster, and one side may
    /// come out empty. Ties land in the high group.
    SpatialSplit {
        /// Axis whose centroid coordinate decides the side.
        #[serde(default)]
        axis: Axis,
        /// Label for the `centroid < midpoint` group.
        #[serde(default = "default_low_label")]
        low_label: String,
        /// Label for the `centroid >= midpoint` group.
        #[serde(default = "default_high_label")]
        high_label: String,
    },

    /// Pull one solid out by catalog ordinal; the rest stay together.
    ///
    /// The index comes from external per-assembly configuration, never
    /// from geometry, and is validated against the actual solid count
    /// before anything is tessellated.
    OrdinalExtract {
        /// Catalog ordinal of the solid to extract.
        index: usize,
        /// Label for the extracted singleton.
        label: String,
        /// Label for the remaining solids.
        #[serde(default = "default_rest_label")]
        rest_label: String,
    },

    /// Every solid in a single group.
    MergeAll {
        /// Label for the group.
        label: String,
    },
}

fn default_low_label() -> String {
    "left".to_owned()
}

fn default_high_label() -> String {
    "right".to_owned()
}

fn default_rest_label() -> String {
    "rest".to_owned()
}

impl PartitionRule {
    /// Check the rule's labels, independently of any geometry.
    ///
    /// Labels within one rule become distinct output file names, so an
    /// empty label or two equal labels would make one group's file
    /// silently overwrite the other's.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Config`] for an empty or duplicated
    /// label.
    pub fn validate(&self) -> ConvertResult<()> {
        let (first, second) = match self {
            Self::SpatialSplit {
                low_label,
                high_label,
                ..
            } => (low_label, Some(high_label)),
            Self::OrdinalExtract {
                label, rest_label, ..
            } => (label, Some(rest_label)),
            Self::MergeAll { label } => (label, None),
        };
        if first.is_empty() || second.is_some_and(|label| label.is_empty()) {
            return Err(ConvertError::config("group label must not be empty"));
        }
        if second == Some(first) {
            return Err(ConvertError::config(format!(
                "group labels within one rule must differ, both are {first:?}"
            )));
        }
        Ok(())
    }

    /// Assign every solid to a group.
    ///
    /// # Errors
    ///
    /// - [`ConvertError::Geometry`] with `EmptyAssembly` when the rule
    ///   needs at least one solid and the catalog has none.
    /// - [`ConvertError::SolidIndex`] when an ordinal-extract index is
    ///   out of range; nothing is partially executed in that case.
    pub fn partition(&self, solids: &[SolidRecord]) -> ConvertResult<Vec<SolidGroup>> {
        match self {
            Self::SpatialSplit {
                axis,
                low_label,
                high_label,
            } => {
                if solids.is_empty() {
                    return Err(sf_brep::BrepError::EmptyAssembly.into());
                }
                let centers: Vec<f64> = solids.iter().map(|s| s.center_along(*axis)).collect();
                let lowest = centers.iter().copied().fold(f64::INFINITY, f64::min);
                let highest = centers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let mid = (lowest + highest) / 2.0;

                let mut low = SolidGroup {
                    label: low_label.clone(),
                    members: Vec::new(),
                };
                let mut high = SolidGroup {
                    label: high_label.clone(),
                    members: Vec::new(),
                };
                for (ordinal, center) in centers.iter().enumerate() {
                    if *center < mid {
                        low.members.push(ordinal);
                    } else {
                        high.members.push(ordinal);
                    }
                }
                info!(
                    %axis,
                    mid,
                    low = low.members.len(),
                    high = high.members.len(),
                    "spatial split"
                );
                Ok(vec![low, high])
            }

            Self::OrdinalExtract {
                index,
                label,
                rest_label,
            } => {
                if *index >= solids.len() {
                    return Err(ConvertError::SolidIndex {
                        index: *index,
                        count: solids.len(),
                    });
                }
                let extracted = SolidGroup {
                    label: label.clone(),
                    members: vec![*index],
                };
                let rest = SolidGroup {
                    label: rest_label.clone(),
                    members: (0..solids.len()).filter(|&i| i != *index).collect(),
                };
                info!(index, rest = rest.members.len(), "ordinal extract");
                Ok(vec![extracted, rest])
            }

            Self::MergeAll { label } => {
                if solids.is_empty() {
                    return Err(sf_brep::BrepError::EmptyAssembly.into());
                }
                Ok(vec![SolidGroup {
                    label: label.clone(),
                    members: (0..solids.len()).collect(),
                }])
            }
        }
    }
}
