//! Job configuration.
//!
//! A conversion job is described by a versioned, human-auditable JSON
//! file rather than code. In particular, the ordinal-extract index
//! tables live here, keyed by assembly identifier, so the geometric
//! assumptions stay out of the logic and can be reviewed or swapped
//! without a rebuild.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use sf_brep::Deflection;

use crate::error::{ConvertError, ConvertResult};
use crate::partition::PartitionRule;

/// The configuration schema version this build understands.
pub const SUPPORTED_VERSION: u32 = 1;

/// A whole conversion job: which assemblies to convert, how to
/// partition each, where the output goes and which repair backend runs.
///
/// # Example
///
/// ```
/// use sf_convert::JobConfig;
///
/// let config = JobConfig::from_str(r#"{
///     "version": 1,
///     "output_dir": "out",
///     "assemblies": [
///         { "id": "temple_arms", "source": "temple_arms.step",
///           "rule": { "type": "spatial_split" } }
///     ]
/// }"#)?;
/// config.validate()?;
/// assert_eq!(config.output_path("temple_arms", "left"),
///            std::path::Path::new("out/temple_arms_left.stl"));
/// # Ok::<(), sf_convert::ConvertError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    /// Schema version; must equal [`SUPPORTED_VERSION`].
    pub version: u32,
    /// Directory the output STL files land in.
    pub output_dir: PathBuf,
    /// Tessellation fidelity for every group.
    #[serde(default)]
    pub deflection: Deflection,
    /// Which repair implementation runs between tessellation and export.
    #[serde(default)]
    pub repair: RepairSettings,
    /// The assemblies to convert, each with its partition rule.
    pub assemblies: Vec<AssemblyJob>,
}

/// One assembly to convert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyJob {
    /// Identifier used in output file names; unique within the job.
    pub id: String,
    /// Path to the STEP file.
    pub source: PathBuf,
    /// How this assembly's solids are grouped.
    pub rule: PartitionRule,
}

/// Repair backend selection.
///
/// Both backends implement the same file-level repair contract, so
/// switching them never changes the surrounding job flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum RepairSettings {
    /// The in-process staged pipeline.
    Native {
        /// Vertex welding distance, in mesh units.
        #[serde(default = "default_merge_distance")]
        merge_distance: f64,
        /// Largest boundary loop, in edges, that hole filling closes.
        #[serde(default = "default_max_hole_edges")]
        max_hole_edges: usize,
    },
    /// The external `admesh` command-line tool.
    Admesh {
        /// Program name or path to invoke.
        #[serde(default = "default_admesh_program")]
        program: String,
        /// Hard wall-clock limit for one invocation, in seconds.
        #[serde(default = "default_admesh_timeout")]
        timeout_secs: u64,
    },
}

fn default_merge_distance() -> f64 {
    1e-4
}

fn default_max_hole_edges() -> usize {
    100
}

fn default_admesh_program() -> String {
    "admesh".to_owned()
}

fn default_admesh_timeout() -> u64 {
    300
}

impl Default for RepairSettings {
    fn default() -> Self {
        Self::native_defaults()
    }
}

impl RepairSettings {
    /// Native backend with default tuning.
    #[must_use]
    pub fn native_defaults() -> Self {
        Self::Native {
            merge_distance: default_merge_distance(),
            max_hole_edges: default_max_hole_edges(),
        }
    }

    /// Admesh backend with the default program and timeout.
    #[must_use]
    pub fn admesh_defaults() -> Self {
        Self::Admesh {
            program: default_admesh_program(),
            timeout_secs: default_admesh_timeout(),
        }
    }
}

impl JobConfig {
    /// Load and parse a job file.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Io`] when the file cannot be read and
    /// [`ConvertError::Config`] when it does not parse. Call
    /// [`JobConfig::validate`] afterwards; parsing alone does not
    /// validate.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConvertResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_str(&text)
    }

    /// Parse a job file from a string.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Config`] when the JSON does not match
    /// the schema.
    #[allow(clippy::should_implement_trait)]
    // Fallible parse with a domain error; FromStr's signature fits but
    // callers read better with the explicit name next to `from_path`.
    pub fn from_str(text: &str) -> ConvertResult<Self> {
        serde_json::from_str(text).map_err(|e| ConvertError::config(e.to_string()))
    }

    /// Check everything that can be checked without touching geometry.
    ///
    /// Ordinal-extract indices are additionally validated against the
    /// real solid count at run time, after enumeration and before any
    /// tessellation.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Config`] describing the first problem
    /// found, or [`ConvertError::Geometry`] for a bad deflection.
    pub fn validate(&self) -> ConvertResult<()> {
        if self.version != SUPPORTED_VERSION {
            return Err(ConvertError::config(format!(
                "unsupported version {} (this build understands {SUPPORTED_VERSION})",
                self.version
            )));
        }
        if self.assemblies.is_empty() {
            return Err(ConvertError::config("no assemblies to convert"));
        }

        let mut seen = std::collections::HashSet::new();
        for job in &self.assemblies {
            if job.id.is_empty() {
                return Err(ConvertError::config("assembly id must not be empty"));
            }
            if !seen.insert(job.id.as_str()) {
                return Err(ConvertError::config(format!(
                    "duplicate assembly id {:?}",
                    job.id
                )));
            }
            job.rule.validate()?;
        }

        self.deflection.validate().map_err(ConvertError::Geometry)?;

        match &self.repair {
            RepairSettings::Native { merge_distance, .. } => {
                if !(merge_distance.is_finite() && *merge_distance > 0.0) {
                    return Err(ConvertError::config(format!(
                        "merge distance must be strictly positive, got {merge_distance}"
                    )));
                }
            }
            RepairSettings::Admesh {
                program,
                timeout_secs,
            } => {
                if program.is_empty() {
                    return Err(ConvertError::config("admesh program must not be empty"));
                }
                if *timeout_secs == 0 {
                    return Err(ConvertError::config("admesh timeout must be nonzero"));
                }
            }
        }

        Ok(())
    }

    /// Deterministic output path for one group:
    /// `<output_dir>/<id>_<label>.stl`.
    #[must_use]
    pub fn output_path(&self, id: &str, label: &str) -> PathBuf {
        self.output_dir.join(format!("{id}_{label}.stl"))
    }
}
