//! The external `admesh` repair backend.

use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use sf_repair::RepairReport;

use crate::error::ConvertResult;
use crate::repair::{RepairOutcome, Repairer};

/// How often the subprocess is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Delegates the whole repair sequence to one `admesh` invocation.
///
/// The flag set is fixed and part of the contract: connect nearby
/// facets (`-n`), fill holes (`-f`), fix normal directions (`-d`) and
/// values (`-v`), remove unconnected facets (`-u`), three iterations at
/// a 0.001 tolerance, binary output. The invocation runs under a hard
/// wall-clock timeout.
///
/// Everything that can go wrong here - missing binary, non-zero exit,
/// timeout, no output file - is advisory: the outcome comes back with
/// `applied: false` and the caller exports the pre-repair mesh.
#[derive(Debug, Clone)]
pub struct AdmeshRepairer {
    program: String,
    timeout: Duration,
}

impl AdmeshRepairer {
    /// Backend invoking `program` with the fixed flag set.
    #[must_use]
    pub const fn new(program: String, timeout: Duration) -> Self {
        Self { program, timeout }
    }
}

impl Default for AdmeshRepairer {
    fn default() -> Self {
        Self {
            program: "admesh".to_owned(),
            timeout: Duration::from_secs(300),
        }
    }
}

impl Repairer for AdmeshRepairer {
    fn repair(&self, input: &Path, output: &Path) -> ConvertResult<RepairOutcome> {
        let mut command = Command::new(&self.program);
        command
            .args(["-n", "-f", "-d", "-v", "-u", "-i", "3", "-t", "0.001", "-b"])
            .arg(output)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let finished = match run_with_timeout(&mut command, self.timeout) {
            Err(e) => {
                warn!(program = %self.program, error = %e, "repair tool could not be started");
                return Ok(RepairOutcome::default());
            }
            Ok(None) => {
                warn!(
                    program = %self.program,
                    timeout_secs = self.timeout.as_secs(),
                    "repair tool timed out; continuing with the unrepaired mesh"
                );
                return Ok(RepairOutcome::default());
            }
            Ok(Some(finished)) => finished,
        };

        if !finished.status.success() {
            let stderr = String::from_utf8_lossy(&finished.stderr);
            warn!(
                program = %self.program,
                status = %finished.status,
                stderr = %stderr.trim(),
                "repair tool failed; continuing with the unrepaired mesh"
            );
            return Ok(RepairOutcome::default());
        }
        if !output.exists() {
            warn!(program = %self.program, "repair tool exited cleanly but wrote no output");
            return Ok(RepairOutcome::default());
        }

        let stdout = String::from_utf8_lossy(&finished.stdout);
        Ok(RepairOutcome {
            report: parse_transcript(&stdout),
            applied: true,
        })
    }
}

/// Run a command to completion or kill it at the deadline.
///
/// Polling `try_wait` keeps this on std alone. The tool's transcript is
/// a few hundred bytes, far below the pipe buffer, so collecting it
/// after exit cannot deadlock.
fn run_with_timeout(command: &mut Command, timeout: Duration) -> std::io::Result<Option<Output>> {
    let mut child = command.spawn()?;
    let deadline = Instant::now() + timeout;

    loop {
        if child.try_wait()?.is_some() {
            return child.wait_with_output().map(Some);
        }
        if Instant::now() >= deadline {
            // Best effort: the child may have exited between the poll
            // and the kill.
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Pull advisory counters out of the tool's transcript.
///
/// admesh prints `name : value` lines; only the lines mentioning edges,
/// facets or normals matter. The report is advisory by contract, so
/// anything unparseable is logged and skipped rather than failing the
/// repair.
fn parse_transcript(stdout: &str) -> RepairReport {
    let mut report = RepairReport::default();

    for line in stdout.lines() {
        let lower = line.to_lowercase();
        if !(lower.contains("edges fixed") || lower.contains("facets") || lower.contains("normal"))
        {
            continue;
        }
        info!("{}", line.trim());

        let Some(value) = line
            .rsplit(':')
            .next()
            .and_then(|v| v.trim().parse::<usize>().ok())
        else {
            debug!(line = line.trim(), "unparseable transcript line");
            continue;
        };

        if lower.contains("edges fixed") {
            report.edges_fixed += value;
        } else if lower.contains("removed") {
            report.facets_removed += value;
        } else if lower.contains("added") {
            report.facets_added += value;
        } else if lower.contains("reversed") || lower.contains("normal") {
            report.normals_fixed += value;
        }
    }

    report
}
