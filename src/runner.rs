//! Running solver executables.
//!
//! A solver reads one serialized instance on stdin and prints one integer
//! on stdout. [`Executable`] runs an external binary that way and measures
//! the wall-clock time of the whole invocation, process startup and
//! teardown included.

use crate::error::{HarnessError, Result};
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Write};
use std::panic;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Instant;
use tracing::debug;

/// Outcome of a single solver invocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Objective value printed by the solver
    pub output: i64,
    /// Elapsed wall-clock seconds
    pub time: f64,
}

/// Anything that turns serialized instance text into an objective value
pub trait Solver {
    /// Name used in logs and error messages
    fn name(&self) -> &str;

    /// Solve one instance
    fn solve(&self, input: &str) -> Result<RunResult>;
}

/// External solver binary, started with no arguments
#[derive(Debug, Clone)]
pub struct Executable {
    path: PathBuf,
    name: String,
}

impl Executable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

impl Solver for Executable {
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(&self, input: &str) -> Result<RunResult> {
        let start = Instant::now();

        let mut child = Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| HarnessError::Spawn {
                executable: self.name.clone(),
                source,
            })?;

        // Stdin is written from its own thread while stdout and stderr drain
        // here; a solver may print before it has read all of its input.
        let stdin = child.stdin.take();
        let (written, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(input.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (writer.join(), output)
        });
        let output = output?;
        let time = start.elapsed().as_secs_f64();

        match written {
            Err(payload) => panic::resume_unwind(payload),
            // A solver may exit before reading all of its input; the exit
            // status decides whether that was a failure.
            Ok(Err(err)) if err.kind() != ErrorKind::BrokenPipe => return Err(err.into()),
            Ok(_) => {}
        }

        if !output.status.success() {
            return Err(HarnessError::ProcessFailure {
                executable: self.name.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let value = parse_output(&stdout).ok_or_else(|| HarnessError::MalformedOutput {
            executable: self.name.clone(),
            output: stdout.to_string(),
        })?;

        debug!(executable = %self.name, output = value, time, "Solver finished");
        Ok(RunResult {
            output: value,
            time,
        })
    }
}

/// The whole trimmed output must be one base-10 integer
fn parse_output(stdout: &str) -> Option<i64> {
    stdout.trim().parse().ok()
}

/// Run `input` through `solver`
pub fn run_test_on(input: &str, solver: &dyn Solver) -> Result<RunResult> {
    solver.solve(input)
}
