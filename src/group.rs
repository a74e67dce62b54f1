//! Persisted test groups and result aggregation.
//!
//! A group is a directory under the store root holding one serialized
//! instance per file. Files are fed to solvers verbatim, in whatever order
//! the directory listing returns them. A validating store additionally
//! parses every file when the group is read, so a malformed instance fails
//! the run before any solver is started.

use crate::compare::{compare, Benchmark, Comparison, ZeroReferencePolicy};
use crate::error::{HarnessError, Result};
use crate::instance::Instance;
use crate::runner::{RunResult, Solver};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, info};

/// Merge comparisons into one, weighting each average by its trial count.
///
/// The result does not depend on how trials were grouped before merging.
pub fn merge_comparisons(results: &[Comparison]) -> Result<Comparison> {
    let tests_count: usize = results.iter().map(|c| c.tests_count).sum();
    if tests_count == 0 {
        return Err(HarnessError::EmptyAggregation);
    }

    let worst_ratio = results
        .iter()
        .map(|c| c.worst_ratio)
        .fold(f64::NEG_INFINITY, f64::max);
    let weighted_sum: f64 = results
        .iter()
        .map(|c| c.average_ratio * c.tests_count as f64)
        .sum();

    Ok(Comparison {
        worst_ratio,
        average_ratio: weighted_sum / tests_count as f64,
        tests_count,
    })
}

/// Worst and mean latency over a set of runs
pub fn collect_benchmark(results: &[RunResult]) -> Result<Benchmark> {
    if results.is_empty() {
        return Err(HarnessError::EmptyAggregation);
    }

    let worst_time = results
        .iter()
        .map(|r| r.time)
        .fold(f64::NEG_INFINITY, f64::max);
    let total: f64 = results.iter().map(|r| r.time).sum();

    Ok(Benchmark {
        worst_time,
        average_time: total / results.len() as f64,
    })
}

/// Directory of named test groups
#[derive(Debug, Clone)]
pub struct TestGroupStore {
    root: PathBuf,
    validate: bool,
}

impl TestGroupStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            validate: false,
        }
    }

    /// Parse every file with [`Instance::parse`] when a group is read
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn group_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Contents of every file in the group
    pub fn read_group(&self, name: &str) -> Result<Vec<String>> {
        let dir = self.group_dir(name);
        let entries = fs::read_dir(&dir).map_err(|err| match err.kind() {
            ErrorKind::NotFound => HarnessError::GroupNotFound {
                name: name.to_string(),
                root: self.root.clone(),
            },
            _ => HarnessError::Io(err),
        })?;

        let mut tests = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() {
                let text = fs::read_to_string(&path)?;
                if self.validate {
                    Instance::parse(&text).map_err(|err| {
                        HarnessError::MalformedInstance(format!("{}: {}", path.display(), err))
                    })?;
                }
                tests.push(text);
            }
        }
        if self.validate {
            debug!(group = name, tests = tests.len(), "Validated test group");
        }
        Ok(tests)
    }

    /// Replace the group with `{i}.txt` files, one per instance
    pub fn write_group(&self, name: &str, tests: &[Instance]) -> Result<PathBuf> {
        let dir = self.group_dir(name);
        match fs::remove_dir_all(&dir) {
            Err(err) if err.kind() != ErrorKind::NotFound => return Err(err.into()),
            _ => {}
        }
        fs::create_dir_all(&dir)?;

        for (i, test) in tests.iter().enumerate() {
            fs::write(dir.join(format!("{}.txt", i)), test.to_protocol())?;
        }

        info!(group = name, tests = tests.len(), dir = %dir.display(), "Wrote test group");
        Ok(dir)
    }
}

/// Compare two solvers over every instance of a group
pub fn run_test_group(
    store: &TestGroupStore,
    name: &str,
    subject: &dyn Solver,
    reference: &dyn Solver,
    policy: ZeroReferencePolicy,
) -> Result<Comparison> {
    let tests = store.read_group(name)?;
    info!(
        group = name,
        tests = tests.len(),
        subject = subject.name(),
        reference = reference.name(),
        "Running test group"
    );

    let comparisons = tests
        .iter()
        .map(|test| compare(test, subject, reference, policy))
        .collect::<Result<Vec<_>>>()?;

    let merged = merge_comparisons(&comparisons)?;
    info!(
        group = name,
        average_ratio = merged.average_ratio,
        worst_ratio = merged.worst_ratio,
        "Test group finished"
    );
    Ok(merged)
}

/// Time one solver over every instance of a group
pub fn run_benchmark_on_group(
    store: &TestGroupStore,
    name: &str,
    solver: &dyn Solver,
) -> Result<Benchmark> {
    let tests = store.read_group(name)?;
    info!(group = name, tests = tests.len(), solver = solver.name(), "Running benchmark");

    let runs = tests
        .iter()
        .map(|test| solver.solve(test))
        .collect::<Result<Vec<_>>>()?;

    let benchmark = collect_benchmark(&runs)?;
    info!(
        group = name,
        average_time = benchmark.average_time,
        worst_time = benchmark.worst_time,
        "Benchmark finished"
    );
    Ok(benchmark)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Edge;
    use tempfile::TempDir;

    fn run(time: f64) -> RunResult {
        RunResult { output: 1, time }
    }

    #[test]
    fn test_collect_benchmark() {
        let b = collect_benchmark(&[run(1.0), run(2.0), run(3.0)]).unwrap();
        assert_eq!(b.worst_time, 3.0);
        assert_eq!(b.average_time, 2.0);
    }

    #[test]
    fn test_merge_weights_by_count() {
        let a = Comparison {
            worst_ratio: 2.0,
            average_ratio: 2.0,
            tests_count: 1,
        };
        let b = Comparison {
            worst_ratio: 4.0,
            average_ratio: 4.0,
            tests_count: 3,
        };
        let merged = merge_comparisons(&[a, b]).unwrap();
        assert_eq!(merged.worst_ratio, 4.0);
        assert_eq!(merged.average_ratio, 3.5);
        assert_eq!(merged.tests_count, 4);
    }

    #[test]
    fn test_merge_keeps_negative_sentinel_as_worst_when_alone() {
        let merged = merge_comparisons(&[Comparison::single(-1.0)]).unwrap();
        assert_eq!(merged.worst_ratio, -1.0);
    }

    #[test]
    fn test_empty_aggregation_fails() {
        assert!(matches!(merge_comparisons(&[]), Err(HarnessError::EmptyAggregation)));
        assert!(matches!(collect_benchmark(&[]), Err(HarnessError::EmptyAggregation)));
        let zero = Comparison {
            worst_ratio: 1.0,
            average_ratio: 1.0,
            tests_count: 0,
        };
        assert!(merge_comparisons(&[zero]).is_err());
    }

    #[test]
    fn test_group_write_then_read() {
        let tmp = TempDir::new().unwrap();
        let store = TestGroupStore::new(tmp.path());
        let tests = vec![
            Instance::new(2, 2, vec![Edge::new(0, 1, 3)]),
            Instance::new(3, 2, vec![Edge::new(0, 2, 0)]),
        ];
        store.write_group("small", &tests).unwrap();

        let mut read = store.read_group("small").unwrap();
        read.sort();
        assert_eq!(read, vec!["2 1 2\n1 2 4".to_string(), "3 1 2\n1 3 1".to_string()]);
    }

    #[test]
    fn test_write_group_replaces_previous_contents() {
        let tmp = TempDir::new().unwrap();
        let store = TestGroupStore::new(tmp.path());
        let many: Vec<Instance> = (0..5).map(|_| Instance::new(1, 1, Vec::new())).collect();
        store.write_group("g", &many).unwrap();
        store.write_group("g", &many[..2]).unwrap();
        assert_eq!(store.read_group("g").unwrap().len(), 2);
    }

    /// Counts invocations and answers 1
    #[derive(Default)]
    struct Counting {
        calls: std::cell::Cell<usize>,
    }

    impl Solver for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn solve(&self, _input: &str) -> Result<RunResult> {
            self.calls.set(self.calls.get() + 1);
            Ok(run(0.0))
        }
    }

    fn group_with_bad_file(tmp: &TempDir) -> TestGroupStore {
        let store = TestGroupStore::new(tmp.path());
        store
            .write_group("mixed", &[Instance::new(2, 2, vec![Edge::new(0, 1, 3)])])
            .unwrap();
        fs::write(store.group_dir("mixed").join("bad.txt"), "3 2 2\n1 2 3").unwrap();
        store
    }

    #[test]
    fn test_unvalidated_group_is_read_verbatim() {
        let tmp = TempDir::new().unwrap();
        let store = group_with_bad_file(&tmp);
        assert_eq!(store.read_group("mixed").unwrap().len(), 2);
    }

    #[test]
    fn test_validation_rejects_malformed_file_before_solving() {
        let tmp = TempDir::new().unwrap();
        let store = group_with_bad_file(&tmp).with_validation(true);
        let subject = Counting::default();
        let reference = Counting::default();

        match run_test_group(&store, "mixed", &subject, &reference, ZeroReferencePolicy::Sentinel) {
            Err(HarnessError::MalformedInstance(msg)) => assert!(msg.contains("bad.txt")),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            run_benchmark_on_group(&store, "mixed", &subject),
            Err(HarnessError::MalformedInstance(_))
        ));
        assert_eq!(subject.calls.get(), 0);
        assert_eq!(reference.calls.get(), 0);
    }

    #[test]
    fn test_validation_accepts_well_formed_group() {
        let tmp = TempDir::new().unwrap();
        let store = TestGroupStore::new(tmp.path()).with_validation(true);
        let tests = vec![Instance::new(3, 2, vec![Edge::new(0, 2, 0)]); 3];
        store.write_group("ok", &tests).unwrap();

        let solver = Counting::default();
        run_benchmark_on_group(&store, "ok", &solver).unwrap();
        assert_eq!(solver.calls.get(), 3);
    }

    #[test]
    fn test_missing_group() {
        let tmp = TempDir::new().unwrap();
        let store = TestGroupStore::new(tmp.path());
        assert!(matches!(
            store.read_group("absent"),
            Err(HarnessError::GroupNotFound { .. })
        ));
    }
}
