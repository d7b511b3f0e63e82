use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::audit::{AuditReceipt, AuditRecord, AuditSink};
use super::input::{load_input, InputError};
use crate::allocation::{allocate, AllocationConfig, AllocationError, AllocationResult, Scorer};

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("unable to list scenario directory {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Why a single scenario file did not produce a result.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

#[derive(Debug)]
pub enum BatchOutcome {
    Completed {
        file: String,
        result: AllocationResult,
        audit: Option<AuditReceipt>,
    },
    Failed {
        file: String,
        error: ScenarioError,
    },
}

impl BatchOutcome {
    pub fn file(&self) -> &str {
        match self {
            Self::Completed { file, .. } | Self::Failed { file, .. } => file,
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    pub fn completed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, BatchOutcome::Completed { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.completed()
    }
}

/// Runs every `*.json` scenario in a directory through the pipeline.
///
/// A failing file is logged and recorded; it never stops the remaining files.
pub struct BatchRunner<'a> {
    config: &'a AllocationConfig,
    scorer: Option<&'a dyn Scorer>,
    audit: Option<&'a dyn AuditSink>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(config: &'a AllocationConfig) -> Self {
        Self {
            config,
            scorer: None,
            audit: None,
        }
    }

    pub fn with_scorer(mut self, scorer: &'a dyn Scorer) -> Self {
        self.scorer = Some(scorer);
        self
    }

    pub fn with_audit(mut self, audit: &'a dyn AuditSink) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn run(&self, directory: &Path) -> Result<BatchReport, BatchError> {
        let files = scenario_files(directory)?;
        let mut report = BatchReport::default();

        for path in files {
            let file = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            let outcome = match self.run_file(&path) {
                Ok((result, audit)) => BatchOutcome::Completed {
                    file,
                    result,
                    audit,
                },
                Err(error) => {
                    warn!(%file, %error, "scenario failed");
                    BatchOutcome::Failed { file, error }
                }
            };
            report.outcomes.push(outcome);
        }

        info!(
            completed = report.completed(),
            failed = report.failed(),
            directory = %directory.display(),
            "batch run finished"
        );
        Ok(report)
    }

    fn run_file(
        &self,
        path: &Path,
    ) -> Result<(AllocationResult, Option<AuditReceipt>), ScenarioError> {
        let input = load_input(path)?;
        let result = allocate(&input, self.config, self.scorer)?;

        let receipt = self.audit.and_then(|sink| {
            let record = AuditRecord {
                input: &input,
                config: self.config,
                result: &result,
            };
            match sink.record(&record) {
                Ok(receipt) => Some(receipt),
                Err(err) => {
                    warn!(file = %path.display(), error = %err, "audit write failed");
                    None
                }
            }
        });

        Ok((result, receipt))
    }
}

fn scenario_files(directory: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let read_dir_error = |source| BatchError::ReadDir {
        path: directory.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(directory).map_err(read_dir_error)? {
        let path = entry.map_err(read_dir_error)?.path();
        let is_json = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
        if is_json && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::{ValidationError, WeightConfig};
    use crate::workflows::audit::{AuditError, FileAuditSink};
    use std::sync::Mutex;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).expect("scenario written");
    }

    fn config() -> AllocationConfig {
        AllocationConfig::with_weights(WeightConfig::new().with("deals", 1.0))
    }

    #[derive(Default)]
    struct MemoryAudit {
        records: Mutex<Vec<i64>>,
    }

    impl AuditSink for MemoryAudit {
        fn record(&self, record: &AuditRecord<'_>) -> Result<AuditReceipt, AuditError> {
            let mut guard = self.records.lock().expect("audit mutex poisoned");
            guard.push(record.result.summary.total_allocated);
            Ok(AuditReceipt {
                location: format!("memory://{}", guard.len()),
            })
        }
    }

    struct BrokenAudit;

    impl AuditSink for BrokenAudit {
        fn record(&self, _record: &AuditRecord<'_>) -> Result<AuditReceipt, AuditError> {
            Err(AuditError::Io {
                path: PathBuf::from("/readonly"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read only"),
            })
        }
    }

    #[test]
    fn failing_file_does_not_stop_the_batch() {
        let dir = tempfile::tempdir().expect("temp dir");
        write(
            dir.path(),
            "a-good.json",
            r#"{"siteKitty": 100, "salesAgents": [{"id": "A1", "deals": 3}, {"id": "A2", "deals": 1}]}"#,
        );
        write(
            dir.path(),
            "b-empty.json",
            r#"{"siteKitty": 100, "salesAgents": []}"#,
        );
        write(dir.path(), "c-broken.json", "{ nope");
        write(dir.path(), "notes.txt", "ignored");

        let audit = MemoryAudit::default();
        let config = config();
        let report = BatchRunner::new(&config)
            .with_audit(&audit)
            .run(dir.path())
            .expect("batch runs");

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.completed(), 1);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.outcomes[0].file(), "a-good.json");

        match &report.outcomes[1] {
            BatchOutcome::Failed {
                error: ScenarioError::Input(InputError::Invalid(ValidationError::NoAgents)),
                ..
            } => {}
            other => panic!("expected empty agent failure, got {other:?}"),
        }
        assert!(matches!(
            &report.outcomes[2],
            BatchOutcome::Failed {
                error: ScenarioError::Input(InputError::Parse { .. }),
                ..
            }
        ));
        assert_eq!(*audit.records.lock().expect("audit mutex poisoned"), vec![100]);
    }

    #[test]
    fn successful_runs_are_audited_to_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let logs = tempfile::tempdir().expect("log dir");
        write(
            dir.path(),
            "scenario.json",
            r#"{"siteKitty": 50, "salesAgents": [{"id": "A1", "deals": 2}]}"#,
        );

        let sink = FileAuditSink::new(logs.path());
        let config = config();
        let report = BatchRunner::new(&config)
            .with_audit(&sink)
            .run(dir.path())
            .expect("batch runs");

        match &report.outcomes[0] {
            BatchOutcome::Completed { audit, result, .. } => {
                assert_eq!(result.allocations[0].assigned_amount, 50);
                assert!(audit.is_some());
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(fs::read_dir(logs.path()).expect("log listing").count(), 1);
    }

    #[test]
    fn audit_failure_keeps_the_result() {
        let dir = tempfile::tempdir().expect("temp dir");
        write(
            dir.path(),
            "scenario.json",
            r#"{"siteKitty": 10, "salesAgents": [{"id": "A1", "deals": 2}]}"#,
        );

        let config = config();
        let report = BatchRunner::new(&config)
            .with_audit(&BrokenAudit)
            .run(dir.path())
            .expect("batch runs");

        assert_eq!(report.completed(), 1);
        assert!(matches!(
            &report.outcomes[0],
            BatchOutcome::Completed { audit: None, .. }
        ));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let config = config();
        let err = BatchRunner::new(&config)
            .run(Path::new("/definitely/not/here"))
            .expect_err("directory missing");
        assert!(matches!(err, BatchError::ReadDir { .. }));
    }
}
