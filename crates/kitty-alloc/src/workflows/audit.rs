use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use crate::allocation::{AllocationConfig, AllocationInput, AllocationResult};

/// Everything needed to replay or review a run.
#[derive(Debug, Serialize)]
pub struct AuditRecord<'a> {
    pub input: &'a AllocationInput,
    pub config: &'a AllocationConfig,
    pub result: &'a AllocationResult,
}

/// Where a record ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReceipt {
    pub location: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("unable to write audit record to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unable to serialize audit record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persistence hook invoked after each successful allocation.
pub trait AuditSink: Send + Sync {
    fn record(&self, record: &AuditRecord<'_>) -> Result<AuditReceipt, AuditError>;
}

/// Writes each record as pretty JSON into its own timestamped file.
#[derive(Debug, Clone)]
pub struct FileAuditSink {
    directory: PathBuf,
}

impl FileAuditSink {
    const MAX_COLLISIONS: u32 = 1000;

    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> AuditError {
        AuditError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn create_unique(&self, stamp: &str) -> Result<(PathBuf, fs::File), AuditError> {
        for attempt in 0..Self::MAX_COLLISIONS {
            let name = if attempt == 0 {
                format!("allocation-log-{stamp}.json")
            } else {
                format!("allocation-log-{stamp}-{attempt}.json")
            };
            let path = self.directory.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(self.io_error(&path, err)),
            }
        }
        let path = self.directory.join(format!("allocation-log-{stamp}.json"));
        Err(self.io_error(
            &path,
            std::io::Error::new(ErrorKind::AlreadyExists, "too many audit records share a timestamp"),
        ))
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, record: &AuditRecord<'_>) -> Result<AuditReceipt, AuditError> {
        fs::create_dir_all(&self.directory).map_err(|err| self.io_error(&self.directory, err))?;

        let (path, file) = self.create_unique(&timestamp_slug(Utc::now()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, record)?;
        writer.flush().map_err(|err| self.io_error(&path, err))?;

        info!(path = %path.display(), "audit log saved");
        Ok(AuditReceipt {
            location: path.display().to_string(),
        })
    }
}

/// RFC 3339 UTC timestamp with `:` and `.` swapped for `-`, safe for file names.
pub fn timestamp_slug(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}
