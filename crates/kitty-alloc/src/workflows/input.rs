use std::fs;
use std::path::{Path, PathBuf};

use crate::allocation::{AllocationInput, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read input file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("input file {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Reads and structurally validates an allocation input document.
pub fn load_input(path: &Path) -> Result<AllocationInput, InputError> {
    let raw = fs::read_to_string(path).map_err(|source| InputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|source| InputError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(AllocationInput::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_input_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"siteKitty": 500, "salesAgents": [{{"id": "A1", "performanceScore": 88}}]}}"#
        )
        .expect("input written");

        let input = load_input(file.path()).expect("input loads");
        assert_eq!(input.site_kitty, 500);
        assert_eq!(input.sales_agents.len(), 1);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{ not json").expect("input written");

        let err = load_input(file.path()).expect_err("parse fails");
        assert!(matches!(err, InputError::Parse { .. }));
    }

    #[test]
    fn structural_problems_are_validation_errors() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"salesAgents": []}}"#).expect("input written");

        let err = load_input(file.path()).expect_err("kitty missing");
        assert!(matches!(
            err,
            InputError::Invalid(ValidationError::MissingKitty)
        ));
        assert_eq!(err.to_string(), "siteKitty field missing");
    }
}
