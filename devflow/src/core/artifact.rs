//! Records of files written during a run.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

/// What a written file is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// `user_requirements.md`.
    Requirements,
    /// `plan_and_tasks.md`.
    Plan,
    /// Generated source for one implementation phase.
    Source,
    /// Generated tests for one component.
    Test,
    /// `test_cases_report.md`.
    Report,
    /// README, changelog and files under `docs/`.
    Documentation,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requirements => write!(f, "requirements"),
            Self::Plan => write!(f, "plan"),
            Self::Source => write!(f, "source"),
            Self::Test => write!(f, "test"),
            Self::Report => write!(f, "report"),
            Self::Documentation => write!(f, "documentation"),
        }
    }
}

/// A file written by a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Path relative to the output directory.
    pub path: PathBuf,
    /// The artifact kind.
    pub kind: ArtifactKind,
    /// Content length in bytes.
    pub bytes: usize,
    /// SHA-256 of the content, hex encoded.
    pub sha256: String,
    /// When the file was written (ISO 8601).
    pub created_at: String,
}

impl ArtifactRecord {
    /// Creates a record for content written to `path`.
    #[must_use]
    pub fn new(path: impl AsRef<Path>, kind: ArtifactKind, content: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            kind,
            bytes: content.len(),
            sha256: content_digest(content),
            created_at: crate::utils::iso_timestamp(),
        }
    }
}

/// Returns the hex SHA-256 of `content`.
#[must_use]
pub fn content_digest(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_record_digest() {
        let record = ArtifactRecord::new("README.md", ArtifactKind::Documentation, "hello");
        assert_eq!(record.bytes, 5);
        assert_eq!(
            record.sha256,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(record.path, PathBuf::from("README.md"));
    }

    #[test]
    fn test_artifact_kind_display() {
        assert_eq!(ArtifactKind::Report.to_string(), "report");
        assert_eq!(
            serde_json::to_string(&ArtifactKind::Source).unwrap(),
            r#""source""#
        );
    }
}
