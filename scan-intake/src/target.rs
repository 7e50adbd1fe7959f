//! Submission targets
//!
//! A scan targets exactly one of: a repository URL, or a `.zip` archive.
//! The draft keeps a slot for each so switching modes does not lose input,
//! but only the active slot is ever submitted.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::Path;

/// Which input mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    #[default]
    Url,
    Archive,
}

impl TargetKind {
    /// Value of the `type` field on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Url => "url",
            TargetKind::Archive => "archive",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compressed archive selected for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct ArchivePayload {
    pub file_name: String,
    pub bytes: Bytes,
}

impl ArchivePayload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read an archive from disk, keeping its file name.
    pub async fn read_from(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(file_name, bytes))
    }

    pub fn len(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercased extension including the dot, e.g. `.zip`.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.file_name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(format!(".{}", ext.to_ascii_lowercase()))
    }

    /// Hex SHA-256 of the contents, used to correlate uploads in logs.
    pub fn sha256_hex(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

impl fmt::Debug for ArchivePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchivePayload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The single target a submission carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionTarget {
    Url(String),
    Archive(ArchivePayload),
}

impl SubmissionTarget {
    pub fn kind(&self) -> TargetKind {
        match self {
            SubmissionTarget::Url(_) => TargetKind::Url,
            SubmissionTarget::Archive(_) => TargetKind::Archive,
        }
    }

    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            SubmissionTarget::Url(url) => url.clone(),
            SubmissionTarget::Archive(archive) => {
                format!("{} ({} bytes)", archive.file_name, archive.len())
            }
        }
    }
}

/// A value entered into one of the two input slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetValue {
    Text(String),
    Archive(ArchivePayload),
}

impl TargetValue {
    pub fn kind(&self) -> TargetKind {
        match self {
            TargetValue::Text(_) => TargetKind::Url,
            TargetValue::Archive(_) => TargetKind::Archive,
        }
    }
}

/// Form contents: the active mode and one slot per mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetDraft {
    pub mode: TargetKind,
    pub url: String,
    pub archive: Option<ArchivePayload>,
}

impl TargetDraft {
    /// The target for the active mode, if its slot holds anything.
    pub fn active_target(&self) -> Option<SubmissionTarget> {
        match self.mode {
            TargetKind::Url if self.url.trim().is_empty() => None,
            TargetKind::Url => Some(SubmissionTarget::Url(self.url.clone())),
            TargetKind::Archive => self.archive.clone().map(SubmissionTarget::Archive),
        }
    }

    pub fn has_active_value(&self) -> bool {
        match self.mode {
            TargetKind::Url => !self.url.trim().is_empty(),
            TargetKind::Archive => self.archive.is_some(),
        }
    }
}
