//! Local validation of submission targets.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ValidationError;
use crate::target::{ArchivePayload, SubmissionTarget};

/// Default upload ceiling (50 MiB)
pub const DEFAULT_MAX_ARCHIVE_BYTES: u64 = 50 * 1024 * 1024;

/// Bounds an archive must satisfy before it is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveLimits {
    #[serde(default = "default_max_archive_bytes")]
    pub max_archive_bytes: u64,

    /// Lowercase extensions including the dot
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_max_archive_bytes() -> u64 {
    DEFAULT_MAX_ARCHIVE_BYTES
}

fn default_allowed_extensions() -> Vec<String> {
    vec![".zip".to_string()]
}

impl Default for ArchiveLimits {
    fn default() -> Self {
        Self {
            max_archive_bytes: default_max_archive_bytes(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl ArchiveLimits {
    fn allows_extension(&self, ext: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}

/// Check a repository URL. Returns the trimmed value that will be sent.
pub fn validate_url(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyUrl);
    }

    let parsed = Url::parse(trimmed).map_err(|_| ValidationError::MalformedUrl)?;
    match parsed.scheme() {
        "http" | "https" => {}
        _ => return Err(ValidationError::UnsupportedScheme),
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::MalformedUrl);
    }

    Ok(trimmed.to_string())
}

/// Check an archive against `limits`.
pub fn validate_archive(archive: &ArchivePayload, limits: &ArchiveLimits) -> Result<(), ValidationError> {
    if archive.is_empty() {
        return Err(ValidationError::EmptyArchive);
    }

    if archive.len() > limits.max_archive_bytes {
        return Err(ValidationError::ArchiveTooLarge {
            size: archive.len(),
            limit: limits.max_archive_bytes,
        });
    }

    match archive.extension() {
        Some(ext) if limits.allows_extension(&ext) => Ok(()),
        _ => Err(ValidationError::UnsupportedExtension {
            file_name: archive.file_name.clone(),
            allowed: limits.allowed_extensions.join(", "),
        }),
    }
}

/// Validate a target and return the form that goes on the wire.
pub fn validate_target(
    target: SubmissionTarget,
    limits: &ArchiveLimits,
) -> Result<SubmissionTarget, ValidationError> {
    match target {
        SubmissionTarget::Url(raw) => validate_url(&raw).map(SubmissionTarget::Url),
        SubmissionTarget::Archive(archive) => {
            validate_archive(&archive, limits)?;
            Ok(SubmissionTarget::Archive(archive))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_accepts_http_and_https() {
        assert_eq!(
            validate_url("  https://github.com/user/repo.git ").unwrap(),
            "https://github.com/user/repo.git"
        );
        assert!(validate_url("http://gitlab.local/group/project").is_ok());
    }

    #[test]
    fn test_url_rejections() {
        assert_eq!(validate_url(""), Err(ValidationError::EmptyUrl));
        assert_eq!(validate_url("   "), Err(ValidationError::EmptyUrl));
        assert_eq!(validate_url("not a url"), Err(ValidationError::MalformedUrl));
        assert_eq!(
            validate_url("git@github.com:user/repo.git"),
            Err(ValidationError::MalformedUrl)
        );
        assert_eq!(
            validate_url("ftp://example.com/repo"),
            Err(ValidationError::UnsupportedScheme)
        );
        assert_eq!(
            validate_url("file:///tmp/repo"),
            Err(ValidationError::UnsupportedScheme)
        );
    }

    #[test]
    fn test_archive_bounds() {
        let limits = ArchiveLimits::default();

        assert!(validate_archive(&ArchivePayload::new("p.zip", vec![1; 16]), &limits).is_ok());
        assert!(validate_archive(&ArchivePayload::new("P.ZIP", vec![1; 16]), &limits).is_ok());

        assert_eq!(
            validate_archive(&ArchivePayload::new("p.zip", Vec::new()), &limits),
            Err(ValidationError::EmptyArchive)
        );
        assert!(matches!(
            validate_archive(&ArchivePayload::new("p.tar.gz", vec![1]), &limits),
            Err(ValidationError::UnsupportedExtension { .. })
        ));
    }

    #[test]
    fn test_archive_size_limit() {
        let limits = ArchiveLimits {
            max_archive_bytes: 8,
            ..Default::default()
        };

        assert!(validate_archive(&ArchivePayload::new("p.zip", vec![0; 8]), &limits).is_ok());
        assert_eq!(
            validate_archive(&ArchivePayload::new("p.zip", vec![0; 9]), &limits),
            Err(ValidationError::ArchiveTooLarge { size: 9, limit: 8 })
        );
    }

    #[test]
    fn test_limits_fill_missing_fields() {
        let limits: ArchiveLimits = serde_json::from_str("{}").unwrap();
        assert_eq!(limits, ArchiveLimits::default());
        assert_eq!(limits.max_archive_bytes, DEFAULT_MAX_ARCHIVE_BYTES);
    }
}
