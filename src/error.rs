//! Error taxonomy for modpack resolution.
//!
//! Functions across the crate return `anyhow::Result`; the variants below are
//! raised through it so callers can `downcast_ref::<PackError>()` when they
//! need to react to a specific kind (for example re-prompting on a bad range).

use std::fmt;

use thiserror::Error;

/// A single manifest invariant violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyName,
    NoSources,
    NoLoaders,
    NoGameVersions,
    InvalidGameVersion(String),
    InvalidModSpecifier { id: String, reason: String },
    DuplicateMod(String),
    SourceNotEnabled { mod_id: String, source: String },
    LoaderNotEnabled(String),
    UnknownGameVersionBinding { loader: String, game_version: String },
    NoMatchingModVersion { mod_id: String, range: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "name must not be empty"),
            ValidationError::NoSources => write!(f, "at least one mod source is required"),
            ValidationError::NoLoaders => write!(f, "at least one mod loader is required"),
            ValidationError::NoGameVersions => {
                write!(f, "at least one game version is required")
            }
            ValidationError::InvalidGameVersion(v) => {
                write!(f, "game version '{}' is not a valid semantic version", v)
            }
            ValidationError::InvalidModSpecifier { id, reason } => {
                write!(f, "mod '{}' has an invalid version specifier: {}", id, reason)
            }
            ValidationError::DuplicateMod(id) => write!(f, "mod '{}' is listed more than once", id),
            ValidationError::SourceNotEnabled { mod_id, source } => write!(
                f,
                "mod '{}' comes from source '{}' which is not enabled",
                mod_id, source
            ),
            ValidationError::LoaderNotEnabled(loader) => {
                write!(f, "loader '{}' has bound versions but is not enabled", loader)
            }
            ValidationError::UnknownGameVersionBinding {
                loader,
                game_version,
            } => write!(
                f,
                "loader '{}' has a version bound to game version '{}', which the pack does not target",
                loader, game_version
            ),
            ValidationError::NoMatchingModVersion { mod_id, range } => write!(
                f,
                "no version of mod '{}' satisfies '{}'",
                mod_id, range
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum PackError {
    #[error("Malformed version specifier '{0}': expected 'id' or 'id@range'")]
    MalformedSpecifier(String),

    #[error("Version range is invalid: {0}")]
    InvalidRange(String),

    #[error("No compatible version of {target} found for {constraint}")]
    NoCompatibleVersion { target: String, constraint: String },

    #[error("Failed to fetch {url}: {reason}")]
    UpstreamFetchFailure { url: String, reason: String },

    #[error("A packlab.yml already exists at {0}")]
    ManifestAlreadyExists(String),

    #[error("No packlab.yml found at {0}. Run 'packlab init' first.")]
    ManifestMissing(String),

    #[error("Manifest is invalid:\n{}", format_violations(.0))]
    ValidationFailure(Vec<ValidationError>),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("Cancelled by user")]
    Cancelled,
}

fn format_violations(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

impl PackError {
    pub fn no_compatible(target: impl Into<String>, constraint: impl Into<String>) -> Self {
        PackError::NoCompatibleVersion {
            target: target.into(),
            constraint: constraint.into(),
        }
    }

    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        PackError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for errors an interactive prompt should recover from by asking again.
    pub fn is_recoverable_input(&self) -> bool {
        matches!(
            self,
            PackError::MalformedSpecifier(_) | PackError::InvalidRange(_)
        )
    }
}

/// Look through an `anyhow` chain for a `PackError`.
pub fn pack_error(err: &anyhow::Error) -> Option<&PackError> {
    err.chain().find_map(|e| e.downcast_ref::<PackError>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_validation_failure_lists_every_violation() {
        let err = PackError::ValidationFailure(vec![
            ValidationError::NoSources,
            ValidationError::EmptyName,
        ]);
        let msg = err.to_string();
        assert!(msg.contains("at least one mod source is required"));
        assert!(msg.contains("name must not be empty"));
    }

    #[test]
    fn test_pack_error_found_through_context() {
        let result: anyhow::Result<()> =
            Err(PackError::Cancelled).context("while resolving loaders");
        let err = result.unwrap_err();
        assert!(matches!(pack_error(&err), Some(PackError::Cancelled)));
    }

    #[test]
    fn test_recoverable_input_errors() {
        assert!(PackError::InvalidRange("x".into()).is_recoverable_input());
        assert!(PackError::MalformedSpecifier("a@b@c".into()).is_recoverable_input());
        assert!(!PackError::Cancelled.is_recoverable_input());
    }
}
