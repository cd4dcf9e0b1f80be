//! Error handling for Rapuma
//!
//! Errors fall into four broad categories, and every variant of [`RapumaError`]
//! belongs to exactly one of them:
//!
//! - **Fatal / precondition**: a missing required source or artifact, a lock
//!   violation without `force`, an invalid component id. The current operation
//!   aborts and leaves no partial state behind where that can be avoided.
//! - **Recoverable / optional**: a missing optional artifact or background layer.
//!   These are normally logged and never surface as errors; the variants exist so
//!   generators can report them to the assembler.
//! - **External process**: the renderer or a PDF utility exited badly. Only a
//!   missing output after the run is escalated.
//! - **Shared resource conflict**: removing a component another group still
//!   references. Refused and reported, but the CLI treats it as non-fatal.
//!
//! Library code returns [`anyhow::Result`] and attaches context with
//! `.with_context()`. At the binary boundary [`user_friendly_error`] turns the
//! chain into an [`ErrorContext`] carrying a suggestion and optional details,
//! printed with colours by [`ErrorContext::display`].

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for Rapuma operations.
#[derive(Error, Debug)]
pub enum RapumaError {
    /// A group with this id is already configured and `force` was not given.
    #[error("Group '{gid}' already exists")]
    GroupExists {
        gid: String,
    },

    #[error("Group '{gid}' not found in the project configuration")]
    GroupNotFound {
        gid: String,
    },

    /// A mutating operation was attempted on a locked group without `force`.
    #[error("Group '{gid}' is locked")]
    GroupLocked {
        gid: String,
    },

    /// The id does not resolve to a known canonical component identifier,
    /// or does not belong to the group it was requested for.
    #[error("Invalid component id '{cid}': {reason}")]
    InvalidComponentId {
        cid: String,
        reason: String,
    },

    #[error("Component id '{cid}' is listed more than once")]
    DuplicateComponentId {
        cid: String,
    },

    /// The component is referenced by another group and cannot be removed.
    #[error("Component '{cid}' is shared with group '{other_gid}' and cannot be removed from '{gid}'")]
    SharedComponent {
        gid: String,
        cid: String,
        other_gid: String,
    },

    #[error("Required source not found: {path}")]
    MissingRequiredSource {
        path: String,
    },

    #[error("Required artifact '{artifact}' is missing: {path}")]
    MissingRequiredArtifact {
        artifact: String,
        path: String,
    },

    /// A required generator failed; its partial output has been removed.
    #[error("Failed to generate required artifact '{artifact}': {reason}")]
    GeneratorFailed {
        artifact: String,
        reason: String,
    },

    #[error("Rendered output not found: {path}")]
    RenderOutputMissing {
        path: String,
    },

    #[error("External tool '{tool}' not found")]
    ExternalToolNotFound {
        tool: String,
    },

    #[error("External command failed: {command}")]
    ExternalCommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Markup validation failed for {file}: {reason}")]
    ValidationFailed {
        file: String,
        reason: String,
    },

    #[error("Component type '{ctype}' is not supported")]
    UnknownComponentType {
        ctype: String,
    },

    #[error("Macro package '{name}' is not recognized")]
    UnknownMacroPackage {
        name: String,
    },

    #[error("Configuration error in {file}: {reason}")]
    ConfigError {
        file: String,
        reason: String,
    },

    #[error("No project found at {path}")]
    ProjectNotFound {
        path: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlEditError(#[from] toml_edit::TomlError),

    #[error("{message}")]
    Other {
        message: String,
    },
}

impl Clone for RapumaError {
    fn clone(&self) -> Self {
        match self {
            Self::GroupExists {
                gid,
            } => Self::GroupExists {
                gid: gid.clone(),
            },
            Self::GroupNotFound {
                gid,
            } => Self::GroupNotFound {
                gid: gid.clone(),
            },
            Self::GroupLocked {
                gid,
            } => Self::GroupLocked {
                gid: gid.clone(),
            },
            Self::InvalidComponentId {
                cid,
                reason,
            } => Self::InvalidComponentId {
                cid: cid.clone(),
                reason: reason.clone(),
            },
            Self::DuplicateComponentId {
                cid,
            } => Self::DuplicateComponentId {
                cid: cid.clone(),
            },
            Self::SharedComponent {
                gid,
                cid,
                other_gid,
            } => Self::SharedComponent {
                gid: gid.clone(),
                cid: cid.clone(),
                other_gid: other_gid.clone(),
            },
            Self::MissingRequiredSource {
                path,
            } => Self::MissingRequiredSource {
                path: path.clone(),
            },
            Self::MissingRequiredArtifact {
                artifact,
                path,
            } => Self::MissingRequiredArtifact {
                artifact: artifact.clone(),
                path: path.clone(),
            },
            Self::GeneratorFailed {
                artifact,
                reason,
            } => Self::GeneratorFailed {
                artifact: artifact.clone(),
                reason: reason.clone(),
            },
            Self::RenderOutputMissing {
                path,
            } => Self::RenderOutputMissing {
                path: path.clone(),
            },
            Self::ExternalToolNotFound {
                tool,
            } => Self::ExternalToolNotFound {
                tool: tool.clone(),
            },
            Self::ExternalCommandFailed {
                command,
                code,
                stderr,
            } => Self::ExternalCommandFailed {
                command: command.clone(),
                code: *code,
                stderr: stderr.clone(),
            },
            Self::ValidationFailed {
                file,
                reason,
            } => Self::ValidationFailed {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::UnknownComponentType {
                ctype,
            } => Self::UnknownComponentType {
                ctype: ctype.clone(),
            },
            Self::UnknownMacroPackage {
                name,
            } => Self::UnknownMacroPackage {
                name: name.clone(),
            },
            Self::ConfigError {
                file,
                reason,
            } => Self::ConfigError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::ProjectNotFound {
                path,
            } => Self::ProjectNotFound {
                path: path.clone(),
            },
            // io::Error is not Clone; keep the kind and message
            Self::IoError(e) => Self::IoError(std::io::Error::new(e.kind(), e.to_string())),
            Self::TomlEditError(e) => Self::Other {
                message: format!("TOML parsing error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

impl RapumaError {
    /// Whether this error is the non-fatal shared-component refusal.
    #[must_use]
    pub const fn is_shared_conflict(&self) -> bool {
        matches!(self, Self::SharedComponent { .. })
    }
}

/// An error bundled with a user-facing suggestion and optional details.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: RapumaError,
    /// Optional suggestion for how to resolve the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: RapumaError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colour formatting.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Find the first [`RapumaError`] anywhere in an error chain.
#[must_use]
pub fn find_rapuma_error(error: &anyhow::Error) -> Option<&RapumaError> {
    error
        .downcast_ref::<RapumaError>()
        .or_else(|| error.chain().find_map(|cause| cause.downcast_ref::<RapumaError>()))
}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// Known [`RapumaError`] variants get a tailored suggestion. Plain IO errors
/// are classified by kind. Everything else keeps its full "Caused by" chain so
/// no diagnostic information is lost.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(ctx) = error.downcast_ref::<ErrorContext>() {
        return ErrorContext {
            error: ctx.error.clone(),
            suggestion: ctx.suggestion.clone(),
            details: ctx.details.clone(),
        };
    }

    if let Some(rapuma_error) = find_rapuma_error(&error) {
        let mut ctx = create_error_context(rapuma_error.clone());
        if ctx.details.is_none() {
            let outer = error.to_string();
            if outer != rapuma_error.to_string() {
                ctx = ctx.with_details(outer);
            }
        }
        return ctx;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(RapumaError::IoError(std::io::Error::new(
                    io_error.kind(),
                    io_error.to_string(),
                )))
                .with_suggestion(
                    "Check file ownership. Backups (.cv1) and source copies (.source) are read-only on purpose",
                );
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(RapumaError::IoError(std::io::Error::new(
                    io_error.kind(),
                    io_error.to_string(),
                )))
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(RapumaError::Other {
        message,
    })
}

fn create_error_context(error: RapumaError) -> ErrorContext {
    match &error {
        RapumaError::GroupExists {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use --force to reinstall the group from its source"),
        RapumaError::GroupNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run 'rapuma group list' to see the configured groups"),
        RapumaError::GroupLocked {
            gid,
        } => {
            let suggestion = format!(
                "Unlock it with 'rapuma group unlock {gid}' or repeat the command with --force"
            );
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("Locks are advisory; they guard against accidental changes, not concurrent processes")
        }
        RapumaError::InvalidComponentId {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Component ids are canonical book codes such as 'gen' or 'mat'"),
        RapumaError::SharedComponent {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Remove the component from the other group first"),
        RapumaError::MissingRequiredSource {
            ..
        }
        | RapumaError::MissingRequiredArtifact {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Check that the macro package and default stylesheet were installed under RAPUMA_BASE",
        ),
        RapumaError::RenderOutputMissing {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Inspect the renderer log file next to the control file"),
        RapumaError::ExternalToolNotFound {
            tool,
        } => {
            let suggestion =
                format!("Install '{tool}' or point the matching command in rapuma.toml at it");
            ErrorContext::new(error).with_suggestion(suggestion)
        }
        RapumaError::ValidationFailed {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Fix the source markup, or set validateSourceMarkup = false for the group",
        ),
        RapumaError::ProjectNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Create one with 'rapuma project init' or pass --project-home"),
        _ => ErrorContext::new(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_display() {
        let error = RapumaError::GroupLocked {
            gid: "g1".to_string(),
        };
        assert_eq!(error.to_string(), "Group 'g1' is locked");

        let error = RapumaError::SharedComponent {
            gid: "g1".to_string(),
            cid: "gen".to_string(),
            other_gid: "g2".to_string(),
        };
        assert!(error.to_string().contains("shared with group 'g2'"));
        assert!(error.is_shared_conflict());
    }

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext::new(RapumaError::GroupNotFound {
            gid: "nt".to_string(),
        })
        .with_suggestion("list groups")
        .with_details("no entry");

        let text = ctx.to_string();
        assert!(text.contains("Group 'nt' not found"));
        assert!(text.contains("Details: no entry"));
        assert!(text.contains("Suggestion: list groups"));
    }

    #[test]
    fn test_user_friendly_error_finds_wrapped_variant() {
        let err: anyhow::Result<()> = Err(RapumaError::GroupNotFound {
            gid: "g1".to_string(),
        })
        .context("Failed to update group g1");

        let ctx = user_friendly_error(err.unwrap_err());
        assert!(matches!(ctx.error, RapumaError::GroupNotFound { .. }));
        assert!(ctx.suggestion.unwrap().contains("group list"));
        assert_eq!(ctx.details.as_deref(), Some("Failed to update group g1"));
    }

    #[test]
    fn test_user_friendly_error_generic_chain() {
        let err = anyhow::anyhow!("root cause").context("outer");
        let ctx = user_friendly_error(err);
        match ctx.error {
            RapumaError::Other {
                message,
            } => {
                assert!(message.contains("outer"));
                assert!(message.contains("Caused by:"));
                assert!(message.contains("root cause"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_clone_io() {
        let error = RapumaError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        let cloned = error.clone();
        assert!(cloned.to_string().contains("gone"));
    }
}
