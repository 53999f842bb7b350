//! Golden Record Error Handling
//!
//! Every failure a wrapped test can hit is a [`GoldenError`]. Each variant names
//! the file(s) involved so that a failing test points straight at the artifact
//! to inspect. Diagnostic codes and help text are surfaced through `miette`.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Boxed error returned by a fallible test body.
pub type BodyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for suite construction, recording, comparison and review.
#[derive(Debug, Error, Diagnostic)]
pub enum GoldenError {
    // ------------------------------------------------------------------
    // Setup failures
    // ------------------------------------------------------------------
    #[error("cannot resolve test identity: {reason} ({subject})")]
    #[diagnostic(
        code(golden::identity),
        help("declare the suite with a stable source file and plain identifier names")
    )]
    Identity { subject: String, reason: String },

    #[error("could not delete stale scratch file '{}'", .path.display())]
    #[diagnostic(
        code(golden::scratch_not_cleared),
        help("check the permissions of the results directory")
    )]
    ScratchNotCleared {
        path: PathBuf,
        #[source]
        source: Option<io::Error>,
    },

    #[error("could not create scratch file '{}'", .path.display())]
    #[diagnostic(code(golden::scratch_create))]
    ScratchCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed writing recorded output to '{}'", .path.display())]
    #[diagnostic(code(golden::write))]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not generate scratch file '{}'", .path.display())]
    #[diagnostic(code(golden::scratch_missing))]
    ScratchMissing { path: PathBuf },

    // ------------------------------------------------------------------
    // Comparison failures
    // ------------------------------------------------------------------
    #[error(
        "could not find reference file '{}' (recorded output kept in '{}')",
        .reference.display(),
        .scratch.display()
    )]
    #[diagnostic(
        code(golden::reference_missing),
        help("no baseline recorded yet: review the scratch file and promote it to the reference path")
    )]
    ReferenceMissing { reference: PathBuf, scratch: PathBuf },

    #[error("files differ:\n  {}\n  {}", .reference.display(), .scratch.display())]
    #[diagnostic(
        code(golden::mismatch),
        help("recorded output changed: diff the two files and promote the scratch file if the change is intended")
    )]
    Mismatch { reference: PathBuf, scratch: PathBuf },

    #[error("could not read '{}' for comparison", .path.display())]
    #[diagnostic(code(golden::compare))]
    Compare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not delete scratch file '{}' after a clean run", .path.display())]
    #[diagnostic(code(golden::cleanup))]
    Cleanup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // ------------------------------------------------------------------
    // Body, configuration and review failures
    // ------------------------------------------------------------------
    #[error("test body failed; partial output kept in '{}'", .scratch.display())]
    #[diagnostic(code(golden::body))]
    Body {
        scratch: PathBuf,
        #[source]
        source: BodyError,
    },

    #[error("invalid golden configuration in {origin}: {message}")]
    #[diagnostic(code(golden::config))]
    Config { origin: String, message: String },

    #[error("could not promote '{}' to '{}'", .scratch.display(), .reference.display())]
    #[diagnostic(code(golden::promote))]
    Promote {
        scratch: PathBuf,
        reference: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not read '{}' for review", .path.display())]
    #[diagnostic(code(golden::review))]
    Review {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed writing review output")]
    #[diagnostic(code(golden::render))]
    Render {
        #[source]
        source: io::Error,
    },
}

impl GoldenError {
    /// Builds an identity error for an offending value.
    pub(crate) fn identity(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        GoldenError::Identity {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// True for failures that leave a scratch file behind for inspection.
    pub fn retains_scratch(&self) -> bool {
        matches!(
            self,
            GoldenError::Write { .. }
                | GoldenError::ReferenceMissing { .. }
                | GoldenError::Mismatch { .. }
                | GoldenError::Compare { .. }
                | GoldenError::Cleanup { .. }
                | GoldenError::Body { .. }
        )
    }
}
