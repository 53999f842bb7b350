//! # Test Identity and Artifact Naming
//!
//! A golden test is identified by `(module, class, method)`. The module is the
//! file stem of the source file that declares the suite, the class is the
//! suite name, and the method is the test function name. The dotted triple is
//! the basename of both artifacts:
//!
//! ```text
//! {output_dir}/{module}.{class}.{method}.txt   reference, checked in
//! {output_dir}/{module}.{class}.{method}.new   scratch, current run
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use crate::GoldenError;

/// Extension of the checked-in reference file.
pub const REFERENCE_EXT: &str = "txt";
/// Extension of the scratch file produced by the current run.
pub const SCRATCH_EXT: &str = "new";

// =============================================================================
// SOURCE LOCATION
// =============================================================================

/// Where a suite is declared, as seen by the compiler.
///
/// `file` is the value of `file!()` at the declaration site. Cargo passes it
/// relative to the workspace root, which is either the manifest directory or
/// one of its ancestors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub manifest_dir: PathBuf,
    pub file: PathBuf,
}

impl SourceLocation {
    pub fn new(manifest_dir: impl Into<PathBuf>, file: impl Into<PathBuf>) -> Self {
        Self {
            manifest_dir: manifest_dir.into(),
            file: file.into(),
        }
    }

    /// Resolves the absolute path of the declaring source file.
    pub fn resolve(&self) -> Result<PathBuf, GoldenError> {
        if self.file.is_absolute() {
            return if self.file.is_file() {
                Ok(self.file.clone())
            } else {
                Err(GoldenError::identity(
                    self.file.display().to_string(),
                    "source file does not exist",
                ))
            };
        }
        self.manifest_dir
            .ancestors()
            .map(|base| base.join(&self.file))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| {
                GoldenError::identity(
                    self.file.display().to_string(),
                    format!(
                        "source file not found under '{}' or any parent directory",
                        self.manifest_dir.display()
                    ),
                )
            })
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// The `(module, class)` part of a test identity, fixed for a suite's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SuiteIdentity {
    module: String,
    class: String,
}

impl SuiteIdentity {
    pub fn new(module: impl Into<String>, class: impl Into<String>) -> Result<Self, GoldenError> {
        let module = module.into();
        let class = class.into();
        check_component("module", &module, true)?;
        check_component("class", &class, false)?;
        Ok(Self { module, class })
    }

    /// Derives the module from the file stem of a resolved source path.
    pub fn from_source(source: &Path, class: impl Into<String>) -> Result<Self, GoldenError> {
        let module = source
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| {
                GoldenError::identity(source.display().to_string(), "source path has no file stem")
            })?;
        Self::new(module, class)
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    /// Completes the identity with a method name.
    pub fn method(&self, method: impl Into<String>) -> Result<TestIdentity, GoldenError> {
        let method = method.into();
        check_component("method", &method, false)?;
        Ok(TestIdentity {
            suite: self.clone(),
            method,
        })
    }
}

/// A full `(module, class, method)` identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TestIdentity {
    suite: SuiteIdentity,
    method: String,
}

impl TestIdentity {
    pub fn suite(&self) -> &SuiteIdentity {
        &self.suite
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// `{module}.{class}.{method}`
    pub fn basename(&self) -> String {
        self.to_string()
    }

    pub fn artifacts(&self, output_dir: &Path) -> ArtifactPaths {
        let basename = self.basename();
        ArtifactPaths {
            reference: output_dir.join(format!("{basename}.{REFERENCE_EXT}")),
            scratch: output_dir.join(format!("{basename}.{SCRATCH_EXT}")),
        }
    }
}

impl fmt::Display for TestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.suite.module, self.suite.class, self.method)
    }
}

/// Validates one identity component.
///
/// Class and method may not contain dots, which keeps the dotted basename
/// unambiguous even when the module stem contains one.
fn check_component(kind: &str, value: &str, allow_dots: bool) -> Result<(), GoldenError> {
    if value.trim().is_empty() {
        return Err(GoldenError::identity(kind, "name is empty"));
    }
    if value.contains(['/', '\\']) {
        return Err(GoldenError::identity(
            value,
            format!("{kind} name contains a path separator"),
        ));
    }
    if !allow_dots && value.contains('.') {
        return Err(GoldenError::identity(
            value,
            format!("{kind} name contains '.'"),
        ));
    }
    Ok(())
}

// =============================================================================
// ARTIFACTS
// =============================================================================

/// Reference and scratch paths of one test method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub reference: PathBuf,
    pub scratch: PathBuf,
}

impl ArtifactPaths {
    /// Maps a scratch path back to its pair, if it has the scratch extension.
    pub fn from_scratch(scratch: &Path) -> Option<Self> {
        if scratch.extension()? != SCRATCH_EXT {
            return None;
        }
        Some(Self {
            reference: scratch.with_extension(REFERENCE_EXT),
            scratch: scratch.to_path_buf(),
        })
    }
}
