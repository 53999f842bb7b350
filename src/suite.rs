//! # Golden Suite
//!
//! A [`Suite`] wraps test bodies in the record-compare-cleanup protocol:
//!
//! 1. **Prepare**: derive the artifact pair, create the results directory and
//!    remove any stale scratch file.
//! 2. **Record**: open the scratch file and hand a [`Recorder`] to the body.
//! 3. **Close**: flush and release the scratch file, even when the body
//!    panics or fails.
//! 4. **Compare**: require the reference file and byte-identical contents.
//! 5. **Clean**: delete the scratch file. Any failure before this point
//!    leaves it behind for inspection.
//!
//! ```rust,no_run
//! use golden_record::Suite;
//!
//! let suite = Suite::new("render", "Greeter", "tests/test_results").unwrap();
//! suite
//!     .run("hello", |rec| rec.output("hello"))
//!     .unwrap();
//! ```

use std::fmt;
use std::fs;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, warn};

use crate::compare::files_identical;
use crate::config::SuiteConfig;
use crate::errors::BodyError;
use crate::identity::{ArtifactPaths, SourceLocation, SuiteIdentity, TestIdentity};
use crate::recorder::{Echo, EchoTarget, Recorder};
use crate::GoldenError;

/// Prefix a method name needs to be picked up by [`Suite::hijack_all`].
pub const TEST_PREFIX: &str = "test";

/// Signature of a registered test method.
pub type TestFn = fn(&mut Recorder<'_>);

// =============================================================================
// PHASES
// =============================================================================

/// Lifecycle of a single wrapped invocation.
///
/// `Idle → ScratchOpen → ScratchClosed → {ReferenceMissing | Mismatch | Match → Cleaned}`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ScratchOpen,
    ScratchClosed,
    ReferenceMissing,
    Mismatch,
    Match,
    Cleaned,
}

impl Phase {
    fn is_terminal(self) -> bool {
        matches!(
            self,
            Phase::ReferenceMissing | Phase::Mismatch | Phase::Cleaned
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "IDLE",
            Phase::ScratchOpen => "SCRATCH_OPEN",
            Phase::ScratchClosed => "SCRATCH_CLOSED",
            Phase::ReferenceMissing => "REFERENCE_MISSING",
            Phase::Mismatch => "MISMATCH",
            Phase::Match => "MATCH",
            Phase::Cleaned => "CLEANED",
        };
        f.write_str(name)
    }
}

fn transition(id: &TestIdentity, from: Phase, to: Phase) -> Phase {
    debug_assert!(!from.is_terminal(), "{}: no transition out of {}", id, from);
    if to.is_terminal() {
        debug!("{}: {} -> {} (done)", id, from, to);
    } else {
        debug!("{}: {} -> {}", id, from, to);
    }
    to
}

// =============================================================================
// SUITE
// =============================================================================

/// A group of golden tests sharing one `(module, class)` identity and one
/// results directory.
#[derive(Debug)]
pub struct Suite {
    identity: SuiteIdentity,
    output_dir: PathBuf,
    echo: Echo,
}

impl Suite {
    /// Builds a suite from an explicit identity and results directory.
    pub fn new(
        module: impl Into<String>,
        class: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, GoldenError> {
        Ok(Self {
            identity: SuiteIdentity::new(module, class)?,
            output_dir: output_dir.into(),
            echo: Echo::off(),
        })
    }

    /// Builds a suite for the source file at `location`.
    ///
    /// The module is the file stem, and results live in `config.results_dir`
    /// next to the source file.
    pub fn locate(
        location: &SourceLocation,
        class: impl Into<String>,
        config: &SuiteConfig,
    ) -> Result<Self, GoldenError> {
        let source = location.resolve()?;
        let identity = SuiteIdentity::from_source(&source, class)?;
        let parent = source.parent().ok_or_else(|| {
            GoldenError::identity(source.display().to_string(), "source file has no parent")
        })?;
        let output_dir = parent.join(&config.results_dir);
        debug!(
            "suite {}.{} resolved to {}",
            identity.module(),
            identity.class(),
            output_dir.display()
        );
        Ok(Self {
            identity,
            output_dir,
            echo: Echo::off(),
        }
        .echo(config.echo))
    }

    /// Turns echo of recorded lines on or off. The echo target set by
    /// [`Suite::echo_to`] is kept; otherwise lines go to standard output.
    pub fn echo(mut self, enabled: bool) -> Self {
        self.echo.enabled = enabled;
        self
    }

    /// Enables echo and sends it to `writer` instead of standard output.
    pub fn echo_to<W: Write + Send + 'static>(mut self, writer: W) -> Self {
        self.echo = Echo {
            enabled: true,
            target: EchoTarget::Writer(Mutex::new(Box::new(writer))),
        };
        self
    }

    pub fn is_echoing(&self) -> bool {
        self.echo.enabled
    }

    pub fn identity(&self) -> &SuiteIdentity {
        &self.identity
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Reference and scratch paths for `method`.
    pub fn artifacts(&self, method: &str) -> Result<ArtifactPaths, GoldenError> {
        Ok(self.identity.method(method)?.artifacts(&self.output_dir))
    }

    // -------------------------------------------------------------------------
    // Interception
    // -------------------------------------------------------------------------

    /// Wraps `body` into a zero-argument callable running the full protocol.
    pub fn hijack<'s, F, T>(
        &'s self,
        method: impl Into<String>,
        body: F,
    ) -> impl FnOnce() -> Result<T, GoldenError> + 's
    where
        F: FnOnce(&mut Recorder<'_>) -> T + 's,
        T: 's,
    {
        let method = method.into();
        move || self.invoke(&method, |rec| Ok(body(rec)))
    }

    /// Runs `body` as the test method `method`. The body's return value is
    /// passed through on success.
    pub fn run<F, T>(&self, method: &str, body: F) -> Result<T, GoldenError>
    where
        F: FnOnce(&mut Recorder<'_>) -> T,
    {
        self.invoke(method, |rec| Ok(body(rec)))
    }

    /// Like [`Suite::run`] for bodies that can fail. A body error skips the
    /// comparison, keeps the scratch file and comes back as
    /// [`GoldenError::Body`].
    pub fn try_run<F, T, E>(&self, method: &str, body: F) -> Result<T, GoldenError>
    where
        F: FnOnce(&mut Recorder<'_>) -> Result<T, E>,
        E: Into<BodyError>,
    {
        self.invoke(method, |rec| body(rec).map_err(Into::into))
    }

    /// Registers test methods, keeping those whose name starts with
    /// [`TEST_PREFIX`]. Order is preserved.
    pub fn hijack_all<'s, I>(&'s self, methods: I) -> Vec<HijackedTest<'s>>
    where
        I: IntoIterator<Item = (&'static str, TestFn)>,
    {
        methods
            .into_iter()
            .filter(|(name, _)| {
                let keep = name.starts_with(TEST_PREFIX);
                if !keep {
                    debug!("skipping '{}': no '{}' prefix", name, TEST_PREFIX);
                }
                keep
            })
            .map(|(name, body)| HijackedTest {
                suite: self,
                name,
                body,
            })
            .collect()
    }

    fn invoke<F, T>(&self, method: &str, body: F) -> Result<T, GoldenError>
    where
        F: FnOnce(&mut Recorder<'_>) -> Result<T, BodyError>,
    {
        let id = self.identity.method(method)?;
        let paths = id.artifacts(&self.output_dir);
        let mut phase = Phase::Idle;
        debug!("{}: reference {}", id, paths.reference.display());

        self.prepare(&paths)?;
        let mut recorder =
            Recorder::create(&paths.scratch, &self.echo).map_err(|source| {
                GoldenError::ScratchCreate {
                    path: paths.scratch.clone(),
                    source,
                }
            })?;
        phase = transition(&id, phase, Phase::ScratchOpen);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| body(&mut recorder)));
        let closed = recorder.close();
        phase = transition(&id, phase, Phase::ScratchClosed);

        let value = match outcome {
            Err(payload) => {
                if let Err(e) = closed {
                    warn!("{}: {}", id, e);
                }
                warn!("{}: body panicked, keeping {}", id, paths.scratch.display());
                panic::resume_unwind(payload)
            }
            Ok(Err(source)) => {
                if let Err(e) = closed {
                    warn!("{}: {}", id, e);
                }
                warn!("{}: body failed, keeping {}", id, paths.scratch.display());
                return Err(GoldenError::Body {
                    scratch: paths.scratch,
                    source,
                });
            }
            Ok(Ok(value)) => {
                closed?;
                value
            }
        };

        self.verify(&id, &paths, phase)?;
        Ok(value)
    }

    /// Creates the results directory and clears a stale scratch file.
    fn prepare(&self, paths: &ArtifactPaths) -> Result<(), GoldenError> {
        if let Err(e) = fs::create_dir_all(&self.output_dir) {
            warn!(
                "could not create results directory {}: {}",
                self.output_dir.display(),
                e
            );
        }
        let mut removal = None;
        if paths.scratch.exists() {
            debug!("removing stale {}", paths.scratch.display());
            removal = fs::remove_file(&paths.scratch).err();
        }
        if paths.scratch.exists() {
            return Err(GoldenError::ScratchNotCleared {
                path: paths.scratch.clone(),
                source: removal,
            });
        }
        Ok(())
    }

    /// Checks the closed scratch file against the reference.
    fn verify(
        &self,
        id: &TestIdentity,
        paths: &ArtifactPaths,
        phase: Phase,
    ) -> Result<(), GoldenError> {
        if !paths.scratch.is_file() {
            return Err(GoldenError::ScratchMissing {
                path: paths.scratch.clone(),
            });
        }
        if !paths.reference.is_file() {
            transition(id, phase, Phase::ReferenceMissing);
            warn!("{}: no reference, keeping {}", id, paths.scratch.display());
            return Err(GoldenError::ReferenceMissing {
                reference: paths.reference.clone(),
                scratch: paths.scratch.clone(),
            });
        }
        if !files_identical(&paths.reference, &paths.scratch)? {
            transition(id, phase, Phase::Mismatch);
            warn!("{}: output changed, keeping {}", id, paths.scratch.display());
            return Err(GoldenError::Mismatch {
                reference: paths.reference.clone(),
                scratch: paths.scratch.clone(),
            });
        }
        let phase = transition(id, phase, Phase::Match);
        fs::remove_file(&paths.scratch).map_err(|source| GoldenError::Cleanup {
            path: paths.scratch.clone(),
            source,
        })?;
        transition(id, phase, Phase::Cleaned);
        Ok(())
    }
}

/// A registered test method bound to its suite.
pub struct HijackedTest<'s> {
    suite: &'s Suite,
    name: &'static str,
    body: TestFn,
}

impl HijackedTest<'_> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn call(&self) -> Result<(), GoldenError> {
        self.suite.run(self.name, self.body)
    }
}

impl fmt::Debug for HijackedTest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HijackedTest")
            .field("name", &self.name)
            .finish()
    }
}

/// Unwraps a golden result, panicking with a rendered diagnostic on failure.
#[track_caller]
pub fn assert_golden<T>(result: Result<T, GoldenError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("{:?}", miette::Report::new(err)),
    }
}
