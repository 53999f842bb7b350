//! # golden-record
//!
//! File-backed golden output testing. A test records plain text lines while it
//! runs; the recording is compared byte-for-byte with a checked-in reference
//! file and the test fails on any difference, including a missing reference.
//! A clean run leaves nothing behind. A failing run keeps the recording as a
//! `.new` file next to the reference for review and promotion.
//!
//! See [`golden_suite!`] for declaring tests and [`Suite`] for the wrapper
//! they run through.

pub use crate::config::{ReviewConfig, SuiteConfig, DEFAULT_RESULTS_DIR};
pub use crate::errors::{BodyError, GoldenError};
pub use crate::identity::{ArtifactPaths, SourceLocation, SuiteIdentity, TestIdentity};
pub use crate::recorder::Recorder;
pub use crate::suite::{assert_golden, HijackedTest, Phase, Suite, TestFn, TEST_PREFIX};

pub mod compare;
pub mod config;
pub mod errors;
pub mod identity;
mod macros;
pub mod recorder;
pub mod review;
pub mod suite;
