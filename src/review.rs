//! Review of retained scratch files.
//!
//! A failing golden test leaves `{basename}.new` next to its reference. This
//! module finds those files, shows how they differ from the reference and
//! promotes a scratch file once a human has accepted it.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use difference::{Changeset, Difference};
use log::info;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use walkdir::WalkDir;

use crate::config::ReviewConfig;
use crate::identity::ArtifactPaths;
use crate::GoldenError;

/// A scratch file left behind by a failing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingArtifact {
    pub paths: ArtifactPaths,
}

impl PendingArtifact {
    pub fn scratch(&self) -> &Path {
        &self.paths.scratch
    }

    pub fn reference(&self) -> &Path {
        &self.paths.reference
    }

    /// True when a reference exists, i.e. the scratch file records a change
    /// rather than a first run.
    pub fn has_reference(&self) -> bool {
        self.paths.reference.is_file()
    }

    /// Line diff from reference to scratch. A missing reference diffs as empty.
    pub fn changes(&self) -> Result<Vec<Difference>, GoldenError> {
        let expected = if self.has_reference() {
            read(&self.paths.reference)?
        } else {
            String::new()
        };
        let actual = read(&self.paths.scratch)?;
        Ok(Changeset::new(&expected, &actual, "\n").diffs)
    }

    /// Renames the scratch file over the reference.
    pub fn promote(&self) -> Result<(), GoldenError> {
        fs::rename(&self.paths.scratch, &self.paths.reference).map_err(|source| {
            GoldenError::Promote {
                scratch: self.paths.scratch.clone(),
                reference: self.paths.reference.clone(),
                source,
            }
        })?;
        info!(
            "promoted {} -> {}",
            self.paths.scratch.display(),
            self.paths.reference.display()
        );
        Ok(())
    }
}

fn read(path: &Path) -> Result<String, GoldenError> {
    fs::read_to_string(path).map_err(|source| GoldenError::Review {
        path: path.to_path_buf(),
        source,
    })
}

// =============================================================================
// DISCOVERY
// =============================================================================

/// Finds scratch files inside directories named `results_dir` under `root`,
/// sorted by path.
pub fn pending_artifacts<P: AsRef<Path>>(root: P, results_dir: &str) -> Vec<PendingArtifact> {
    let mut found: Vec<PendingArtifact> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_type().is_file()
                && e.path()
                    .parent()
                    .and_then(|p| p.file_name())
                    .map(|name| name == results_dir)
                    .unwrap_or(false)
        })
        .filter_map(|e| ArtifactPaths::from_scratch(e.path()))
        .map(|paths| PendingArtifact { paths })
        .collect();
    found.sort_by(|a, b| a.paths.scratch.cmp(&b.paths.scratch));
    found
}

// =============================================================================
// RENDERING
// =============================================================================

/// Writes every pending artifact with a line diff against its reference.
pub fn render_pending<W: WriteColor>(
    out: &mut W,
    pending: &[PendingArtifact],
) -> Result<(), GoldenError> {
    for artifact in pending {
        let diffs = artifact.changes()?;
        render_one(out, artifact, &diffs).map_err(|source| GoldenError::Render { source })?;
    }
    Ok(())
}

fn render_one<W: WriteColor>(
    out: &mut W,
    artifact: &PendingArtifact,
    diffs: &[Difference],
) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
    let status = if artifact.has_reference() { "CHANGED" } else { "NEW" };
    writeln!(out, "{}: {}", status, artifact.paths.scratch.display())?;
    out.reset()?;
    writeln!(out, "  reference: {}", artifact.paths.reference.display())?;
    print_diff(out, diffs)?;
    writeln!(out)
}

fn print_diff<W: WriteColor>(out: &mut W, diffs: &[Difference]) -> io::Result<()> {
    for diff in diffs {
        match diff {
            Difference::Same(ref x) => {
                out.reset()?;
                for line in x.lines() {
                    writeln!(out, " {}", line)?;
                }
            }
            Difference::Add(ref x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                for line in x.lines() {
                    writeln!(out, "+{}", line)?;
                }
            }
            Difference::Rem(ref x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                for line in x.lines() {
                    writeln!(out, "-{}", line)?;
                }
            }
        }
    }
    out.reset()
}

/// Prints pending artifacts to stdout, colored according to `config`.
pub fn print_pending(pending: &[PendingArtifact], config: &ReviewConfig) -> Result<(), GoldenError> {
    let choice = if config.use_colors {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    render_pending(&mut stdout, pending)
}
