//! # Shared Helpers for Golden Integration Tests
//!
//! Scratch suites rooted in a temporary directory, a clonable in-memory echo
//! sink, and logger setup.

#![allow(dead_code)]

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use golden_record::Suite;
use tempfile::TempDir;

/// Routes `log` output through the test harness capture.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A suite whose results directory lives in a fresh temporary directory.
pub struct Sandbox {
    pub dir: TempDir,
    pub suite: Suite,
}

impl Sandbox {
    pub fn new(class: &str) -> Self {
        init_logging();
        let dir = tempfile::tempdir().expect("temp dir");
        let suite = Suite::new("sandbox", class, dir.path().join("test_results"))
            .expect("valid identity");
        Self { dir, suite }
    }

    pub fn configure(self, f: impl FnOnce(Suite) -> Suite) -> Self {
        Self {
            dir: self.dir,
            suite: f(self.suite),
        }
    }

    pub fn results(&self) -> PathBuf {
        self.suite.output_dir().to_path_buf()
    }

    pub fn reference(&self, method: &str) -> PathBuf {
        self.suite.artifacts(method).expect("valid method").reference
    }

    pub fn scratch(&self, method: &str) -> PathBuf {
        self.suite.artifacts(method).expect("valid method").scratch
    }

    pub fn accept(&self, method: &str, content: &str) {
        let reference = self.reference(method);
        fs::create_dir_all(reference.parent().expect("results dir")).expect("create results");
        fs::write(reference, content).expect("write reference");
    }

    /// Every file currently in the results directory, sorted.
    pub fn listing(&self) -> Vec<String> {
        list_dir(&self.results())
    }
}

pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

/// In-memory writer that can be handed to `Suite::echo_to` and read back.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().expect("echo buffer").clone()).expect("utf8 echo")
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("echo buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
