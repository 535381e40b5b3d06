//! Scratch directory for tests that read and write files.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::TempDir;

/// A temporary directory removed when dropped.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file inside the workspace (the file need not exist).
    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a JSON value to `name` and return its path.
    pub fn write_json(&self, name: &str, value: &Value) -> PathBuf {
        let path = self.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(&path, serde_json::to_vec_pretty(value).expect("serialize json"))
            .expect("failed to write json");
        path
    }

    /// Write raw text to `name` and return its path.
    pub fn write_text(&self, name: &str, text: &str) -> PathBuf {
        let path = self.join(name);
        fs::write(&path, text).expect("failed to write text");
        path
    }

    /// Read and parse a JSON file relative to the workspace.
    pub fn read_json(&self, name: &str) -> Value {
        let bytes = fs::read(self.join(name)).expect("failed to read json");
        serde_json::from_slice(&bytes).expect("invalid json")
    }

    /// Names of the files directly inside `dir` (relative to the workspace), sorted.
    pub fn list(&self, dir: &str) -> Vec<String> {
        let mut names: Vec<String> = match fs::read_dir(self.join(dir)) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
