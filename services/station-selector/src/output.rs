//! Staged output files.
//!
//! Every output is first written to a temporary file inside the output
//! directory. Nothing appears under its final name until [`OutputSet::commit`];
//! dropping an uncommitted set removes the temporary files, and a commit that
//! fails part way removes the files it had already moved into place.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{info, warn};

pub struct OutputSet {
    dir: PathBuf,
    staged: Vec<(NamedTempFile, PathBuf)>,
}

impl OutputSet {
    /// Prepare an output set, creating `dir` if it does not exist.
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {:?}", dir))?;
        Ok(Self {
            dir,
            staged: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Write `value` as pretty JSON to a temporary file destined for `name`.
    pub fn stage_json<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<()> {
        let mut file = NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("Failed to create temporary file in {:?}", self.dir))?;
        serde_json::to_writer_pretty(&mut file, value)
            .with_context(|| format!("Failed to write {}", name))?;
        file.flush()?;
        self.staged.push((file, self.dir.join(name)));
        Ok(())
    }

    /// Move every staged file to its final name.
    ///
    /// Either all files are in place afterwards or none of them are.
    pub fn commit(self) -> Result<Vec<PathBuf>> {
        let mut written: Vec<PathBuf> = Vec::with_capacity(self.staged.len());
        for (file, path) in self.staged {
            if let Err(err) = file.persist(&path) {
                for done in &written {
                    if let Err(remove) = fs::remove_file(done) {
                        warn!(path = ?done, error = %remove, "Failed to roll back output");
                    }
                }
                return Err(err.error).with_context(|| format!("Failed to persist {:?}", path));
            }
            written.push(path);
        }
        info!(dir = ?self.dir, files = written.len(), "Wrote outputs");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn file_names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_commit_moves_files_into_place() {
        let tmp = tempfile::tempdir().unwrap();
        let mut outputs = OutputSet::create(tmp.path().join("out")).unwrap();
        outputs.stage_json("a.geojson", &json!({ "a": 1 })).unwrap();
        outputs.stage_json("b.json", &[1, 2]).unwrap();
        assert_eq!(outputs.len(), 2);

        let written = outputs.commit().unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(file_names(&tmp.path().join("out")), vec!["a.geojson", "b.json"]);

        let back: Value = serde_json::from_slice(&fs::read(&written[0]).unwrap()).unwrap();
        assert_eq!(back["a"], 1);
    }

    #[test]
    fn test_dropped_set_leaves_nothing_behind() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let mut outputs = OutputSet::create(tmp.path()).unwrap();
            outputs.stage_json("a.geojson", &json!({})).unwrap();
            assert!(!tmp.path().join("a.geojson").exists());
        }
        assert!(file_names(tmp.path()).is_empty());
    }

    #[test]
    fn test_failed_commit_rolls_back_earlier_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mut outputs = OutputSet::create(tmp.path()).unwrap();
        outputs.stage_json("a.geojson", &json!({ "a": 1 })).unwrap();
        outputs.stage_json("b.geojson", &json!({ "b": 2 })).unwrap();
        outputs.stage_json("c.json", &json!({ "c": 3 })).unwrap();

        // A non-empty directory in the way of the second file.
        fs::create_dir_all(tmp.path().join("b.geojson").join("keep")).unwrap();

        let err = outputs.commit().unwrap_err();
        assert!(format!("{:#}", err).contains("b.geojson"));
        assert!(!tmp.path().join("a.geojson").exists());
        assert!(!tmp.path().join("c.json").exists());
        assert_eq!(file_names(tmp.path()), vec!["b.geojson"]);
    }
}
