//! Markdown file discovery and on-demand reads.

use crate::docs::{CheckOutcome, SkippedFile};
use crate::runtime::error::{QaError, QaResult};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One markdown file as it was on disk when a check read it.
#[derive(Clone, Debug)]
pub struct Document {
    pub path: PathBuf,
    /// Path relative to the content root, `/`-separated.
    pub rel_path: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("not valid UTF-8")]
    NotUtf8,
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// The set of markdown files under a content root.
///
/// Discovery happens once; file contents are never cached, so every check sees the current
/// state of the disk.
#[derive(Clone, Debug)]
pub struct Corpus {
    root: PathBuf,
    files: Vec<PathBuf>,
}

impl Corpus {
    /// Enumerate every `*.md` file under `root`, sorted by path.
    ///
    /// Symlinked files are included; symlinked directories are not walked.
    ///
    /// Unreadable subdirectories are logged and skipped. A root that is not a directory is a
    /// configuration error.
    pub fn discover(root: &Path) -> QaResult<Self> {
        if !root.is_dir() {
            return Err(QaError::config("content root is not a directory")
                .with_operation("discover markdown files")
                .with_path(root)
                .with_hint("pass `--root <DIR>` pointing at the notes directory"));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("skipping unreadable directory entry: {err}");
                    continue;
                }
            };
            // `Path::is_file` follows symlinks, so linked notes count; linked directories are
            // not descended into.
            if entry.path().is_file() && is_markdown(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        debug!(root = %root.display(), count = files.len(), "discovered markdown files");

        Ok(Self {
            root: root.to_path_buf(),
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Read one file as UTF-8 text.
    pub fn read(&self, path: &Path) -> Result<Document, ReadError> {
        let bytes = fs::read(path)?;
        let text = String::from_utf8(bytes).map_err(|_| ReadError::NotUtf8)?;
        Ok(Document {
            path: path.to_path_buf(),
            rel_path: self.rel_path(path),
            text,
        })
    }

    /// Read a file for `outcome`'s check, recording it as skipped when unreadable.
    pub fn read_or_skip(&self, path: &Path, outcome: &mut CheckOutcome) -> Option<Document> {
        match self.read(path) {
            Ok(doc) => Some(doc),
            Err(err) => {
                let rel = self.rel_path(path);
                warn!(check = %outcome.check, path = %rel, "skipping unreadable file: {err}");
                outcome.skipped.push(SkippedFile {
                    path: rel,
                    reason: err.to_string(),
                });
                None
            }
        }
    }

    /// Base names (file name without extension) of every discovered file.
    pub fn stems(&self) -> HashSet<String> {
        self.files
            .iter()
            .filter_map(|path| path.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .collect()
    }

    pub fn rel_path(&self, path: &Path) -> String {
        rel_posix(&self.root, path)
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md")
}

fn rel_posix(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            Component::CurDir => Some(".".to_string()),
            Component::ParentDir => Some("..".to_string()),
            Component::RootDir | Component::Prefix(_) => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::CheckKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn discover_collects_nested_markdown_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("protocols/pbft")).expect("mkdir");
        fs::write(root.join("index.md"), "# Index").expect("write");
        fs::write(root.join("protocols/pbft/view-change.md"), "x").expect("write");
        fs::write(root.join("protocols/notes.txt"), "x").expect("write");

        let corpus = Corpus::discover(root).expect("discover");
        let rels: Vec<String> = corpus.files().iter().map(|p| corpus.rel_path(p)).collect();
        assert_eq!(rels, vec!["index.md", "protocols/pbft/view-change.md"]);
        assert!(corpus.stems().contains("view-change"));
    }

    #[cfg(unix)]
    #[test]
    fn discover_includes_symlinked_notes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let shared = tempfile::tempdir().expect("tempdir");
        fs::write(shared.path().join("quorum.md"), "# Quorum").expect("write");
        fs::write(dir.path().join("index.md"), "# Index").expect("write");
        std::os::unix::fs::symlink(shared.path().join("quorum.md"), dir.path().join("quorum.md"))
            .expect("symlink");

        let corpus = Corpus::discover(dir.path()).expect("discover");
        let rels: Vec<String> = corpus.files().iter().map(|p| corpus.rel_path(p)).collect();
        assert_eq!(rels, vec!["index.md", "quorum.md"]);
        let doc = corpus
            .read(&dir.path().join("quorum.md"))
            .expect("read through link");
        assert_eq!(doc.text, "# Quorum");
    }

    #[test]
    fn discover_rejects_missing_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Corpus::discover(&dir.path().join("absent")).expect_err("missing root");
        assert!(err.to_string().contains("content root is not a directory"));
    }

    #[test]
    fn read_or_skip_records_non_utf8_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("binary.md");
        fs::write(&path, [0xff, 0xfe, 0x00, b'$']).expect("write");

        let corpus = Corpus::discover(dir.path()).expect("discover");
        let mut outcome = CheckOutcome::new(CheckKind::Math);
        assert!(corpus.read_or_skip(&path, &mut outcome).is_none());
        assert_eq!(
            outcome.skipped,
            vec![SkippedFile {
                path: "binary.md".into(),
                reason: "not valid UTF-8".into(),
            }]
        );
        assert!(outcome.issues.is_empty());
    }
}
