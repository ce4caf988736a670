use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from the note store.
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Note file error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl NoteError {
    /// User-friendly message, without the path or OS error detail.
    pub fn user_message(&self) -> &'static str {
        match self {
            NoteError::Io { .. } => "Could not access the notes file.",
        }
    }
}

/// Flat-file note store at a fixed path.
///
/// The file is created empty on first use; every operation ensures it
/// exists before touching it.
pub struct NoteStore {
    path: PathBuf,
}

impl NoteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> NoteError {
        NoteError::Io { path: self.path.clone(), source }
    }

    /// Create the file empty if it does not exist yet.
    fn ensure_file(&self) -> Result<(), NoteError> {
        if !self.path.exists() {
            std::fs::write(&self.path, "").map_err(|e| self.io_err(e))?;
            tracing::debug!("Created notes file at {}", self.path.display());
        }
        Ok(())
    }

    /// Append one note as a new line.
    pub fn append(&self, line: &str) -> Result<(), NoteError> {
        self.ensure_file()?;
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        writeln!(file, "{}", line).map_err(|e| self.io_err(e))?;
        tracing::debug!("Appended note to {}", self.path.display());
        Ok(())
    }

    /// Read the whole file.
    pub fn read_all(&self) -> Result<String, NoteError> {
        self.ensure_file()?;
        std::fs::read_to_string(&self.path).map_err(|e| self.io_err(e))
    }

    /// Read the most recent note, without its trailing newline.
    pub fn read_last(&self) -> Result<Option<String>, NoteError> {
        let content = self.read_all()?;
        Ok(content.lines().last().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn temp_store() -> (tempfile::TempDir, NoteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = NoteStore::new(dir.path().join("notes.txt"));
        (dir, store)
    }

    #[test]
    fn test_append_and_read_all() {
        let (_dir, store) = temp_store();

        store.append("a").unwrap();
        store.append("b").unwrap();

        assert_eq!(store.read_all().unwrap(), "a\nb\n");
    }

    #[test]
    fn test_read_last() {
        let (_dir, store) = temp_store();

        store.append("a").unwrap();
        store.append("b").unwrap();

        assert_eq!(store.read_last().unwrap(), Some("b".to_string()));
    }

    #[test]
    fn test_file_lazily_created_on_read() {
        let (_dir, store) = temp_store();

        assert!(!store.path().exists());
        assert_eq!(store.read_all().unwrap(), "");
        assert!(store.path().exists());
    }

    #[test]
    fn test_read_last_empty() {
        let (_dir, store) = temp_store();

        assert_eq!(store.read_last().unwrap(), None);
    }
}
