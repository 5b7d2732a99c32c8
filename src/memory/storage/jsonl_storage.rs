//! JSON-lines file storage for the memory log.
//!
//! One UTF-8 JSON object per line. The file is opened, appended to and
//! closed on every write; no handle is held between writes and no lock is
//! taken, so concurrent writers rely on the OS keeping small appends whole.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::memory::entry::MemoryEntry;
use crate::memory::storage::interface::MemoryLog;

/// Default file name inside a memory directory.
pub const MEMORY_FILE_NAME: &str = "memory.jsonl";

/// File-backed memory log.
#[derive(Debug, Clone)]
pub struct JsonlMemoryLog {
    path: PathBuf,
}

impl JsonlMemoryLog {
    /// Log stored at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log stored as `memory.jsonl` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(MEMORY_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MemoryLog for JsonlMemoryLog {
    fn append(&self, entry: &MemoryEntry) -> Result<(), anyhow::Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        // Single write call so the whole line lands in one append.
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    fn replay(&self) -> Result<Vec<MemoryEntry>, anyhow::Error> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        let reader = BufReader::new(file);

        let mut entries = Vec::new();
        for (lineno, chunk) in reader.split(b'\n').enumerate() {
            let bytes = chunk?;
            let Ok(text) = std::str::from_utf8(&bytes) else {
                log::debug!("{}:{}: skipping non UTF-8 line", self.path.display(), lineno + 1);
                continue;
            };
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            match serde_json::from_str::<MemoryEntry>(text) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    log::debug!(
                        "{}:{}: skipping malformed memory entry: {}",
                        self.path.display(),
                        lineno + 1,
                        e
                    );
                }
            }
        }
        Ok(entries)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
