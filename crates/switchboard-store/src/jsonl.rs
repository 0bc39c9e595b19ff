// ABOUTME: Append-only JSONL conversation log implementing the read-only ConversationHistory view.
// ABOUTME: Provides durable append, sequential replay, and repair for truncated files.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use switchboard_core::{ConversationEntry, ConversationHistory};
use switchboard_gateway::Role;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

struct Inner {
    file: File,
    entries: Vec<ConversationEntry>,
}

/// Conversation log backed by a JSONL file, one entry per line.
///
/// Entries are kept in memory after replay so reads never touch the disk.
/// Only the process layer appends; the engine sees it through
/// [`ConversationHistory`].
pub struct JsonlHistory {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl JsonlHistory {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open (or create) the log at `path`, creating parent directories.
    /// An existing file with unparseable lines is repaired before replay.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let entries = if path.exists() {
            match Self::replay(path) {
                Ok(entries) => entries,
                Err(StoreError::Json(e)) => {
                    tracing::warn!(path = %path.display(), error = %e, "repairing conversation log");
                    let kept = Self::repair(path)?;
                    tracing::info!(kept, "conversation log repaired");
                    Self::replay(path)?
                }
                Err(e) => return Err(e),
            }
        } else {
            Vec::new()
        };

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing::debug!(path = %path.display(), entries = entries.len(), "conversation log opened");

        Ok(Self {
            path: path.to_path_buf(),
            inner: Mutex::new(Inner { file, entries }),
        })
    }

    /// Append one entry as a JSON line and fsync it.
    pub fn append(&self, entry: ConversationEntry) -> Result<(), StoreError> {
        let json = serde_json::to_string(&entry)?;
        let mut inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        writeln!(inner.file, "{}", json)?;
        inner.file.sync_all()?;
        inner.entries.push(entry);
        Ok(())
    }

    pub fn append_message(&self, role: Role, content: &str) -> Result<(), StoreError> {
        self.append(ConversationEntry::new(role, content))
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read every entry from a JSONL file in order. Empty lines are skipped.
    pub fn replay(path: &Path) -> Result<Vec<ConversationEntry>, StoreError> {
        let reader = BufReader::new(File::open(path)?);
        let mut entries = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(serde_json::from_str(&line)?);
        }

        Ok(entries)
    }

    /// Keep only complete, parseable lines. Writes a temp file, fsyncs, then
    /// renames it over the original. Returns the number of entries kept.
    pub fn repair(path: &Path) -> Result<usize, StoreError> {
        let reader = BufReader::new(File::open(path)?);
        let mut valid_lines: Vec<String> = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if serde_json::from_str::<ConversationEntry>(&line).is_ok() {
                valid_lines.push(line);
            }
        }

        let tmp_path = path.with_extension("jsonl.tmp");
        let mut tmp_file = File::create(&tmp_path)?;
        for line in &valid_lines {
            writeln!(tmp_file, "{}", line)?;
        }
        tmp_file.sync_all()?;
        fs::rename(&tmp_path, path)?;

        // Best effort: the rename already happened.
        if let Some(parent) = path.parent()
            && let Ok(dir) = File::open(parent)
        {
            let _ = dir.sync_all();
        }

        Ok(valid_lines.len())
    }
}

impl ConversationHistory for JsonlHistory {
    fn recent(&self, limit: usize) -> Vec<ConversationEntry> {
        let inner = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let start = inner.entries.len().saturating_sub(limit);
        inner.entries[start..].to_vec()
    }
}
