//! Chat history stores.
//!
//! The core only needs to know whether a session has prior history (to
//! decide on the greeting) and somewhere to record the transcript. The file
//! store keeps an append-only log:
//!
//! ```text
//! <dir>/
//! └── history.jsonl     # one Message per line
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::warn;

use crate::error::ChatResult;
use crate::types::Message;

const HISTORY_FILE: &str = "history.jsonl";

/// Durable (or not) record of displayed messages
#[cfg_attr(test, mockall::automock)]
pub trait HistoryStore: Send + Sync {
    /// Whether any message has ever been shown in this session
    fn has_prior_history(&self) -> bool;

    /// Append a displayed message
    fn record(&self, message: &Message) -> ChatResult<()>;

    /// All recorded messages in display order
    fn load(&self) -> ChatResult<Vec<Message>>;

    /// Forget everything (session clear)
    fn clear(&self) -> ChatResult<()>;
}

/// In-process history, lost when dropped
#[derive(Default)]
pub struct MemoryHistory {
    messages: Mutex<Vec<Message>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// History that already reports prior messages
    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self {
            messages: Mutex::new(messages),
        }
    }
}

impl HistoryStore for MemoryHistory {
    fn has_prior_history(&self) -> bool {
        !self.messages.lock().is_empty()
    }

    fn record(&self, message: &Message) -> ChatResult<()> {
        self.messages.lock().push(message.clone());
        Ok(())
    }

    fn load(&self) -> ChatResult<Vec<Message>> {
        Ok(self.messages.lock().clone())
    }

    fn clear(&self) -> ChatResult<()> {
        self.messages.lock().clear();
        Ok(())
    }
}

/// JSONL-backed history under a directory
#[derive(Clone)]
pub struct FileHistory {
    dir: PathBuf,
}

impl FileHistory {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }
}

impl HistoryStore for FileHistory {
    fn has_prior_history(&self) -> bool {
        match fs::metadata(self.path()) {
            Ok(meta) => meta.len() > 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(e) => {
                warn!(
                    "Cannot inspect chat history at {:?}, treating session as fresh: {}",
                    self.path(),
                    e
                );
                false
            }
        }
    }

    fn record(&self, message: &Message) -> ChatResult<()> {
        fs::create_dir_all(&self.dir)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path())?;

        let json = serde_json::to_string(message)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }

    fn load(&self) -> ChatResult<Vec<Message>> {
        let path = self.path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(path)?);
        let mut messages = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                messages.push(serde_json::from_str(&line)?);
            }
        }

        Ok(messages)
    }

    fn clear(&self) -> ChatResult<()> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
