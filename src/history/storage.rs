//! Persistence of command history across sessions.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Where sessions load their history from and flush it to on exit.
pub trait HistoryStorage: Send {
    /// Append the commands of a finished session.
    fn store(&mut self, commands: &[String]) -> Result<()>;

    /// Every retained command, oldest first.
    fn commands(&self) -> Result<Vec<String>>;
}

/// Bounded in-process log, shared by all sessions of one [`crate::Cli`].
#[derive(Debug, Clone)]
pub struct MemoryHistoryStorage {
    max_size: usize,
    commands: VecDeque<String>,
}

impl MemoryHistoryStorage {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            commands: VecDeque::new(),
        }
    }
}

impl Default for MemoryHistoryStorage {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl HistoryStorage for MemoryHistoryStorage {
    fn store(&mut self, commands: &[String]) -> Result<()> {
        self.commands.extend(commands.iter().cloned());
        while self.commands.len() > self.max_size {
            self.commands.pop_front();
        }
        Ok(())
    }

    fn commands(&self) -> Result<Vec<String>> {
        Ok(self.commands.iter().cloned().collect())
    }
}

/// Append-only text file, one command per line.
#[derive(Debug, Clone)]
pub struct FileHistoryStorage {
    path: PathBuf,
}

impl FileHistoryStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `history` in the platform data directory.
    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "menushell")
            .ok_or_else(|| Error::Storage("Could not determine data directory".to_string()))?;
        Ok(Self::new(dirs.data_dir().join("history")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStorage for FileHistoryStorage {
    fn store(&mut self, commands: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = BufWriter::new(file);
        for command in commands {
            writeln!(writer, "{}", command)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn commands(&self) -> Result<Vec<String>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        BufReader::new(file)
            .lines()
            .collect::<std::io::Result<Vec<_>>>()
            .map_err(Error::from)
    }
}
