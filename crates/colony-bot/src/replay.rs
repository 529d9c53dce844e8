//! Recorded snapshots: writing them during a match and playing them back.
//!
//! A recording is a directory of `NNNNN.json` files, one [`ArenaState`]
//! per turn. Playback orders files the way a person would read them
//! (`2.json` before `10.json`), so hand-named dumps replay correctly too.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::BotError;
use crate::wire::ArenaState;

/// Sorting key that compares digit runs by value and everything else
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyPart {
    Num(u64),
    Text(String),
}

impl PartialOrd for KeyPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for KeyPart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Num(a), Self::Num(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Num(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Num(_)) => Ordering::Greater,
        }
    }
}

fn human_key(name: &str) -> Vec<KeyPart> {
    let mut parts = Vec::new();
    let mut digits = String::new();
    let mut text = String::new();
    for ch in name.chars() {
        if ch.is_ascii_digit() {
            if !text.is_empty() {
                parts.push(KeyPart::Text(std::mem::take(&mut text)));
            }
            digits.push(ch);
        } else {
            if !digits.is_empty() {
                parts.push(number_part(&std::mem::take(&mut digits)));
            }
            text.extend(ch.to_lowercase());
        }
    }
    if !digits.is_empty() {
        parts.push(number_part(&digits));
    }
    if !text.is_empty() {
        parts.push(KeyPart::Text(text));
    }
    parts
}

/// Digit runs too long for `u64` fall back to text comparison.
fn number_part(digits: &str) -> KeyPart {
    digits
        .parse()
        .map_or_else(|_| KeyPart::Text(digits.to_owned()), KeyPart::Num)
}

/// Snapshots read back from a recording directory, in order.
#[derive(Debug)]
pub struct ReplaySource {
    files: VecDeque<PathBuf>,
}

impl ReplaySource {
    /// List the `*.json` files in `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Replay`] if the directory does not exist or holds
    /// no JSON files.
    pub fn open(dir: &Path) -> Result<Self, BotError> {
        if !dir.is_dir() {
            return Err(BotError::Replay {
                message: format!("no such directory: {}", dir.display()),
            });
        }
        let mut files: Vec<(Vec<KeyPart>, PathBuf)> = std::fs::read_dir(dir)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| {
                let key = human_key(path.file_name()?.to_str()?);
                Some((key, path))
            })
            .collect();
        if files.is_empty() {
            return Err(BotError::Replay {
                message: format!("no JSON files in {}", dir.display()),
            });
        }
        files.sort();
        debug!(dir = %dir.display(), frames = files.len(), "Replay opened");

        Ok(Self {
            files: files.into_iter().map(|(_, path)| path).collect(),
        })
    }

    /// Frames not yet read.
    pub fn remaining(&self) -> usize {
        self.files.len()
    }

    /// Read the next snapshot. Unreadable or malformed files are skipped
    /// with a warning; `None` once the recording is exhausted.
    pub fn next_state(&mut self) -> Option<ArenaState> {
        while let Some(path) = self.files.pop_front() {
            let parsed = std::fs::read_to_string(&path)
                .map_err(BotError::from)
                .and_then(|text| serde_json::from_str(&text).map_err(BotError::from));
            match parsed {
                Ok(state) => return Some(state),
                Err(e) => warn!(file = %path.display(), error = %e, "Skipping replay frame"),
            }
        }
        None
    }
}

/// Writes every fetched snapshot into a directory as `NNNNN.json`.
#[derive(Debug)]
pub struct Recorder {
    dir: PathBuf,
}

impl Recorder {
    /// Create `dir` if needed.
    pub fn create(dir: &Path) -> Result<Self, BotError> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Write one snapshot, named after its turn number. Returns the file
    /// written.
    pub fn record(&self, state: &ArenaState) -> Result<PathBuf, BotError> {
        let path = self.dir.join(format!("{:05}.json", state.turn_no));
        let json = serde_json::to_string(state)?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}
