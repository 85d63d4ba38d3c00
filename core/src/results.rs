use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::*;

/// Fixed storage name the results list is kept under.
pub const STORAGE_NAME: &str = "_minesweeper_data_";

/// One won game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// Seconds taken
    pub time: u32,
    /// Unix timestamp in milliseconds
    pub date: i64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RankedResult {
    pub result: GameResult,
    /// Set on the most recently appended result, whatever its rank
    pub current: bool,
}

/// Append-only list of results, in the order they were recorded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultsTable {
    results: Vec<GameResult>,
}

impl ResultsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: GameResult) {
        self.results.push(result);
    }

    /// Appends a result stamped with the current time.
    pub fn record(&mut self, time: u32) -> GameResult {
        let result = GameResult {
            time,
            date: chrono::Utc::now().timestamp_millis(),
        };
        self.push(result);
        result
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameResult> {
        self.results.iter()
    }

    /// Results sorted by ascending time; ties keep their recording order.
    pub fn ranked(&self) -> Vec<RankedResult> {
        let last = self.results.len().checked_sub(1);
        let mut ranked: Vec<RankedResult> = self
            .results
            .iter()
            .enumerate()
            .map(|(i, &result)| RankedResult {
                result,
                current: Some(i) == last,
            })
            .collect();
        ranked.sort_by_key(|entry| entry.result.time);
        ranked
    }
}

impl FromIterator<GameResult> for ResultsTable {
    fn from_iter<I: IntoIterator<Item = GameResult>>(iter: I) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}

pub trait ResultsStore {
    fn load(&self) -> Result<ResultsTable>;

    fn save(&mut self, table: &ResultsTable) -> Result<()>;

    /// Loads the table, records `time` and writes it back.
    fn append(&mut self, time: u32) -> Result<ResultsTable> {
        let mut table = self.load()?;
        table.record(time);
        self.save(&table)?;
        Ok(table)
    }
}

/// Keeps the table as JSON in `<dir>/_minesweeper_data_.json`.
#[derive(Clone, Debug, PartialEq)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STORAGE_NAME}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultsStore for JsonFileStore {
    fn load(&self) -> Result<ResultsTable> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("no results at {}, starting empty", self.path.display());
                return Ok(ResultsTable::new());
            }
            Err(err) => return Err(storage_error(&self.path, err)),
        };

        serde_json::from_str(&text).map_err(|err| storage_error(&self.path, err))
    }

    fn save(&mut self, table: &ResultsTable) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| storage_error(parent, err))?;
        }
        let text = serde_json::to_string(table).map_err(|err| storage_error(&self.path, err))?;
        fs::write(&self.path, text).map_err(|err| storage_error(&self.path, err))?;
        log::debug!("saved {} results to {}", table.len(), self.path.display());
        Ok(())
    }
}

fn storage_error(path: &Path, err: impl core::fmt::Display) -> GameError {
    log::error!("results storage failed at {}: {}", path.display(), err);
    GameError::Storage(format!("{}: {}", path.display(), err))
}

/// Non-persistent store, mostly for tests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryStore {
    table: ResultsTable,
}

impl ResultsStore for MemoryStore {
    fn load(&self) -> Result<ResultsTable> {
        Ok(self.table.clone())
    }

    fn save(&mut self, table: &ResultsTable) -> Result<()> {
        self.table = table.clone();
        Ok(())
    }
}
