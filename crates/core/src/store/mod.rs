use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::Result;

/// Key the max score is persisted under.
pub const MAX_SCORE_KEY: &str = "maxScore";

/// Durable key-value storage for the best score.
pub trait ScoreStore {
    fn max_score(&self) -> Result<u32>;
    fn set_max_score(&mut self, score: u32) -> Result<()>;
}

impl<T: ScoreStore + ?Sized> ScoreStore for Box<T> {
    fn max_score(&self) -> Result<u32> {
        (**self).max_score()
    }

    fn set_max_score(&mut self, score: u32) -> Result<()> {
        (**self).set_max_score(score)
    }
}

/// Volatile store, lost with the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryScoreStore {
    max_score: u32,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn max_score(&self) -> Result<u32> {
        Ok(self.max_score)
    }

    fn set_max_score(&mut self, score: u32) -> Result<()> {
        self.max_score = score;
        Ok(())
    }
}

/// Store backed by a small JSON object on disk. Other keys in the file are
/// preserved on write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, serde_json::Value>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}

impl ScoreStore for JsonFileStore {
    fn max_score(&self) -> Result<u32> {
        let entries = self.read_entries()?;
        Ok(entries
            .get(MAX_SCORE_KEY)
            .and_then(serde_json::Value::as_u64)
            .and_then(|score| u32::try_from(score).ok())
            .unwrap_or(0))
    }

    fn set_max_score(&mut self, score: u32) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.insert(MAX_SCORE_KEY.to_string(), score.into());
        let raw = serde_json::to_string_pretty(&entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ping-pong-{name}-{}.json", std::process::id()))
    }

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryScoreStore::new();
        assert_eq!(store.max_score().unwrap(), 0);
        store.set_max_score(12).unwrap();
        assert_eq!(store.max_score().unwrap(), 12);
    }

    #[test]
    fn missing_file_reads_as_zero() {
        let store = JsonFileStore::new(temp_path("missing"));
        assert_eq!(store.max_score().unwrap(), 0);
    }

    #[test]
    fn file_store_persists_and_keeps_other_keys() {
        let path = temp_path("persist");
        std::fs::write(&path, r#"{ "volume": 3 }"#).unwrap();

        let mut store = JsonFileStore::new(&path);
        store.set_max_score(41).unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.max_score().unwrap(), 41);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("volume"));
        assert!(raw.contains(MAX_SCORE_KEY));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.max_score().is_err());

        let _ = std::fs::remove_file(&path);
    }
}
