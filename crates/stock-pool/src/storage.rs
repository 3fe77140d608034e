use analysis_core::AnalysisError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Favorites, StockPool};

pub const STOCK_POOL_FILE: &str = "stock_pool.json";
pub const FAVORITE_STOCKS_FILE: &str = "favorite_stocks.json";

/// JSON file persistence for the pool and favorites
#[derive(Debug, Clone)]
pub struct StorageManager {
    data_dir: PathBuf,
}

impl StorageManager {
    /// Creates `data_dir` if it does not exist yet.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, AnalysisError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|e| {
            AnalysisError::StorageError(format!("cannot create {}: {}", data_dir.display(), e))
        })?;
        Ok(Self { data_dir })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn load_stock_pool(&self) -> Result<StockPool, AnalysisError> {
        self.load(STOCK_POOL_FILE)
    }

    pub fn save_stock_pool(&self, pool: &StockPool) -> Result<(), AnalysisError> {
        self.save(STOCK_POOL_FILE, pool)
    }

    pub fn load_favorites(&self) -> Result<Favorites, AnalysisError> {
        self.load(FAVORITE_STOCKS_FILE)
    }

    pub fn save_favorites(&self, favorites: &Favorites) -> Result<(), AnalysisError> {
        self.save(FAVORITE_STOCKS_FILE, favorites)
    }

    /// A missing file loads as the empty default.
    fn load<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T, AnalysisError> {
        let path = self.data_dir.join(file);
        if !path.exists() {
            tracing::debug!("{} not found, starting empty", path.display());
            return Ok(T::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| AnalysisError::StorageError(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| AnalysisError::StorageError(format!("invalid JSON in {}: {}", path.display(), e)))
    }

    fn save<T: Serialize>(&self, file: &str, value: &T) -> Result<(), AnalysisError> {
        let path = self.data_dir.join(file);
        let contents = serde_json::to_string(value)
            .map_err(|e| AnalysisError::StorageError(e.to_string()))?;
        fs::write(&path, contents)
            .map_err(|e| AnalysisError::StorageError(format!("cannot write {}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_load_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path().join("data")).unwrap();

        assert!(storage.data_dir().exists());
        assert!(storage.load_stock_pool().unwrap().is_empty());
        assert!(storage.load_favorites().unwrap().symbols().is_empty());
    }

    #[test]
    fn test_pool_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();

        let mut pool = StockPool::new();
        pool.add("AAPL", "Apple Inc.");
        pool.add("GOOGL", "Alphabet Inc.");
        storage.save_stock_pool(&pool).unwrap();

        let reopened = StorageManager::new(dir.path()).unwrap();
        assert_eq!(reopened.load_stock_pool().unwrap(), pool);
    }

    #[test]
    fn test_favorites_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();

        let mut favs = Favorites::new();
        favs.add("META");
        storage.save_favorites(&favs).unwrap();

        let raw = fs::read_to_string(dir.path().join(FAVORITE_STOCKS_FILE)).unwrap();
        assert_eq!(raw, r#"["META"]"#);
        assert_eq!(storage.load_favorites().unwrap(), favs);
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STOCK_POOL_FILE), "{not json").unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();

        assert!(matches!(storage.load_stock_pool(), Err(AnalysisError::StorageError(_))));
    }
}
