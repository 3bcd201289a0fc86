use crate::catalog::Champion;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Data Dragon champion list stored between runs so name lookups work
/// offline and do not refetch `champion.json` every time.
#[derive(Debug, Serialize, Deserialize)]
pub struct DataDragonCache {
    pub version: String,
    pub last_updated: DateTime<Utc>,
    pub champions: Vec<Champion>,
    #[serde(skip)]
    path: PathBuf,
}

impl DataDragonCache {
    pub fn new(path: &Path, version: &str, champions: Vec<Champion>) -> Self {
        DataDragonCache {
            version: version.to_string(),
            last_updated: Utc::now(),
            champions,
            path: path.to_path_buf(),
        }
    }

    /// `Ok(None)` when nothing was cached yet.
    pub fn load(path: &Path) -> Result<Option<Self>, AppError> {
        match fs::read_to_string(path) {
            Ok(content) => {
                let mut cache: DataDragonCache = serde_json::from_str(&content).map_err(|e| {
                    AppError::JsonError(format!("Failed to parse cache: {}", e))
                })?;
                cache.path = path.to_path_buf();
                Ok(Some(cache))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            AppError::JsonError(format!("Failed to serialize cache: {}", e))
        })?;
        fs::write(&self.path, json).map_err(|e| {
            AppError::StorageError(format!("Failed to write cache: {}", e))
        })?;
        Ok(())
    }

    pub fn replace(&mut self, version: &str, champions: Vec<Champion>) {
        self.version = version.to_string();
        self.champions = champions;
        self.last_updated = Utc::now();
    }

    pub fn is_stale(&self, max_age_mins: u64) -> bool {
        let age = Utc::now().signed_duration_since(self.last_updated);
        age.num_minutes() > max_age_mins as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("riot_autologin_cache_{}_{}", name, std::process::id()))
            .join("ddragon.json")
    }

    #[test]
    fn missing_cache_loads_as_none() {
        assert!(DataDragonCache::load(&temp_path("missing")).unwrap().is_none());
    }

    #[test]
    fn saved_cache_round_trips() {
        let path = temp_path("save");
        DataDragonCache::new(&path, "14.20.1", vec![Champion::new(103, "Ahri")])
            .save()
            .unwrap();

        let cache = DataDragonCache::load(&path).unwrap().unwrap();
        assert_eq!(cache.version, "14.20.1");
        assert_eq!(cache.champions[0].name, "Ahri");
        assert!(!cache.is_stale(24 * 60));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn old_cache_is_stale() {
        let mut cache = DataDragonCache::new(&temp_path("stale"), "14.1.1", Vec::new());
        cache.last_updated = Utc::now() - Duration::hours(25);
        assert!(cache.is_stale(24 * 60));

        cache.replace("14.2.1", vec![Champion::new(22, "Ashe")]);
        assert!(!cache.is_stale(24 * 60));
        assert_eq!(cache.version, "14.2.1");
    }
}
