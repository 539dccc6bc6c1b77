//! Application configuration.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use ravelock_core::{FileStorage, LockPolicy};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Settings read from the `--config` JSON file. Missing keys keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding saved canvases; the platform data directory when
    /// unset.
    pub storage_dir: Option<PathBuf>,
    /// Policy for lock rows created by `new`, `demo`, `lock` and
    /// `lock-handles`. When unset, new canvases lock every field and
    /// existing canvases keep the policy saved with them.
    pub default_policy: Option<LockPolicy>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            default_policy: None,
        }
    }
}

impl AppConfig {
    /// Read the config file, or return the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let json = fs::read_to_string(path).map_err(|source| AppError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&json).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Open the configured storage directory.
    pub fn storage(&self) -> AppResult<FileStorage> {
        let storage = match &self.storage_dir {
            Some(dir) => FileStorage::new(dir.clone())?,
            None => FileStorage::default_location()?,
        };
        debug!("using storage at {}", storage.base_path().display());
        Ok(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let config = AppConfig::load(None).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.default_policy, None);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ravelock.json");
        fs::write(
            &path,
            r#"{ "default_policy": { "slicer": true, "orientation": false, "calipers": false, "order": true } }"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.storage_dir, None);
        assert_eq!(
            config.default_policy,
            Some(LockPolicy::NONE.with_slicer(true).with_order(true))
        );
    }

    #[test]
    fn test_bad_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, AppError::ConfigParse { .. }));
        assert!(err.to_string().contains("broken.json"));

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            AppConfig::load(Some(&missing)),
            Err(AppError::ConfigIo { .. })
        ));
    }

    #[test]
    fn test_storage_dir_is_created() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            storage_dir: Some(dir.path().join("canvases")),
            ..AppConfig::default()
        };
        let storage = config.storage().unwrap();
        assert!(storage.base_path().is_dir());
    }
}
