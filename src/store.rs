// src/store.rs
//! Persistence for the two JSON side files.
//!
//! The pipeline only talks to the [`Store`] trait so tests can swap in an
//! in-memory fake instead of touching the file system.

use crate::config::DioConfig;
use crate::types::RunResult;
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub trait Store {
    fn load_config(&self) -> Result<DioConfig>;
    fn save_config(&self, config: &DioConfig) -> Result<()>;
    fn load_data(&self) -> Result<RunResult>;
    fn save_data(&self, data: &RunResult) -> Result<()>;
}

/// Production store backed by `dio-config.json` and `dio-data.json`.
pub struct FileStore {
    config_path: PathBuf,
    data_path: PathBuf,
}

impl FileStore {
    pub fn new(config_path: PathBuf, data_path: PathBuf) -> Self {
        Self {
            config_path,
            data_path,
        }
    }
}

impl Store for FileStore {
    fn load_config(&self) -> Result<DioConfig> {
        let content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config file: {}", self.config_path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in config file: {}", self.config_path.display()))
    }

    fn save_config(&self, config: &DioConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.config_path, json)
            .with_context(|| format!("Failed to write config file: {}", self.config_path.display()))
    }

    fn load_data(&self) -> Result<RunResult> {
        let content = fs::read_to_string(&self.data_path).with_context(|| {
            format!(
                "Failed to read data file: {}. Run `dio-sync fetch` first",
                self.data_path.display()
            )
        })?;
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in data file: {}", self.data_path.display()))
    }

    fn save_data(&self, data: &RunResult) -> Result<()> {
        let json = serde_json::to_string_pretty(data).context("Failed to serialize run data")?;
        fs::write(&self.data_path, json)
            .with_context(|| format!("Failed to write data file: {}", self.data_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Certificate;

    fn store_in(dir: &std::path::Path) -> FileStore {
        FileStore::new(dir.join("dio-config.json"), dir.join("dio-data.json"))
    }

    #[test]
    fn data_file_round_trip_keeps_wire_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        let mut data = RunResult::default();
        data.certificates.push(Certificate {
            title: "Curso de Python".to_string(),
            url: "https://hermes.dio.me/certificates/ABC.pdf".to_string(),
            date: "2026-08-23".to_string(),
        });
        data.last_update = "2026-08-23 10:00:00".to_string();
        store.save_data(&data).unwrap();

        let raw = fs::read_to_string(dir.path().join("dio-data.json")).unwrap();
        assert!(raw.contains("\"titulo\""));
        assert!(raw.contains("\"data\""));

        let loaded = store.load_data().unwrap();
        assert_eq!(loaded.certificates, data.certificates);
    }

    #[test]
    fn missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(store.load_config().is_err());
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dio-config.json"), "{not json").unwrap();
        let store = store_in(dir.path());
        assert!(store.load_config().is_err());
    }
}
