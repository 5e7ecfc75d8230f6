//! File-backed settings store
//!
//! All keys live in one JSON object file. Every `set` rewrites the file.

use super::SettingsStore;
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct JsonFileSettings {
    path: PathBuf,
}

impl JsonFileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole settings object, empty when the file does not exist
    fn read_all(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(Error::settings(format!(
                "{:?} does not contain a JSON object",
                self.path
            ))),
        }
    }

    /// Ensure settings directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl SettingsStore for JsonFileSettings {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let mut all = self.read_all()?;
        all.insert(key.to_string(), value);

        self.ensure_parent_dir()?;
        let json = serde_json::to_string_pretty(&Value::Object(all))?;
        fs::write(&self.path, json)?;
        tracing::debug!("Settings written to {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let settings = JsonFileSettings::new(dir.path().join("none.json"));
        assert_eq!(settings.get("states").unwrap(), None);
    }

    #[test]
    fn test_set_creates_dirs_and_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = JsonFileSettings::new(&path);

        settings.set("theme", json!("dark")).unwrap();
        settings.set("states", json!({"000": {"type": "C"}})).unwrap();

        let reopened = JsonFileSettings::new(&path);
        assert_eq!(reopened.get("theme").unwrap(), Some(json!("dark")));
        assert_eq!(
            reopened.get("states").unwrap(),
            Some(json!({"000": {"type": "C"}}))
        );
    }

    #[test]
    fn test_non_object_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "[1, 2]").unwrap();

        let settings = JsonFileSettings::new(&path);
        assert!(matches!(settings.get("states"), Err(Error::Settings(_))));
    }
}
