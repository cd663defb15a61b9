// SPDX: CC0-1.0

use log::warn;
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

// failures are reported as false and logged; nothing here is allowed to take
// the calculator down
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> bool;
    fn remove(&mut self, key: &str) -> bool;
}

#[derive(Clone, Debug, Default)]
pub struct MemStorage {
    entries: HashMap<String, String>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        self.entries.insert(key.to_string(), value.to_string());
        true
    }

    fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key);
        true
    }
}

// one json file per key inside a directory
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path(key)) {
            Ok(value) => Some(value),
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!("storage read of '{key}' failed: {err}");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        if let Err(err) = fs::create_dir_all(&self.dir) {
            warn!("storage directory creation failed: {err}");
            return false;
        }
        match fs::write(self.path(key), value) {
            Ok(()) => true,
            Err(err) => {
                warn!("storage write of '{key}' failed: {err}");
                false
            }
        }
    }

    fn remove(&mut self, key: &str) -> bool {
        match fs::remove_file(self.path(key)) {
            Ok(()) => true,
            Err(err) if err.kind() == io::ErrorKind::NotFound => true,
            Err(err) => {
                warn!("storage remove of '{key}' failed: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_storage_round_trip() {
        let mut store = MemStorage::new();
        assert_eq!(store.get("missing"), None);
        assert!(store.set("key", "value"));
        assert_eq!(store.get("key").as_deref(), Some("value"));
        assert!(store.remove("key"));
        assert_eq!(store.get("key"), None);
    }

    #[test]
    fn removing_a_missing_key_is_fine() {
        let mut store = MemStorage::new();
        assert!(store.remove("never-set"));
    }
}
