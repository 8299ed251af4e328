use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use crate::{Result, Error};
use log::warn;

#[allow(unused_imports)]
use crate::engine::MemStore;

/// Handles disk I/O for the [`MemStore`].
///
/// Persistence uses an atomic "write-then-rename" strategy to ensure data integrity.
/// Each key is stored in its own `.json` file.
pub struct Persistence {
    data_dir: PathBuf,
}

impl Persistence {
    /// Initializes a new `Persistence` handler in the specified directory.
    ///
    /// If the directory does not exist, it will be created.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self { data_dir: dir })
    }

    /// The directory holding the key files.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.data_dir.join(format!("{}.json", key)))
    }

    /// Writes a single key's value to a JSON file atomically.
    ///
    /// This method writes to a temporary file first and then renames it to the
    /// final destination, so a crash mid-write leaves the previous value intact.
    pub fn save_key(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let file_path = self.key_path(key)?;
        let temp_path = file_path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(value)?;

        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &file_path)?;

        Ok(())
    }

    /// Removes the file backing `key`. A missing file is not an error.
    pub fn delete_key(&self, key: &str) -> Result<()> {
        let file_path = self.key_path(key)?;
        match fs::remove_file(&file_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads every key found in the data directory.
    ///
    /// Files that cannot be read or parsed are skipped with a warning, so a corrupt
    /// value behaves like a missing one.
    pub fn load_all(&self) -> Result<HashMap<String, serde_json::Value>> {
        let mut all_data = HashMap::new();

        if !self.data_dir.exists() {
            return Ok(all_data);
        }

        for entry in fs::read_dir(&self.data_dir)? {
            let entry = entry?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                let key = match path.file_stem().and_then(|s| s.to_str()) {
                    Some(stem) if validate_key(stem).is_ok() => stem.to_string(),
                    _ => {
                        warn!("Skipping file with unusable key name {:?}", path);
                        continue;
                    }
                };

                let content = match fs::read(&path) {
                    Ok(c) => c,
                    Err(e) => {
                        warn!("Could not read key file {:?}: {}", path, e);
                        continue;
                    }
                };

                let value: serde_json::Value = match serde_json::from_slice(&content) {
                    Ok(d) => d,
                    Err(e) => {
                        warn!("Could not unmarshal value from {:?}: {}", path, e);
                        continue;
                    }
                };

                all_data.insert(key, value);
            }
        }

        Ok(all_data)
    }
}

/// Keys become file names, so only `[A-Za-z0-9._-]` is accepted and dot-only names are refused.
pub fn validate_key(key: &str) -> Result<()> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');
    if key.is_empty() || key.chars().all(|c| c == '.') || !key.chars().all(allowed) {
        return Err(Error::InvalidKey(key.to_string()));
    }
    Ok(())
}
