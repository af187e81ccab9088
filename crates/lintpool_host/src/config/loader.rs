//! Locates config files and caches the arrays built from them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::array::ConfigArray;
use super::file::{CONFIG_FILE_NAMES, read_config_file};
use super::object::ConfigObject;
use crate::HostError;
use crate::api::{EngineHooks, HostWarning};
use crate::helpers::normalize_path;
use crate::options::{EngineOptions, OverrideConfigFile};

/// Finds and loads the config array that applies to each file.
///
/// Arrays are cached per config file and lookups per directory, so files
/// sharing a directory share one array.
pub struct ConfigLoader {
    cwd: PathBuf,
    override_config_file: OverrideConfigFile,
    override_config: Vec<ConfigObject>,
    ignore: bool,
    ignore_patterns: Vec<String>,
    hooks: EngineHooks,
    /// Config file (or `None` for no file) of each looked-up directory.
    directories: Mutex<HashMap<PathBuf, Option<PathBuf>>>,
    arrays: Mutex<HashMap<Option<PathBuf>, Arc<ConfigArray>>>,
}

impl ConfigLoader {
    pub fn new(options: &EngineOptions, hooks: EngineHooks) -> Self {
        Self {
            cwd: options.cwd.clone(),
            override_config_file: options.override_config_file.clone(),
            override_config: options.override_config.clone(),
            ignore: options.ignore,
            ignore_patterns: options.ignore_patterns.clone(),
            hooks,
            directories: Mutex::new(HashMap::new()),
            arrays: Mutex::new(HashMap::new()),
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Resolves `path` against the working directory.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        normalize_path(&self.cwd.join(path))
    }

    /// Loads the config array for a file, reading its config file if this
    /// is the first file that needs it.
    pub fn load_config_array_for_file(&self, path: &Path) -> Result<Arc<ConfigArray>, HostError> {
        let path = self.absolute(path);
        let dir = path.parent().unwrap_or(&self.cwd).to_path_buf();
        self.load_config_array_for_directory(&dir)
    }

    /// Loads the config array governing files directly in `dir`.
    pub fn load_config_array_for_directory(
        &self,
        dir: &Path,
    ) -> Result<Arc<ConfigArray>, HostError> {
        let dir = self.absolute(dir);
        let config_file = self.config_file_for_directory(&dir);

        if let Some(array) = self.arrays.lock().get(&config_file) {
            return Ok(Arc::clone(array));
        }

        // Built outside the lock; a racing thread may build the same array,
        // in which case the first insert wins.
        let array = Arc::new(self.build_array(config_file.as_deref())?);
        let mut arrays = self.arrays.lock();
        Ok(Arc::clone(arrays.entry(config_file).or_insert(array)))
    }

    /// The config array for a file, if it was loaded before.
    pub fn get_cached_config_array_for_file(&self, path: &Path) -> Option<Arc<ConfigArray>> {
        let path = self.absolute(path);
        let dir = path.parent()?;
        let config_file = self.directories.lock().get(dir)?.clone();
        self.arrays.lock().get(&config_file).cloned()
    }

    /// Drops every cached lookup and array.
    pub fn reset(&self) {
        self.directories.lock().clear();
        self.arrays.lock().clear();
    }

    /// The config file that applies to `dir`.
    pub fn config_file_for_directory(&self, dir: &Path) -> Option<PathBuf> {
        match &self.override_config_file {
            OverrideConfigFile::Path(path) => return Some(self.absolute(path)),
            OverrideConfigFile::NoLookup => return None,
            OverrideConfigFile::Unset => {}
        }

        if let Some(found) = self.directories.lock().get(dir) {
            return found.clone();
        }

        let found = find_config_file(dir);
        self.directories
            .lock()
            .insert(dir.to_path_buf(), found.clone());
        found
    }

    fn build_array(&self, config_file: Option<&Path>) -> Result<ConfigArray, HostError> {
        let mut objects = match config_file {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                let objects = read_config_file(path)?;
                if objects.is_empty() {
                    self.hooks.emit(HostWarning::EmptyConfig {
                        config_file: path.to_path_buf(),
                    });
                }
                objects
            }
            None => {
                debug!("No config file found, using defaults");
                Vec::new()
            }
        };

        let base_path = match (&self.override_config_file, config_file) {
            (OverrideConfigFile::Unset, Some(path)) => {
                path.parent().unwrap_or(&self.cwd).to_path_buf()
            }
            _ => self.cwd.clone(),
        };

        if !self.ignore_patterns.is_empty() {
            objects.push(ConfigObject::global_ignores(
                self.ignore_patterns.clone(),
                Some(self.cwd.clone()),
            ));
        }
        for object in &self.override_config {
            let mut object = object.clone();
            object.base_path.get_or_insert_with(|| self.cwd.clone());
            objects.push(object);
        }

        ConfigArray::new(
            &objects,
            base_path,
            config_file.map(Path::to_path_buf),
            self.ignore,
        )
    }
}

impl std::fmt::Debug for ConfigLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigLoader")
            .field("cwd", &self.cwd)
            .field("override_config_file", &self.override_config_file)
            .finish_non_exhaustive()
    }
}

/// Walks up from `dir` to the nearest config file.
pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
    dir.ancestors().find_map(|ancestor| {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| ancestor.join(name))
            .find(|candidate| candidate.is_file())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStatus;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_finds_nearest_config() {
        let temp = tempdir().unwrap();
        let root_config = write(temp.path(), "lintpool.config.json", "[]");
        let nested_config = write(temp.path(), "pkg/lintpool.config.json", "[]");
        fs::create_dir_all(temp.path().join("pkg/src")).unwrap();
        fs::create_dir_all(temp.path().join("other")).unwrap();

        assert_eq!(find_config_file(&temp.path().join("pkg/src")), Some(nested_config));
        assert_eq!(find_config_file(&temp.path().join("other")), Some(root_config));
    }

    #[test]
    fn test_arrays_are_shared_per_config_file() {
        let temp = tempdir().unwrap();
        write(
            temp.path(),
            "lintpool.config.json",
            r#"[{ "rules": { "semi": "error" } }]"#,
        );
        let loader = ConfigLoader::new(&EngineOptions::new(temp.path()), EngineHooks::default());

        let a = loader.load_config_array_for_file(Path::new("a.js")).unwrap();
        let b = loader.load_config_array_for_file(Path::new("src/b.js")).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.base_path(), temp.path());

        let cached = loader.get_cached_config_array_for_file(Path::new("a.js")).unwrap();
        assert!(Arc::ptr_eq(&a, &cached));

        loader.reset();
        assert!(loader.get_cached_config_array_for_file(Path::new("a.js")).is_none());
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let temp = tempdir().unwrap();
        let mut options = EngineOptions::new(temp.path());
        options.override_config_file = OverrideConfigFile::NoLookup;
        let loader = ConfigLoader::new(&options, EngineHooks::default());

        let array = loader.load_config_array_for_file(Path::new("a.js")).unwrap();
        assert!(array.config_file().is_none());
        let config = array.get_config(&temp.path().join("a.js")).unwrap();
        assert!(config.rules.is_empty());
    }

    #[test]
    fn test_empty_config_emits_warning() {
        let temp = tempdir().unwrap();
        write(temp.path(), "lintpool.config.json", "[]");
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let hooks = EngineHooks::default().with_warning_sink(move |warning| {
            assert!(matches!(warning, HostWarning::EmptyConfig { .. }));
            seen.fetch_add(1, Ordering::SeqCst);
        });
        let loader = ConfigLoader::new(&EngineOptions::new(temp.path()), hooks);

        loader.load_config_array_for_file(Path::new("a.js")).unwrap();
        loader.load_config_array_for_file(Path::new("b.js")).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_override_config_file_and_objects() {
        let temp = tempdir().unwrap();
        let custom = write(
            temp.path(),
            "configs/custom.json",
            r#"[{ "rules": { "semi": "warn", "no-var": "error" } }]"#,
        );
        let mut options = EngineOptions::new(temp.path());
        options.override_config_file = OverrideConfigFile::Path(custom);
        options.override_config =
            vec![serde_json::from_value(json!({ "rules": { "semi": "error" } })).unwrap()];
        options.ignore_patterns = vec!["build/".to_string()];
        let loader = ConfigLoader::new(&options, EngineHooks::default());

        let array = loader.load_config_array_for_file(Path::new("src/a.js")).unwrap();
        assert_eq!(array.base_path(), temp.path());

        let config = array.get_config(&temp.path().join("src/a.js")).unwrap();
        assert_eq!(config.rules["semi"].level, 2);
        assert_eq!(config.rules["no-var"].level, 2);
        assert_eq!(
            array.get_config_status(&temp.path().join("build/out.js")),
            ConfigStatus::Ignored
        );
    }

    #[test]
    fn test_invalid_config_file() {
        let temp = tempdir().unwrap();
        write(temp.path(), "lintpool.config.json", "{ not json");
        let loader = ConfigLoader::new(&EngineOptions::new(temp.path()), EngineHooks::default());
        assert!(loader.load_config_array_for_file(Path::new("a.js")).is_err());
    }
}
