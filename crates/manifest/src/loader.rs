use std::fs;
use std::path::{Path, PathBuf};

use ahash::AHashMap;

use crate::error::LoadError;
use crate::registry::BuilderRegistry;
use crate::shape::{self, LoadedValue};

/// Loads a resolved location into a [`LoadedValue`] and can forget a
/// previously loaded location so the next load re-reads the source.
pub trait SourceLoader {
    fn load(&mut self, name: &str, location: &Path) -> Result<LoadedValue, LoadError>;

    fn evict(&mut self, location: &Path);
}

/// The default loader: JSON manifests linked against a builder registry,
/// with a location-keyed cache.
pub struct ManifestLoader {
    registry: BuilderRegistry,
    cache: AHashMap<PathBuf, LoadedValue>,
}

impl ManifestLoader {
    pub fn new(registry: BuilderRegistry) -> Self {
        Self {
            registry,
            cache: AHashMap::new(),
        }
    }
}

impl SourceLoader for ManifestLoader {
    fn load(&mut self, name: &str, location: &Path) -> Result<LoadedValue, LoadError> {
        if let Some(cached) = self.cache.get(location) {
            return Ok(cached.clone());
        }

        let text = fs::read_to_string(location).map_err(|source| LoadError::Read {
            name: name.into(),
            path: location.to_path_buf(),
            source,
        })?;
        let raw = serde_json::from_str(&text).map_err(|source| LoadError::Parse {
            name: name.into(),
            source,
        })?;

        let loaded = shape::classify(name, raw, &self.registry)?;
        self.cache.insert(location.to_path_buf(), loaded.clone());
        Ok(loaded)
    }

    fn evict(&mut self, location: &Path) {
        self.cache.remove(location);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value as Json;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[test]
    fn test_loads_a_direct_value_manifest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("c.json");
        fs::write(&path, r#"{ "name": "c" }"#).unwrap();

        let mut loader = ManifestLoader::new(BuilderRegistry::new());
        let loaded = loader.load("c", &path).unwrap();

        let LoadedValue::Direct(value) = loaded else {
            panic!("expected a direct value");
        };
        let raw = value.downcast::<Json>().unwrap();
        assert_eq!(raw["name"], "c");
    }

    #[test]
    fn test_loads_a_factory_manifest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("b.json");
        fs::write(&path, r#"{ "deps": ["c"], "init": "make_b" }"#).unwrap();

        let mut registry = BuilderRegistry::new();
        registry.register_builder("make_b", 1, |_| Ok(Rc::new(()) as crate::Value));
        let mut loader = ManifestLoader::new(registry);
        let loaded = loader.load("b", &path).unwrap();

        let LoadedValue::Factory(factory) = loaded else {
            panic!("expected a factory");
        };
        assert_eq!(factory.deps, vec!["c".to_string()]);
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let temp = TempDir::new().unwrap();

        let mut loader = ManifestLoader::new(BuilderRegistry::new());
        let result = loader.load("gone", &temp.path().join("gone.json"));

        assert!(matches!(result, Err(LoadError::Read { .. })));
    }

    #[test]
    fn test_malformed_json_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let mut loader = ManifestLoader::new(BuilderRegistry::new());
        let result = loader.load("broken", &path);

        assert!(matches!(result, Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_cache_serves_until_evicted() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("c.json");
        fs::write(&path, r#"{ "rev": 1 }"#).unwrap();

        let mut loader = ManifestLoader::new(BuilderRegistry::new());
        let first = loader.load("c", &path).unwrap();

        fs::write(&path, r#"{ "rev": 2 }"#).unwrap();
        let cached = loader.load("c", &path).unwrap();
        let (LoadedValue::Direct(first), LoadedValue::Direct(cached)) = (&first, &cached) else {
            panic!("expected direct values");
        };
        assert!(Rc::ptr_eq(first, cached));

        loader.evict(&path);
        let reloaded = loader.load("c", &path).unwrap();
        let LoadedValue::Direct(reloaded) = reloaded else {
            panic!("expected a direct value");
        };
        let raw = reloaded.downcast::<Json>().unwrap();
        assert_eq!(raw["rev"], 2);
    }
}
