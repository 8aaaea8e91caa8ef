//! Path resolution for module names
//!
//! Maps a logical module name plus an ordered alias table to a manifest
//! file on disk.

use std::path::PathBuf;

use thiserror::Error;

/// Extension appended to names that carry none of their own.
const MANIFEST_EXTENSION: &str = "json";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("cannot find module: {name}")]
    NotFound { name: String },
}

/// Resolves module names to existing manifest paths.
///
/// Aliases are matched in insertion order so that overlapping keys behave
/// predictably: for each entry, a key equal to the full name resolves as a
/// file alias, a key equal to the name's first path segment resolves as a
/// directory alias joined with the remainder. The first matching entry wins.
/// Names without a matching alias resolve relative to `root/dir`.
pub struct Resolver {
    root: PathBuf,
    dir: PathBuf,
    aliases: Vec<(String, PathBuf)>,
}

impl Resolver {
    pub fn new(root: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            dir: dir.into(),
            aliases: Vec::new(),
        }
    }

    /// Append an alias entry. Order of calls is the order of matching.
    pub fn add_alias(&mut self, key: impl Into<String>, target: impl Into<PathBuf>) {
        self.aliases.push((key.into(), target.into()));
    }

    pub fn resolve(&self, name: &str) -> Result<PathBuf, ResolveError> {
        let prefix = match name.find('/') {
            Some(index) if index > 0 => Some((&name[..index], &name[index + 1..])),
            _ => None,
        };

        for (key, target) in &self.aliases {
            if key == name {
                return self.existing(self.root.join(target), name);
            }
            if let Some((head, remainder)) = prefix {
                if key == head {
                    return self.existing(self.root.join(target).join(remainder), name);
                }
            }
        }

        self.existing(self.root.join(&self.dir).join(name), name)
    }

    /// A candidate resolves only when the manifest file exists on disk.
    fn existing(&self, candidate: PathBuf, name: &str) -> Result<PathBuf, ResolveError> {
        let path = with_manifest_extension(candidate);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ResolveError::NotFound { name: name.into() })
        }
    }
}

fn with_manifest_extension(path: PathBuf) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(MANIFEST_EXTENSION)
    }
}
