use std::path::PathBuf;

/// Container construction options.
#[derive(Debug, Clone)]
pub struct Options {
    /// Root directory for module resolution.
    pub root: PathBuf,
    /// Subdirectory under the root holding module manifests.
    pub dir: PathBuf,
    /// Alias table, matched in insertion order.
    pub aliases: Vec<(String, PathBuf)>,
    /// Establish watch subscriptions for located modules.
    pub watch: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            dir: PathBuf::from("."),
            aliases: Vec::new(),
            watch: true,
        }
    }
}

impl Options {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn with_alias(mut self, key: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        self.aliases.push((key.into(), target.into()));
        self
    }

    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }
}
