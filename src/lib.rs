//! Lazy dependency-injection container with hot reload
//!
//! Named modules are resolved on demand from manifest files, their declared
//! dependencies are recursively instantiated through registered builders,
//! and watched source changes invalidate the affected part of the
//! instantiated graph so the next request rebuilds it.

pub mod cli;
pub mod container;
pub mod error;
pub mod logger;
pub mod options;
pub mod version;

pub use container::Container;
pub use error::ContainerError;
pub use options::Options;

pub use manifest::{
    Builder, BuilderRegistry, Factory, Finalizer, LoadError, LoadedValue, ManifestLoader,
    Metadata, ShapeError, SourceLoader, Value,
};
pub use resolve::{ResolveError, Resolver};
pub use watch::{
    ChangeNotifier, FsNotifier, ManualNotifier, NullNotifier, WatchError, WatchHandle,
};
