//! Module manifests and the source loader boundary
//!
//! A manifest is a JSON file describing either a plain value or a factory:
//! a dependency list, an initializer name and an optional finalizer name,
//! both resolved against a host-supplied [`BuilderRegistry`]. Everything
//! else in a factory manifest is exposed as read-only metadata.

pub mod error;
pub mod loader;
pub mod registry;
pub mod shape;

pub use error::{LoadError, ShapeError};
pub use loader::{ManifestLoader, SourceLoader};
pub use registry::{Builder, BuilderRegistry, Finalizer, Value};
pub use shape::{Factory, LoadedValue, Metadata};
