use manifest::{LoadError, ShapeError};
use resolve::ResolveError;
use thiserror::Error;

/// A failure while driving a record towards Ready, or a rejected
/// registration. Failures never cross the `get` boundary as errors; they
/// are recorded on the failing record and emitted on the error channel.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    NotFound(#[from] ResolveError),
    #[error("cannot load module: {name}")]
    Load {
        name: String,
        source: LoadError,
    },
    #[error(transparent)]
    InvalidFactoryShape(#[from] ShapeError),
    #[error("cyclic dependency in module: {name}")]
    CyclicDependency { name: String },
    #[error("unresolved dependency: {name}")]
    UnresolvedDependency { name: String },
    #[error("module is already registered: {name}")]
    AlreadyRegistered { name: String },
    #[error("cannot initialize module {name}: {cause}")]
    Init { name: String, cause: anyhow::Error },
}

impl ContainerError {
    pub(crate) fn from_load(name: &str, error: LoadError) -> Self {
        match error {
            LoadError::Shape(shape) => Self::InvalidFactoryShape(shape),
            other => Self::Load {
                name: name.into(),
                source: other,
            },
        }
    }
}
