use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A factory manifest that does not satisfy the factory contract.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("invalid type of deps field in module: {name}")]
    InvalidDeps { name: String },
    #[error("invalid type of init field in module: {name}")]
    InvalidInit { name: String },
    #[error("invalid type of finalize field in module: {name}")]
    InvalidFinalizer { name: String },
    #[error("unknown init builder `{init}` in module: {name}")]
    UnknownInit { name: String, init: String },
    #[error("unknown finalizer `{finalize}` in module: {name}")]
    UnknownFinalizer { name: String, finalize: String },
    #[error(
        "wrong number of init arguments in module: {name} ({declared} deps, builder takes {expected})"
    )]
    ArityMismatch {
        name: String,
        declared: usize,
        expected: usize,
    },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read module {name} from {}", .path.display())]
    Read {
        name: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse module: {name}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Shape(#[from] ShapeError),
}
