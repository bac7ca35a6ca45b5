use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenericJsonError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no pcbdata object")]
    MissingPcbData,

    #[error("no components object")]
    MissingComponents,

    #[error("unsupported spec version ({0})")]
    UnsupportedVersion(String),

    #[error(
        "length of components list ({components}) doesn't match length of footprints list ({footprints})"
    )]
    CountMismatch { components: usize, footprints: usize },
}

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not a pcbdata payload")]
    NotAPayload,

    #[error("corrupt compressed payload: {0}")]
    Decompress(#[from] ibom_lzstring::DecompressError),
}
