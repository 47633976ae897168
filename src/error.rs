use std::path::PathBuf;
use thiserror::Error;

use crate::model::ItemId;

/// The main error type for labelpack operations.
#[derive(Debug, Error)]
pub enum LabelpackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a readable pack at {path}: {message}")]
    CorruptContainer { path: PathBuf, message: String },

    #[error("Failed to parse annotations from {path}: {source}")]
    MetadataParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write annotations to {path}: {source}")]
    MetadataWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid geometry: {message}")]
    InvalidGeometry { message: String },

    #[error("Failed to decode media {name}: {message}")]
    MediaDecode { name: String, message: String },

    #[error("Failed to encode media for item {id}: {message}")]
    MediaEncode { id: ItemId, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported option value: {0}")]
    UnsupportedOption(String),

    #[error("Operation cancelled")]
    Cancelled,
}
