//! Error types for catalog validation and the settings store

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::{SchemeId, TypeId};

/// Recipe data that violates the catalog's integrity guarantees
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("scheme {0} has no products")]
    NoProducts(SchemeId),

    #[error("scheme {0} yields zero units of its primary product")]
    ZeroOutput(SchemeId),

    #[error("type {type_id} references unknown scheme {scheme_id}")]
    UnknownScheme { type_id: TypeId, scheme_id: SchemeId },

    #[error("unknown production type '{0}'")]
    UnknownProductionType(String),
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write settings to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed settings file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode settings")]
    Encode(#[from] serde_json::Error),

    #[error("toggle index {0} is out of range")]
    ToggleIndex(usize),
}
