use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Kinds of records held by the store, used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Driver,
    Team,
    Race,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Driver => "driver",
            EntityKind::Team => "team",
            EntityKind::Race => "race",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },
    #[error("{kind} '{id}' already exists")]
    AlreadyExists { kind: EntityKind, id: String },
    #[error("race '{race_id}' has no session {index}")]
    SessionNotFound { race_id: String, index: usize },
    #[error("driver '{driver_id}' has no result in race '{race_id}' session {index}")]
    ResultNotFound {
        race_id: String,
        index: usize,
        driver_id: String,
    },
    #[error("Failed to access championship data at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse championship data at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unsupported championship data version: {0}")]
    UnsupportedVersion(u32),
}

impl StoreError {
    pub fn not_found(kind: EntityKind, id: &str) -> Self {
        StoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn already_exists(kind: EntityKind, id: &str) -> Self {
        StoreError::AlreadyExists {
            kind,
            id: id.to_string(),
        }
    }
}
