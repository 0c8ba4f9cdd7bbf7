// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

/// Errors from the durable swap store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("Store I/O failed for {path}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The backing file holds data that cannot be decoded.
    #[error("Store data in {path} is corrupt")]
    Corrupt {
        /// File involved
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The backing file was written by an incompatible version.
    #[error("Store version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this build writes
        expected: u32,
        /// Version found on disk
        found: u32,
    },

    /// A status update referenced a record that does not exist.
    #[error("No record for {key}")]
    NotFound {
        /// Display form of the missing key
        key: String,
    },
}

impl StoreError {
    /// Helper to create an `Io` error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Helper to create a `NotFound` error.
    pub fn not_found(key: impl std::fmt::Display) -> Self {
        StoreError::NotFound {
            key: key.to_string(),
        }
    }
}
