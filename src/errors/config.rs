// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

/// Errors raised while loading chain and token configuration.
///
/// All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration file or directory could not be read.
    #[error("Failed to read config {path}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A configuration file is not valid TOML for the expected schema.
    #[error("Failed to parse config {path}")]
    Parse {
        /// Path that failed
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// A token entry failed validation.
    #[error("Invalid token #{index} in {file}: {reason}")]
    InvalidToken {
        /// File the entry came from
        file: String,
        /// Zero-based position in the `[[tokens]]` list
        index: usize,
        /// What is wrong
        reason: String,
    },

    /// A chain section failed validation.
    #[error("Invalid chain config in {file}: {reason}")]
    InvalidChain {
        /// File the section came from
        file: String,
        /// What is wrong
        reason: String,
    },

    /// Two entries share a dedup key.
    #[error("Duplicate {what}: {key}")]
    Duplicate {
        /// Kind of key (chain, pair, router, deposit)
        what: &'static str,
        /// The colliding key
        key: String,
    },

    /// An environment variable has an unparsable value.
    #[error("Invalid value for {name}: {value}")]
    InvalidEnv {
        /// Variable name
        name: String,
        /// Raw value
        value: String,
    },
}

impl ConfigError {
    /// Helper to create an `InvalidToken` error.
    pub fn invalid_token(file: impl Into<String>, index: usize, reason: impl Into<String>) -> Self {
        ConfigError::InvalidToken {
            file: file.into(),
            index,
            reason: reason.into(),
        }
    }

    /// Helper to create an `InvalidChain` error.
    pub fn invalid_chain(file: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidChain {
            file: file.into(),
            reason: reason.into(),
        }
    }
}
