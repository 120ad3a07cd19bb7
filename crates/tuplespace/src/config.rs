// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// This file is part of Linda.
//
// Linda is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 2.1 of the License, or
// (at your option) any later version.
//
// Linda is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with Linda. If not, see <https://www.gnu.org/licenses/>.

//! TupleSpace Configuration Module
//!
//! ## Purpose
//! Shape rules and dispatch limits for a [`TupleSpace`] engine.
//!
//! ## Configuration Hierarchy
//! 1. **CODE**: Explicit `SpaceConfig` passed to `TupleSpace::with_config` (highest priority)
//! 2. **ENV**: Environment variables (`LINDA_TUPLE_ARITY`, `LINDA_MAX_ARITY`,
//!    `LINDA_MAX_CONCURRENT_CALLBACKS`)
//! 3. **FILE**: YAML/TOML/JSON configuration files
//! 4. **DEFAULT**: Any arity up to 64, unbounded callback concurrency (lowest priority)
//!
//! ## Examples
//!
//! ### From Config File (YAML)
//! ```yaml
//! tuple_arity: 4
//! max_arity: 16
//! max_concurrent_callbacks: 8
//! ```
//!
//! ```rust,no_run
//! use linda_tuplespace::TupleSpace;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let space = TupleSpace::from_file("config/space.yaml")?;
//! # Ok(())
//! # }
//! ```

use crate::{TupleSpace, TupleSpaceError, TupleSpaceResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable for a fixed tuple arity
pub const ENV_TUPLE_ARITY: &str = "LINDA_TUPLE_ARITY";
/// Environment variable for the maximum tuple arity
pub const ENV_MAX_ARITY: &str = "LINDA_MAX_ARITY";
/// Environment variable for the callback concurrency limit
pub const ENV_MAX_CONCURRENT_CALLBACKS: &str = "LINDA_MAX_CONCURRENT_CALLBACKS";

const DEFAULT_MAX_ARITY: usize = 64;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpaceConfig {
    /// Expected shape: when set, every tuple and template must have exactly this arity
    pub tuple_arity: Option<usize>,
    /// Upper bound on tuple and template arity
    pub max_arity: usize,
    /// Callbacks allowed to run at once (0 = unbounded)
    pub max_concurrent_callbacks: usize,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        SpaceConfig {
            tuple_arity: None,
            max_arity: DEFAULT_MAX_ARITY,
            max_concurrent_callbacks: 0,
        }
    }
}

impl SpaceConfig {
    /// Check an arity against the configured shape.
    ///
    /// Returns a description of the violation, the caller picks the error kind.
    pub(crate) fn check_arity(&self, arity: usize) -> Result<(), String> {
        if arity == 0 {
            return Err("arity must be at least 1".to_string());
        }
        if let Some(expected) = self.tuple_arity {
            if arity != expected {
                return Err(format!("expected arity {}, got {}", expected, arity));
            }
        }
        if arity > self.max_arity {
            return Err(format!(
                "arity {} exceeds the maximum of {}",
                arity, self.max_arity
            ));
        }
        Ok(())
    }

    /// Reject self-contradictory settings
    pub fn validate(&self) -> TupleSpaceResult<()> {
        if self.max_arity == 0 {
            return Err(TupleSpaceError::InvalidConfiguration(
                "max_arity must be at least 1".to_string(),
            ));
        }
        if let Some(arity) = self.tuple_arity {
            if arity == 0 || arity > self.max_arity {
                return Err(TupleSpaceError::InvalidConfiguration(format!(
                    "tuple_arity {} must be between 1 and max_arity {}",
                    arity, self.max_arity
                )));
            }
        }
        Ok(())
    }

    /// Load configuration from environment variables.
    ///
    /// Unset variables keep their defaults; unparsable values are an error.
    pub fn from_env() -> TupleSpaceResult<Self> {
        let mut config = SpaceConfig::default();

        if let Some(arity) = env_usize(ENV_TUPLE_ARITY)? {
            config.tuple_arity = Some(arity);
        }
        if let Some(max_arity) = env_usize(ENV_MAX_ARITY)? {
            config.max_arity = max_arity;
        }
        if let Some(limit) = env_usize(ENV_MAX_CONCURRENT_CALLBACKS)? {
            config.max_concurrent_callbacks = limit;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file; format is picked by extension
    /// (`.yaml`, `.yml`, `.toml`, `.json`).
    pub fn from_file(path: impl AsRef<Path>) -> TupleSpaceResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TupleSpaceError::InvalidConfiguration(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_lowercase();

        let config: SpaceConfig = match extension.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            "toml" => toml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            _ => {
                return Err(TupleSpaceError::InvalidConfiguration(format!(
                    "Unsupported config file format: {}. Use .yaml, .yml, .toml or .json",
                    path.display()
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }
}

fn env_usize(name: &str) -> TupleSpaceResult<Option<usize>> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse::<usize>().map(Some).map_err(|e| {
            TupleSpaceError::InvalidConfiguration(format!("{}='{}': {}", name, raw, e))
        }),
        Err(_) => Ok(None),
    }
}

impl TupleSpace {
    /// Create TupleSpace from environment variables (ENV - medium priority)
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_env() -> TupleSpaceResult<Self> {
        Self::with_config(SpaceConfig::from_env()?)
    }

    /// Create TupleSpace from a configuration file (FILE - low priority)
    ///
    /// Must be called from within a tokio runtime.
    pub fn from_file(path: impl AsRef<Path>) -> TupleSpaceResult<Self> {
        Self::with_config(SpaceConfig::from_file(path)?)
    }

    /// Create TupleSpace with smart defaults (Multi-source - fallback)
    ///
    /// Uses the environment when any `LINDA_*` variable is set, otherwise defaults.
    pub fn from_env_or_default() -> TupleSpaceResult<Self> {
        let any_set = [ENV_TUPLE_ARITY, ENV_MAX_ARITY, ENV_MAX_CONCURRENT_CALLBACKS]
            .iter()
            .any(|name| std::env::var(name).is_ok());

        if any_set {
            Self::from_env()
        } else {
            Self::with_config(SpaceConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Tests touching process environment must not interleave
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        std::env::remove_var(ENV_TUPLE_ARITY);
        std::env::remove_var(ENV_MAX_ARITY);
        std::env::remove_var(ENV_MAX_CONCURRENT_CALLBACKS);
    }

    /// Temp file with the given extension, removed when dropped
    fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_check_arity() {
        let config = SpaceConfig::default();
        assert!(config.check_arity(0).is_err());
        assert!(config.check_arity(3).is_ok());
        assert!(config.check_arity(65).is_err());

        let fixed = SpaceConfig {
            tuple_arity: Some(4),
            ..SpaceConfig::default()
        };
        assert!(fixed.check_arity(4).is_ok());
        let err = fixed.check_arity(3).unwrap_err();
        assert!(err.contains("expected arity 4"));
    }

    #[test]
    fn test_validate_rejects_contradictions() {
        let config = SpaceConfig {
            tuple_arity: Some(10),
            max_arity: 5,
            ..SpaceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TupleSpaceError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_from_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        std::env::set_var(ENV_TUPLE_ARITY, "3");
        std::env::set_var(ENV_MAX_CONCURRENT_CALLBACKS, "2");
        let config = SpaceConfig::from_env().unwrap();
        assert_eq!(config.tuple_arity, Some(3));
        assert_eq!(config.max_arity, DEFAULT_MAX_ARITY);
        assert_eq!(config.max_concurrent_callbacks, 2);

        std::env::set_var(ENV_MAX_ARITY, "lots");
        let err = SpaceConfig::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_ARITY));

        clear_env();
    }

    #[test]
    fn test_from_yaml_file() {
        let file = write_temp(".yaml", "tuple_arity: 4\nmax_concurrent_callbacks: 8\n");
        let config = SpaceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.tuple_arity, Some(4));
        assert_eq!(config.max_arity, DEFAULT_MAX_ARITY);
        assert_eq!(config.max_concurrent_callbacks, 8);
    }

    #[test]
    fn test_from_toml_file() {
        let file = write_temp(".toml", "max_arity = 8\n");
        let config = SpaceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_arity, 8);
        assert_eq!(config.tuple_arity, None);
    }

    #[test]
    fn test_from_file_unknown_extension() {
        let file = write_temp(".ini", "max_arity=8");
        let err = SpaceConfig::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported config file format"));
    }

    #[test]
    fn test_from_json_file_rejects_contradiction() {
        let file = write_temp(".json", r#"{"tuple_arity": 9, "max_arity": 4}"#);
        assert!(matches!(
            SpaceConfig::from_file(file.path()),
            Err(TupleSpaceError::InvalidConfiguration(_))
        ));
    }

    #[tokio::test]
    async fn test_space_from_file() {
        let file = write_temp(".yml", "tuple_arity: 2\n");
        let space = TupleSpace::from_file(file.path()).unwrap();
        assert_eq!(space.config().tuple_arity, Some(2));
    }

    #[tokio::test]
    async fn test_from_env_or_default_without_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let space = TupleSpace::from_env_or_default().unwrap();
        assert_eq!(space.config(), &SpaceConfig::default());
    }
}
