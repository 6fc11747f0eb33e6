use rustc_hash::FxHashMap;
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;

/// The configuration mapping for a training run.
///
/// A run configuration is a flat key/value mapping, immutable for the duration of a
/// run. The observer factory requires the keys `ckpt_path` (string), `tblog_path`
/// (string) and `azure_ml` (boolean); other keys are permitted and ignored here.
///
/// Configurations are usually loaded from a JSON file with [`from_reader`](RunConfig::from_reader),
/// but can also be assembled in code with [`new`](RunConfig::new) and
/// [`insert`](RunConfig::insert).
#[derive(Clone, PartialEq, Debug, Default)]
pub struct RunConfig {
    values: FxHashMap<String, Value>,
}

impl RunConfig {
    /// Create an empty run configuration.
    pub fn new() -> Self {
        RunConfig {
            values: FxHashMap::default(),
        }
    }

    /// Parse a run configuration from a reader yielding a JSON object.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] if the input is not a JSON object.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        let values: FxHashMap<String, Value> =
            serde_json::from_reader(reader).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(RunConfig { values })
    }

    /// Set a configuration value, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Read a required string-valued key as a filesystem path.
    ///
    /// # Errors
    /// [`ConfigError::MissingKey`] if the key is absent, [`ConfigError::WrongType`]
    /// if it holds a non-string value.
    pub fn path(&self, key: &str) -> Result<PathBuf, ConfigError> {
        match self.get(key)? {
            Value::String(s) => Ok(PathBuf::from(s)),
            _ => Err(ConfigError::WrongType {
                key: key.to_string(),
                expected: "string",
            }),
        }
    }

    /// Read a required boolean-valued key.
    ///
    /// # Errors
    /// [`ConfigError::MissingKey`] if the key is absent, [`ConfigError::WrongType`]
    /// if it holds a non-boolean value.
    pub fn flag(&self, key: &str) -> Result<bool, ConfigError> {
        match self.get(key)? {
            Value::Bool(b) => Ok(*b),
            _ => Err(ConfigError::WrongType {
                key: key.to_string(),
                expected: "boolean",
            }),
        }
    }

    fn get(&self, key: &str) -> Result<&Value, ConfigError> {
        self.values.get(key).ok_or_else(|| ConfigError::MissingKey {
            key: key.to_string(),
        })
    }
}

/// Errors that can occur when reading a run configuration.
///
/// These are raised eagerly, when the observer list is constructed, never deferred to
/// epoch-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required configuration key is absent
    MissingKey {
        /// the key that was absent
        key: String,
    },
    /// A configuration key holds a value of the wrong type
    WrongType {
        /// the offending key
        key: String,
        /// the type the key is required to hold
        expected: &'static str,
    },
    /// The configuration input could not be parsed as a JSON object
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::MissingKey { key } => {
                write!(f, "required configuration key '{}' is absent", key)
            }
            ConfigError::WrongType { key, expected } => {
                write!(f, "configuration key '{}' must hold a {}", key, expected)
            }
            ConfigError::Parse(message) => {
                write!(f, "unable to parse run configuration: {}", message)
            }
        }
    }
}

impl Error for ConfigError {}
