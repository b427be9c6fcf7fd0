use crate::keys::{CONVERTER_KEY, EXECUTABLE_PATH_VALUE};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot open configuration key {key}: {source}")]
    KeyUnavailable {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration value {value} is missing: {source}")]
    ValueUnavailable {
        value: String,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration value {value} is not a string")]
    WrongType { value: String },
}

/// Read-only access to the machine-wide key/value store the installer writes.
pub trait ConfigStore: Send + Sync {
    /// Raw string data of `value` under `key`, exactly as stored (terminators
    /// included).
    fn read_string(&self, key: &str, value: &str) -> Result<String, ConfigError>;
}

/// Where the converter lives, as recorded by its installer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    pub executable_path: PathBuf,
}

impl ConverterConfig {
    pub fn load(store: &dyn ConfigStore) -> Result<Self, ConfigError> {
        let raw = store.read_string(CONVERTER_KEY, EXECUTABLE_PATH_VALUE)?;
        // Anything from the first terminator on is leftover buffer content.
        let executable_path = PathBuf::from(raw.split('\0').next().unwrap_or_default());

        tracing::debug!(target: "launcher", path = %executable_path.display(), "Converter location loaded");
        Ok(Self { executable_path })
    }
}

/// `HKEY_LOCAL_MACHINE`, opened with `KEY_READ` and closed after each read.
#[cfg(windows)]
pub struct RegistryStore;

#[cfg(windows)]
impl ConfigStore for RegistryStore {
    fn read_string(&self, key: &str, value: &str) -> Result<String, ConfigError> {
        use winreg::RegKey;
        use winreg::enums::{HKEY_LOCAL_MACHINE, KEY_READ, REG_SZ};

        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let opened = hklm
            .open_subkey_with_flags(key, KEY_READ)
            .map_err(|source| ConfigError::KeyUnavailable {
                key: key.to_string(),
                source,
            })?;

        let raw = opened
            .get_raw_value(value)
            .map_err(|source| ConfigError::ValueUnavailable {
                value: value.to_string(),
                source,
            })?;

        if !matches!(raw.vtype, REG_SZ) {
            return Err(ConfigError::WrongType {
                value: value.to_string(),
            });
        }

        let units: Vec<u16> = raw
            .bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        Ok(String::from_utf16_lossy(&units))
    }
}
