use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::PickerOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    /// Account, blob storage and document store collaborators are wired.
    #[default]
    Remote,
    /// No backend: registrations get a generated id and stay in memory.
    LocalOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    pub backend: BackendMode,
    pub users_collection: String,
    pub storage_prefix: String,
    pub picker: PickerOptions,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            backend: BackendMode::Remote,
            users_collection: crate::DEFAULT_USERS_COLLECTION.to_string(),
            storage_prefix: crate::DEFAULT_STORAGE_PREFIX.to_string(),
            picker: PickerOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must not contain '/': {value}")]
    ContainsSlash { field: &'static str, value: String },
}

impl RegistrationConfig {
    pub fn local_only() -> Self {
        Self::default().with_backend(BackendMode::LocalOnly)
    }

    pub fn with_backend(mut self, backend: BackendMode) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_users_collection(mut self, collection: impl Into<String>) -> Self {
        self.users_collection = collection.into();
        self
    }

    pub fn with_storage_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.storage_prefix = prefix.into();
        self
    }

    pub fn with_picker(mut self, picker: PickerOptions) -> Self {
        self.picker = picker;
        self
    }

    /// Trims names, normalizes the picker options and rejects names the
    /// backend would misread as paths.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] naming the first offending field.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.users_collection = check_name("users_collection", &self.users_collection)?;
        self.storage_prefix = check_name("storage_prefix", &self.storage_prefix)?;
        self.picker = self.picker.validated();
        Ok(self)
    }
}

fn check_name(field: &'static str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty { field });
    }
    if trimmed.contains('/') {
        return Err(ConfigError::ContainsSlash {
            field,
            value: trimmed.to_string(),
        });
    }
    Ok(trimmed.to_string())
}
