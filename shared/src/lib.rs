// lib.rs - User registration core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod acquisition;
pub mod app;
pub mod capabilities;
pub mod config;
pub mod event;
pub mod fields;
pub mod model;
pub mod submission;
pub mod validation;
pub mod view;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::{BackendMode, ConfigError, RegistrationConfig};
pub use crux_core::{render::Render, App as CruxApp};
pub use event::Event;
pub use model::{
    FormField, FormFieldErrors, FormFieldValues, Gender, Model, Password, Qualification,
    RegistrationForm, Screen, TextField, UserId, UserList, UserRecord,
};
pub use validation::validate;
pub use view::ViewModel;

pub const MIN_NAME_LENGTH: usize = 4;
pub const MOBILE_NUMBER_DIGITS: usize = 10;
pub const PASSWORD_MIN_LENGTH: usize = 7;
pub const PASSWORD_MAX_LENGTH: usize = 15;
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*";
pub const DEFAULT_USERS_COLLECTION: &str = "users";
pub const DEFAULT_STORAGE_PREFIX: &str = "users";
pub const DEFAULT_PHOTO_EXTENSION: &str = "jpg";
pub const UPLOAD_CACHE_CONTROL: &str = "no-store";
pub const PERMISSION_PROMPT_TITLE: &str = "Permission Required!";
pub const PERMISSION_PROMPT_MESSAGE: &str = "Please allow camera permission to continue.";
pub const PERMISSION_PROMPT_ACTION: &str = "Open Settings";
pub const REGISTRATION_SUCCESS_MESSAGE: &str = "User registered successfully.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Transient,
    Permanent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Authentication,
    Storage,
    Document,
    Configuration,
    InvalidState,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Authentication => "AUTH_ERROR",
            Self::Storage => "STORAGE_ERROR",
            Self::Document => "DOCUMENT_ERROR",
            Self::Configuration => "CONFIG_ERROR",
            Self::InvalidState => "INVALID_STATE",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Network | Self::Storage | Self::Document => ErrorSeverity::Transient,
            Self::Authentication | Self::Configuration | Self::InvalidState | Self::Unknown => {
                ErrorSeverity::Permanent
            }
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Storage | Self::Document)
    }
}

/// A failure the user should hear about.
///
/// Validation problems never become an `AppError`; they stay in
/// [`FormFieldErrors`] and are rendered inline next to each field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub message: String,
    pub internal_message: Option<String>,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            internal_message: None,
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => {
                "Unable to connect. Please check your internet connection and try again.".into()
            }
            ErrorKind::Authentication | ErrorKind::Configuration => self.message.clone(),
            ErrorKind::Storage => {
                "Unable to upload the profile picture. Please try again.".into()
            }
            ErrorKind::Document => "Unable to save your details. Please try again.".into(),
            ErrorKind::InvalidState | ErrorKind::Unknown => {
                "An unexpected error occurred. Please try again.".into()
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<&capabilities::BackendError> for AppError {
    fn from(err: &capabilities::BackendError) -> Self {
        Self::new(err.kind(), err.user_message()).with_internal(err.to_string())
    }
}

impl From<&ConfigError> for AppError {
    fn from(err: &ConfigError) -> Self {
        Self::new(ErrorKind::Configuration, err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToastMessage {
    pub message: String,
    pub kind: ToastKind,
    pub created_at_ms: u64,
    pub duration_ms: u64,
}

impl ToastMessage {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            created_at_ms: get_current_time_ms(),
            duration_ms: kind.default_duration_ms(),
        }
    }

    #[must_use]
    pub const fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at_ms) > self.duration_ms
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Success,
    Error,
}

impl ToastKind {
    #[must_use]
    pub const fn default_duration_ms(self) -> u64 {
        match self {
            Self::Success | Self::Error => 1500,
        }
    }
}

#[must_use]
pub fn get_current_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::BackendError;

    #[test]
    fn storage_errors_are_retryable() {
        let err = AppError::new(ErrorKind::Storage, "upload failed");
        assert!(err.is_retryable());
        assert_eq!(err.severity, ErrorSeverity::Transient);
        assert_eq!(err.code(), "STORAGE_ERROR");
    }

    #[test]
    fn auth_errors_surface_provider_message() {
        let backend = BackendError::Auth {
            code: "auth/email-already-in-use".into(),
            message: "The email address is already in use by another account.".into(),
        };
        let err = AppError::from(&backend);
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert!(!err.is_retryable());
        assert_eq!(
            err.user_facing_message(),
            "The email address is already in use by another account."
        );
        assert!(err.internal_message.is_some());
    }

    #[test]
    fn display_includes_code_and_internal() {
        let err = AppError::new(ErrorKind::Document, "write failed").with_internal("quota");
        assert_eq!(err.to_string(), "[DOCUMENT_ERROR] write failed (internal: quota)");
    }

    #[test]
    fn toast_expires_after_duration() {
        let toast = ToastMessage {
            message: "hi".into(),
            kind: ToastKind::Success,
            created_at_ms: 1_000,
            duration_ms: 1_500,
        };
        assert!(!toast.is_expired(2_000));
        assert!(toast.is_expired(2_501));
    }
}
