mod auth;
mod documents;
mod permissions;
mod picker;
mod storage;

pub use self::auth::{AccountCreated, Auth, AuthOperation};
pub use self::documents::{DocumentOperation, DocumentOutput, Documents};
pub use self::permissions::{
    DeviceCapability, PermissionError, PermissionOperation, PermissionOutput, PermissionState,
    Permissions, PlatformPermission,
};
pub use self::picker::{
    ImagePicker, ImageSource, MediaType, PickedImage, PickerError, PickerOperation, PickerOptions,
    PickerResult,
};
pub use self::storage::{profile_photo_path, Storage, StorageOperation, StorageOutput};

// We use Crux's built-in Render capability directly; the core only ever asks
// for a fresh view.
pub use crux_core::render::Render;

use serde::{Deserialize, Serialize};

use crate::app::App;
use crate::event::Event;
use crate::ErrorKind;

/// Failure reported by the account, blob storage or document collaborators.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum BackendError {
    #[error("account creation failed ({code}): {message}")]
    Auth { code: String, message: String },

    #[error("storage request failed: {message}")]
    Storage { message: String },

    #[error("document store request failed: {message}")]
    Document { message: String },

    #[error("network unavailable: {message}")]
    Network { message: String },

    #[error("download URL is not a valid http(s) URL: {url}")]
    InvalidDownloadUrl { url: String },

    #[error("unexpected response to {operation}")]
    UnexpectedResponse { operation: String },

    #[error("could not encode or decode a document: {reason}")]
    Encoding { reason: String },
}

impl BackendError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth { .. } => ErrorKind::Authentication,
            Self::Storage { .. } | Self::InvalidDownloadUrl { .. } => ErrorKind::Storage,
            Self::Document { .. } | Self::Encoding { .. } => ErrorKind::Document,
            Self::Network { .. } => ErrorKind::Network,
            Self::UnexpectedResponse { .. } => ErrorKind::Unknown,
        }
    }

    /// Text fit for a toast. Provider messages for account errors are shown
    /// as-is since they already explain the problem ("email already in use").
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Auth { .. } => "Unable to create your account. Please try again.".into(),
            Self::Storage { message } | Self::Document { message } | Self::Network { message } => {
                message.clone()
            }
            Self::InvalidDownloadUrl { .. } => {
                "Unable to upload the profile picture. Please try again.".into()
            }
            Self::UnexpectedResponse { .. } | Self::Encoding { .. } => {
                "Something went wrong. Please try again.".into()
            }
        }
    }
}

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub render: Render<Event>,
    pub permissions: Permissions<Event>,
    pub image_picker: ImagePicker<Event>,
    pub auth: Auth<Event>,
    pub storage: Storage<Event>,
    pub documents: Documents<Event>,
}
