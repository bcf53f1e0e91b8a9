use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capabilities::{
    BackendError, DeviceCapability, ImageSource, PermissionState, PickerResult,
};
use crate::config::RegistrationConfig;
use crate::model::{Gender, Qualification, TextField, UserId};

// --- Event enum: shell-facing variants first, capability responses skipped ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Bootstrap & navigation
    Configure(Box<RegistrationConfig>),
    /// Sent at bootstrap and whenever the device's calendar day rolls over.
    LocalDateChanged {
        today: NaiveDate,
    },
    RegisterRequested,
    BackRequested,
    UsersRequested,
    ResetFlags,
    DismissToast,
    DismissError,

    // Form input
    TextChanged {
        field: TextField,
        text: String,
    },
    TextSubmitted {
        field: TextField,
    },
    FieldFocused {
        field: TextField,
    },
    GenderSelected(Gender),
    QualificationSelected(Qualification),
    DobSelected {
        date: NaiveDate,
    },
    SubmitRequested,

    // Photo flow
    PhotoPickerOpened,
    PhotoPickerDismissed,
    ImageSourceChosen(ImageSource),
    SettingsPromptDismissed,
    OpenSettingsRequested,

    // Capability responses
    #[serde(skip)]
    PermissionChecked {
        capability: DeviceCapability,
        state: PermissionState,
    },
    #[serde(skip)]
    PermissionRequested {
        capability: DeviceCapability,
        state: PermissionState,
    },
    #[serde(skip)]
    ImagePicked {
        source: ImageSource,
        result: Box<PickerResult>,
    },
    #[serde(skip)]
    AccountCreated(Result<UserId, BackendError>),
    #[serde(skip)]
    PhotoUploaded(Result<(), BackendError>),
    #[serde(skip)]
    DownloadUrlResolved(Result<String, BackendError>),
    #[serde(skip)]
    DocumentSaved(Result<(), BackendError>),
    #[serde(skip)]
    UsersLoaded(Result<Vec<Value>, BackendError>),
}

impl Event {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Configure(_) => "configure",
            Self::RegisterRequested => "register_requested",
            Self::BackRequested => "back_requested",
            Self::UsersRequested => "users_requested",
            Self::ResetFlags => "reset_flags",
            Self::LocalDateChanged { .. } => "local_date_changed",
            Self::DismissToast => "dismiss_toast",
            Self::DismissError => "dismiss_error",
            Self::TextChanged { .. } => "text_changed",
            Self::TextSubmitted { .. } => "text_submitted",
            Self::FieldFocused { .. } => "field_focused",
            Self::GenderSelected(_) => "gender_selected",
            Self::QualificationSelected(_) => "qualification_selected",
            Self::DobSelected { .. } => "dob_selected",
            Self::SubmitRequested => "submit_requested",
            Self::PhotoPickerOpened => "photo_picker_opened",
            Self::PhotoPickerDismissed => "photo_picker_dismissed",
            Self::ImageSourceChosen(_) => "image_source_chosen",
            Self::SettingsPromptDismissed => "settings_prompt_dismissed",
            Self::OpenSettingsRequested => "open_settings_requested",
            Self::PermissionChecked { .. } => "permission_checked",
            Self::PermissionRequested { .. } => "permission_requested",
            Self::ImagePicked { .. } => "image_picked",
            Self::AccountCreated(_) => "account_created",
            Self::PhotoUploaded(_) => "photo_uploaded",
            Self::DownloadUrlResolved(_) => "download_url_resolved",
            Self::DocumentSaved(_) => "document_saved",
            Self::UsersLoaded(_) => "users_loaded",
        }
    }

    /// Events that only make sense while the register screen is shown.
    pub const fn targets_form(&self) -> bool {
        matches!(
            self,
            Self::TextChanged { .. }
                | Self::TextSubmitted { .. }
                | Self::FieldFocused { .. }
                | Self::GenderSelected(_)
                | Self::QualificationSelected(_)
                | Self::DobSelected { .. }
                | Self::SubmitRequested
                | Self::PhotoPickerOpened
                | Self::PhotoPickerDismissed
                | Self::ImageSourceChosen(_)
        )
    }

    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::RegisterRequested
                | Self::BackRequested
                | Self::UsersRequested
                | Self::DismissToast
                | Self::DismissError
                | Self::TextSubmitted { .. }
                | Self::GenderSelected(_)
                | Self::QualificationSelected(_)
                | Self::DobSelected { .. }
                | Self::SubmitRequested
                | Self::PhotoPickerOpened
                | Self::PhotoPickerDismissed
                | Self::ImageSourceChosen(_)
                | Self::SettingsPromptDismissed
                | Self::OpenSettingsRequested
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_events_round_trip_through_json() {
        let event = Event::TextChanged {
            field: TextField::FirstName,
            text: "John".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn capability_responses_are_not_shell_events() {
        let event = Event::PermissionChecked {
            capability: DeviceCapability::Camera,
            state: PermissionState::Granted,
        };
        assert!(serde_json::to_string(&event).is_err());
        assert!(!event.is_user_initiated());
    }

    #[test]
    fn keystrokes_are_not_user_actions() {
        let event = Event::TextChanged {
            field: TextField::Email,
            text: "j".into(),
        };
        assert!(!event.is_user_initiated());
        assert!(Event::SubmitRequested.is_user_initiated());
        assert_eq!(Event::SubmitRequested.name(), "submit_requested");
    }

    #[test]
    fn event_size_is_reasonable() {
        let size = std::mem::size_of::<Event>();
        assert!(
            size <= 128,
            "Event enum is {size} bytes, box the larger variants"
        );
    }
}
