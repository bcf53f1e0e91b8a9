//! Permission-then-acquire flow for the profile picture.
//!
//! ```text
//! Idle --Start--> Checking
//! Checking:   GRANTED -> Acquiring
//!             DENIED  -> Requesting
//!             BLOCKED -> Idle + settings prompt
//! Requesting: GRANTED -> Acquiring
//!             DENIED | BLOCKED -> Idle + settings prompt
//! Acquiring:  image -> Idle + apply photo
//!             cancel | failure -> Idle, field untouched
//! ```
//!
//! The machine is pure: it returns the next state and the single side effect
//! the app must perform. Inputs that do not belong to the current state are
//! ignored so a late shell response can never resurrect a finished attempt.
//! Permission answers carry the capability they were asked about, and an answer
//! for any capability other than the one the current source needs is dropped.

use serde::{Deserialize, Serialize};

use crate::capabilities::{DeviceCapability, ImageSource, PermissionState, PickerResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AcquisitionState {
    #[default]
    Idle,
    Checking { source: ImageSource },
    Requesting { source: ImageSource },
    Acquiring { source: ImageSource },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionInput {
    Start(ImageSource),
    CheckResolved {
        capability: DeviceCapability,
        state: PermissionState,
    },
    RequestResolved {
        capability: DeviceCapability,
        state: PermissionState,
    },
    ImageResolved {
        source: ImageSource,
        result: PickerResult,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionAction {
    None,
    CheckPermission(DeviceCapability),
    RequestPermission(DeviceCapability),
    OpenPicker(ImageSource),
    ShowSettingsPrompt,
    ApplyPhoto(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: AcquisitionState,
    pub action: AcquisitionAction,
}

impl Transition {
    const fn to(next: AcquisitionState, action: AcquisitionAction) -> Self {
        Self { next, action }
    }

    const fn stay(state: AcquisitionState) -> Self {
        Self::to(state, AcquisitionAction::None)
    }
}

impl AcquisitionState {
    pub const fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }

    pub const fn source(self) -> Option<ImageSource> {
        match self {
            Self::Idle => None,
            Self::Checking { source } | Self::Requesting { source } | Self::Acquiring { source } => {
                Some(source)
            }
        }
    }

    #[must_use]
    pub fn transition(self, input: AcquisitionInput) -> Transition {
        use AcquisitionAction as A;

        match (self, input) {
            (Self::Idle, AcquisitionInput::Start(source)) => Transition::to(
                Self::Checking { source },
                A::CheckPermission(source.required_capability()),
            ),

            (Self::Checking { source }, AcquisitionInput::CheckResolved { capability, state })
                if capability == source.required_capability() =>
            {
                match state {
                    PermissionState::Granted => {
                        Transition::to(Self::Acquiring { source }, A::OpenPicker(source))
                    }
                    PermissionState::Denied => Transition::to(
                        Self::Requesting { source },
                        A::RequestPermission(capability),
                    ),
                    PermissionState::Blocked => Transition::to(Self::Idle, A::ShowSettingsPrompt),
                }
            }

            (Self::Requesting { source }, AcquisitionInput::RequestResolved { capability, state })
                if capability == source.required_capability() =>
            {
                if state.is_granted() {
                    Transition::to(Self::Acquiring { source }, A::OpenPicker(source))
                } else {
                    Transition::to(Self::Idle, A::ShowSettingsPrompt)
                }
            }

            (Self::Acquiring { source }, AcquisitionInput::ImageResolved { source: from, result })
                if from == source =>
            {
                match result {
                    Ok(image) if !image.path.trim().is_empty() => {
                        Transition::to(Self::Idle, A::ApplyPhoto(image.path))
                    }
                    Ok(_) => {
                        tracing::warn!(?source, "picker returned an image without a path");
                        Transition::stay(Self::Idle)
                    }
                    Err(err) if err.is_cancellation() => {
                        tracing::debug!(?source, "image selection cancelled");
                        Transition::stay(Self::Idle)
                    }
                    Err(err) => {
                        tracing::warn!(?source, error = %err, "image acquisition failed");
                        Transition::stay(Self::Idle)
                    }
                }
            }

            (state, input) => {
                tracing::debug!(?state, ?input, "ignoring acquisition input");
                Transition::stay(state)
            }
        }
    }
}
