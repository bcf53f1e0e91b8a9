//! Turns a validated form into a persisted [`UserRecord`].
//!
//! Remote mode runs four strictly ordered collaborator calls: create the
//! account, upload the picture, resolve its download URL, write the user
//! document. Each call's answer is fed back through [`SubmissionState::advance`],
//! which names the next call or the final outcome. Local-only mode skips the
//! collaborators and completes immediately with a generated id.
//!
//! Nothing is rolled back when a later step fails. An account created before a
//! failed upload stays behind, and a retry starts again from account creation.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::capabilities::{profile_photo_path, BackendError};
use crate::config::BackendMode;
use crate::model::{
    FormField, FormFieldErrors, FormFieldValues, Gender, Password, Qualification, UserId,
    UserRecord,
};
use crate::validation;

/// Everything a user record needs except its id and durable photo URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    pub local_photo_uri: String,
    pub gender: Gender,
    pub qualification: Qualification,
    pub dob: i64,
}

impl UserDraft {
    pub fn into_record(self, id: UserId, profile_photo: String) -> UserRecord {
        UserRecord {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            mobile_number: self.mobile_number,
            profile_photo,
            gender: self.gender,
            qualification: self.qualification,
            dob: self.dob,
        }
    }
}

/// The account credentials travel separately from the draft so the password
/// never ends up in anything that gets persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationPayload {
    pub email: String,
    pub password: Password,
    pub draft: UserDraft,
}

impl RegistrationPayload {
    /// Validates `values` and shapes them for the backend.
    ///
    /// # Errors
    ///
    /// Returns the full error mapping when any field fails validation.
    pub fn prepare(values: &FormFieldValues) -> Result<Self, FormFieldErrors> {
        if let Some(errors) = validation::validate(values) {
            return Err(errors);
        }

        let (Some(mobile_number), Some(gender), Some(qualification), Some(dob)) = (
            values.mobile_number.as_deref(),
            values.gender,
            values.qualification,
            values.dob,
        ) else {
            return Err(missing_selection_errors(values));
        };

        let email = values.email.trim().to_string();
        Ok(Self {
            email: email.clone(),
            password: values.password.clone(),
            draft: UserDraft {
                first_name: values.first_name.trim().to_string(),
                last_name: values.last_name.trim().to_string(),
                email,
                mobile_number: mobile_number.trim().to_string(),
                local_photo_uri: values.profile_photo.trim().to_string(),
                gender,
                qualification,
                dob: dob_epoch_ms(dob),
            },
        })
    }
}

fn missing_selection_errors(values: &FormFieldValues) -> FormFieldErrors {
    let mut errors = FormFieldErrors::default();
    for field in [
        FormField::MobileNumber,
        FormField::Gender,
        FormField::Qualification,
        FormField::Dob,
    ] {
        if let Some(message) = validation::check_field(field, values) {
            errors.set(field, message);
        }
    }
    errors
}

/// Midnight UTC of the birth date, in epoch milliseconds.
pub fn dob_epoch_ms(dob: NaiveDate) -> i64 {
    Utc.from_utc_datetime(&dob.and_time(NaiveTime::default()))
        .timestamp_millis()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    CreatingAccount {
        draft: UserDraft,
    },
    UploadingPhoto {
        id: UserId,
        path: String,
        draft: UserDraft,
    },
    ResolvingUrl {
        id: UserId,
        path: String,
        draft: UserDraft,
    },
    SavingDocument {
        record: UserRecord,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionInput {
    AccountCreated(Result<UserId, BackendError>),
    PhotoUploaded(Result<(), BackendError>),
    DownloadUrl(Result<String, BackendError>),
    DocumentSaved(Result<(), BackendError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionAction {
    None,
    CreateAccount { email: String, password: Password },
    UploadPhoto { path: String, local_uri: String },
    FetchDownloadUrl { path: String },
    SaveDocument { record: UserRecord },
    Complete(UserRecord),
    Fail(BackendError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionStep {
    pub next: SubmissionState,
    pub action: SubmissionAction,
}

impl SubmissionStep {
    fn to(next: SubmissionState, action: SubmissionAction) -> Self {
        Self { next, action }
    }

    fn finish(action: SubmissionAction) -> Self {
        Self::to(SubmissionState::Idle, action)
    }
}

impl SubmissionState {
    pub const fn in_flight(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    pub const fn step_name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CreatingAccount { .. } => "creating_account",
            Self::UploadingPhoto { .. } => "uploading_photo",
            Self::ResolvingUrl { .. } => "resolving_url",
            Self::SavingDocument { .. } => "saving_document",
        }
    }

    /// First step of a submission.
    pub fn begin(payload: RegistrationPayload, mode: BackendMode) -> SubmissionStep {
        let RegistrationPayload {
            email,
            password,
            draft,
        } = payload;

        match mode {
            BackendMode::LocalOnly => {
                let photo = draft.local_photo_uri.clone();
                SubmissionStep::finish(SubmissionAction::Complete(
                    draft.into_record(UserId::generate(), photo),
                ))
            }
            BackendMode::Remote => SubmissionStep::to(
                Self::CreatingAccount { draft },
                SubmissionAction::CreateAccount { email, password },
            ),
        }
    }

    #[must_use]
    pub fn advance(self, input: SubmissionInput, storage_prefix: &str) -> SubmissionStep {
        use SubmissionAction as A;

        match (self, input) {
            (Self::CreatingAccount { draft }, SubmissionInput::AccountCreated(result)) => {
                match result {
                    Ok(id) => {
                        let path =
                            profile_photo_path(storage_prefix, id.as_str(), &draft.local_photo_uri);
                        let local_uri = draft.local_photo_uri.clone();
                        SubmissionStep::to(
                            Self::UploadingPhoto {
                                id,
                                path: path.clone(),
                                draft,
                            },
                            A::UploadPhoto { path, local_uri },
                        )
                    }
                    Err(err) => SubmissionStep::finish(A::Fail(err)),
                }
            }

            (Self::UploadingPhoto { id, path, draft }, SubmissionInput::PhotoUploaded(result)) => {
                match result {
                    Ok(()) => SubmissionStep::to(
                        Self::ResolvingUrl {
                            id,
                            path: path.clone(),
                            draft,
                        },
                        A::FetchDownloadUrl { path },
                    ),
                    Err(err) => SubmissionStep::finish(A::Fail(err)),
                }
            }

            (Self::ResolvingUrl { id, draft, .. }, SubmissionInput::DownloadUrl(result)) => {
                match result.and_then(|url| parse_download_url(&url)) {
                    Ok(url) => {
                        let record = draft.into_record(id, url);
                        SubmissionStep::to(
                            Self::SavingDocument {
                                record: record.clone(),
                            },
                            A::SaveDocument { record },
                        )
                    }
                    Err(err) => SubmissionStep::finish(A::Fail(err)),
                }
            }

            (Self::SavingDocument { record }, SubmissionInput::DocumentSaved(result)) => {
                match result {
                    Ok(()) => SubmissionStep::finish(A::Complete(record)),
                    Err(err) => SubmissionStep::finish(A::Fail(err)),
                }
            }

            (state, input) => {
                tracing::warn!(
                    step = state.step_name(),
                    ?input,
                    "ignoring out-of-order submission response"
                );
                SubmissionStep::to(state, A::None)
            }
        }
    }
}

/// Accepts only absolute http(s) URLs.
///
/// # Errors
///
/// [`BackendError::InvalidDownloadUrl`] for anything else.
pub fn parse_download_url(raw: &str) -> Result<String, BackendError> {
    let invalid = || BackendError::InvalidDownloadUrl {
        url: raw.to_string(),
    };
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(url.to_string()),
        _ => Err(invalid()),
    }
}

/// JSON body written to the document store.
///
/// # Errors
///
/// [`BackendError::Encoding`] if the record cannot be serialized.
pub fn record_document(record: &UserRecord) -> Result<Value, BackendError> {
    serde_json::to_value(record).map_err(|e| BackendError::Encoding {
        reason: e.to_string(),
    })
}

/// Decodes listed documents, skipping any that do not describe a user.
pub fn decode_records(documents: Vec<Value>) -> Vec<UserRecord> {
    documents
        .into_iter()
        .enumerate()
        .filter_map(
            |(index, document)| match serde_json::from_value::<UserRecord>(document) {
                Ok(record) => Some(record),
                Err(err) => {
                    tracing::warn!(index, error = %err, "skipping malformed user document");
                    None
                }
            },
        )
        .collect()
}
