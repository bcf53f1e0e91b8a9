use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::acquisition::AcquisitionState;
use crate::config::RegistrationConfig;
use crate::submission::SubmissionState;
use crate::validation;
use crate::{AppError, ToastMessage};

// --- Password: redacts Debug, zeroizes on Drop ---

#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn trimmed(&self) -> &str {
        self.0.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(UserId);

impl UserId {
    /// Locally unique id for registrations that never reach a backend.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

// --- Form fields ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Password,
    ConfirmPassword,
    MobileNumber,
    ProfilePhoto,
    Gender,
    Qualification,
    Dob,
}

impl FormField {
    pub const ALL: [Self; 10] = [
        Self::FirstName,
        Self::LastName,
        Self::Email,
        Self::Password,
        Self::ConfirmPassword,
        Self::MobileNumber,
        Self::ProfilePhoto,
        Self::Gender,
        Self::Qualification,
        Self::Dob,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::MobileNumber => "mobileNumber",
            Self::ProfilePhoto => "profilePhoto",
            Self::Gender => "gender",
            Self::Qualification => "qualification",
            Self::Dob => "dob",
        }
    }
}

/// Fields backed by a text input component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextField {
    FirstName,
    LastName,
    MobileNumber,
    Email,
    Password,
    ConfirmPassword,
}

impl From<TextField> for FormField {
    fn from(field: TextField) -> Self {
        match field {
            TextField::FirstName => Self::FirstName,
            TextField::LastName => Self::LastName,
            TextField::MobileNumber => Self::MobileNumber,
            TextField::Email => Self::Email,
            TextField::Password => Self::Password,
            TextField::ConfirmPassword => Self::ConfirmPassword,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualification {
    PostGraduate,
    Graduate,
    HscDiploma,
    Ssc,
}

impl Qualification {
    pub const ALL: [Self; 4] = [
        Self::PostGraduate,
        Self::Graduate,
        Self::HscDiploma,
        Self::Ssc,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PostGraduate => "Post Graduate",
            Self::Graduate => "Graduate",
            Self::HscDiploma => "HSC/Diploma",
            Self::Ssc => "SSC",
        }
    }
}

/// Live values of the registration form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldValues {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: Password,
    pub confirm_password: Password,
    pub mobile_number: Option<String>,
    pub profile_photo: String,
    pub gender: Option<Gender>,
    pub qualification: Option<Qualification>,
    pub dob: Option<NaiveDate>,
}

/// Per-field messages. An empty string means the field is fine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormFieldErrors {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub mobile_number: String,
    pub profile_photo: String,
    pub gender: String,
    pub qualification: String,
    pub dob: String,
}

impl FormFieldErrors {
    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::FirstName => &self.first_name,
            FormField::LastName => &self.last_name,
            FormField::Email => &self.email,
            FormField::Password => &self.password,
            FormField::ConfirmPassword => &self.confirm_password,
            FormField::MobileNumber => &self.mobile_number,
            FormField::ProfilePhoto => &self.profile_photo,
            FormField::Gender => &self.gender,
            FormField::Qualification => &self.qualification,
            FormField::Dob => &self.dob,
        }
    }

    pub fn set(&mut self, field: FormField, message: impl Into<String>) {
        let slot = match field {
            FormField::FirstName => &mut self.first_name,
            FormField::LastName => &mut self.last_name,
            FormField::Email => &mut self.email,
            FormField::Password => &mut self.password,
            FormField::ConfirmPassword => &mut self.confirm_password,
            FormField::MobileNumber => &mut self.mobile_number,
            FormField::ProfilePhoto => &mut self.profile_photo,
            FormField::Gender => &mut self.gender,
            FormField::Qualification => &mut self.qualification,
            FormField::Dob => &mut self.dob,
        };
        *slot = message.into();
    }

    /// Fields carrying a non-empty message, in form order.
    pub fn failing(&self) -> impl Iterator<Item = (FormField, &str)> + '_ {
        FormField::ALL
            .into_iter()
            .map(move |field| (field, self.get(field)))
            .filter(|(_, message)| !message.is_empty())
    }

    pub fn error_count(&self) -> usize {
        self.failing().count()
    }

    pub fn is_clean(&self) -> bool {
        self.error_count() == 0
    }
}

// --- Persisted user ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    /// Durable URL in remote mode, the picked file URI in local-only mode.
    pub profile_photo: String,
    pub gender: Gender,
    pub qualification: Qualification,
    /// Milliseconds since the Unix epoch, midnight UTC of the birth date.
    pub dob: i64,
}

impl UserRecord {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserListError {
    #[error("user {0} is already in the list")]
    DuplicateId(UserId),
}

/// Most-recent-first collection of registered users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserList {
    users: Vec<UserRecord>,
}

impl UserList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts at index 0. Ids are immutable once assigned, so a record whose
    /// id is already present is rejected and the list is left untouched.
    pub fn prepend(&mut self, record: UserRecord) -> Result<(), UserListError> {
        if self.contains(&record.id) {
            return Err(UserListError::DuplicateId(record.id));
        }
        self.users.insert(0, record);
        Ok(())
    }

    /// Replaces the contents, keeping the first occurrence of each id.
    pub fn replace_all(&mut self, records: impl IntoIterator<Item = UserRecord>) {
        let mut users: Vec<UserRecord> = Vec::new();
        for record in records {
            if !users.iter().any(|u| u.id == record.id) {
                users.push(record);
            }
        }
        self.users = users;
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.users.iter().any(|u| &u.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&UserRecord> {
        self.users.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserRecord> {
        self.users.iter()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

// --- Registration form controller state ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationForm {
    pub values: FormFieldValues,
    pub errors: FormFieldErrors,
    /// Set by the first submit; from then on every change re-validates.
    pub submission_attempted: bool,
    pub focused: Option<TextField>,
    pub source_prompt_visible: bool,
}

impl RegistrationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Recomputes the error mapping wholesale.
    pub fn revalidate(&mut self) {
        self.errors = validation::validate(&self.values).unwrap_or_default();
    }

    fn revalidate_if_submitted(&mut self) {
        if self.submission_attempted {
            self.revalidate();
        }
    }

    pub fn set_text(&mut self, field: TextField, text: &str) {
        let values = &mut self.values;
        match field {
            TextField::FirstName => values.first_name = text.to_string(),
            TextField::LastName => values.last_name = text.to_string(),
            TextField::Email => values.email = text.to_string(),
            TextField::Password => values.password = Password::new(text),
            TextField::ConfirmPassword => values.confirm_password = Password::new(text),
            TextField::MobileNumber => {
                values.mobile_number = if text.is_empty() {
                    None
                } else {
                    Some(text.to_string())
                };
            }
        }
        self.revalidate_if_submitted();
    }

    pub fn text(&self, field: TextField) -> String {
        let values = &self.values;
        match field {
            TextField::FirstName => values.first_name.clone(),
            TextField::LastName => values.last_name.clone(),
            TextField::Email => values.email.clone(),
            TextField::Password => values.password.expose().to_string(),
            TextField::ConfirmPassword => values.confirm_password.expose().to_string(),
            TextField::MobileNumber => values.mobile_number.clone().unwrap_or_default(),
        }
    }

    pub fn set_profile_photo(&mut self, uri: impl Into<String>) {
        self.values.profile_photo = uri.into();
        self.revalidate_if_submitted();
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.values.gender = Some(gender);
        self.revalidate_if_submitted();
    }

    pub fn set_qualification(&mut self, qualification: Qualification) {
        self.values.qualification = Some(qualification);
        self.revalidate_if_submitted();
    }

    pub fn set_dob(&mut self, dob: NaiveDate) {
        self.values.dob = Some(dob);
        self.revalidate_if_submitted();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    UserList,
    Register,
}

/// One-shot notification offering to open the system settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPrompt {
    pub title: String,
    pub message: String,
    pub action_label: String,
}

impl SettingsPrompt {
    pub fn permission_required() -> Self {
        Self {
            title: crate::PERMISSION_PROMPT_TITLE.into(),
            message: crate::PERMISSION_PROMPT_MESSAGE.into(),
            action_label: crate::PERMISSION_PROMPT_ACTION.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Model {
    pub screen: Screen,
    pub config: RegistrationConfig,
    pub form: RegistrationForm,
    pub users: UserList,
    pub acquisition: AcquisitionState,
    pub submission: SubmissionState,
    /// The register screen was left while a submission was in flight.
    pub submission_detached: bool,
    pub settings_prompt: Option<SettingsPrompt>,
    /// The device's calendar date, as last reported by the shell.
    pub local_date: Option<NaiveDate>,

    pub is_loading: bool,
    pub register_success: bool,
    pub register_failure: bool,
    pub last_error: Option<String>,

    pub active_error: Option<AppError>,
    pub active_toast: Option<ToastMessage>,
}

impl Model {
    /// The shell's local date. Falls back to the UTC date until the shell
    /// has reported one.
    pub fn today(&self) -> NaiveDate {
        self.local_date
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
    }

    pub fn set_error(&mut self, error: AppError) {
        self.active_error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.active_error = None;
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: crate::ToastKind) {
        self.active_toast = Some(ToastMessage::new(message, kind));
    }

    pub fn clear_toast(&mut self) {
        self.active_toast = None;
    }

    pub fn reset_flags(&mut self) {
        self.is_loading = false;
        self.register_success = false;
        self.register_failure = false;
        self.last_error = None;
    }
}
