use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{
    FormFieldErrors, Gender, Model, Qualification, RegistrationForm, Screen, SettingsPrompt,
    TextField, UserRecord,
};
use crate::{AppError, ToastKind, ToastMessage};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ViewModel {
    pub screen: ScreenView,
    pub toast: Option<ToastView>,
    pub error: Option<ErrorView>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ScreenView {
    UserList(UserListView),
    Register(Box<RegisterView>),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserListView {
    pub users: Vec<UserItemView>,
    pub is_loading: bool,
    pub load_error: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserItemView {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub mobile_number: String,
    pub qualification: String,
    pub profile_photo: String,
}

impl From<&UserRecord> for UserItemView {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id.to_string(),
            display_name: user.display_name(),
            email: user.email.clone(),
            mobile_number: user.mobile_number.clone(),
            qualification: user.qualification.label().to_string(),
            profile_photo: user.profile_photo.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct QualificationOption {
    pub value: Qualification,
    pub label: String,
}

/// Everything the registration screen draws. Passwords are deliberately
/// absent: the text inputs own what the user typed.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RegisterView {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    pub profile_photo: Option<String>,
    pub gender: Option<Gender>,
    pub qualification: Option<Qualification>,
    pub dob: Option<NaiveDate>,
    pub latest_selectable_dob: NaiveDate,
    pub errors: FormFieldErrors,
    pub qualification_options: Vec<QualificationOption>,
    pub focused: Option<TextField>,
    pub source_prompt_visible: bool,
    pub settings_prompt: Option<SettingsPrompt>,
    pub is_acquiring_photo: bool,
    pub is_submitting: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ToastView {
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

impl From<&ToastMessage> for ToastView {
    fn from(toast: &ToastMessage) -> Self {
        Self {
            message: toast.message.clone(),
            kind: toast.kind,
            duration_ms: toast.duration_ms,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorView {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl From<&AppError> for ErrorView {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.user_facing_message(),
            retryable: err.is_retryable(),
        }
    }
}

/// The date picker never offers today or anything later.
pub fn latest_selectable_dob(today: NaiveDate) -> NaiveDate {
    today.pred_opt().unwrap_or(today)
}

fn register_view(model: &Model, form: &RegistrationForm) -> RegisterView {
    let values = &form.values;
    RegisterView {
        first_name: values.first_name.clone(),
        last_name: values.last_name.clone(),
        email: values.email.clone(),
        mobile_number: values.mobile_number.clone().unwrap_or_default(),
        profile_photo: (!values.profile_photo.is_empty()).then(|| values.profile_photo.clone()),
        gender: values.gender,
        qualification: values.qualification,
        dob: values.dob,
        latest_selectable_dob: latest_selectable_dob(model.today()),
        errors: form.errors.clone(),
        qualification_options: Qualification::ALL
            .into_iter()
            .map(|value| QualificationOption {
                value,
                label: value.label().to_string(),
            })
            .collect(),
        focused: form.focused,
        source_prompt_visible: form.source_prompt_visible,
        settings_prompt: model.settings_prompt.clone(),
        is_acquiring_photo: model.acquisition.is_busy(),
        is_submitting: model.submission.in_flight(),
    }
}

impl ViewModel {
    pub fn from_model(model: &Model) -> Self {
        let screen = match model.screen {
            Screen::UserList => ScreenView::UserList(UserListView {
                users: model.users.iter().map(UserItemView::from).collect(),
                is_loading: model.is_loading,
                load_error: model.last_error.clone(),
            }),
            Screen::Register => ScreenView::Register(Box::new(register_view(model, &model.form))),
        };

        Self {
            screen,
            toast: model.active_toast.as_ref().map(ToastView::from),
            error: model.active_error.as_ref().map(ErrorView::from),
        }
    }
}
