use tracing::{debug, error, info, warn};

use crate::acquisition::{AcquisitionAction, AcquisitionInput, AcquisitionState};
use crate::capabilities::{BackendError, Capabilities};
use crate::config::BackendMode;
use crate::event::Event;
use crate::fields::{FieldHandle, FocusTarget};
use crate::model::{FormFieldErrors, Model, Screen, SettingsPrompt, UserRecord};
use crate::submission::{
    decode_records, record_document, RegistrationPayload, SubmissionAction, SubmissionInput,
    SubmissionState, SubmissionStep,
};
use crate::view::{self, ViewModel};
use crate::{AppError, ToastKind, REGISTRATION_SUCCESS_MESSAGE};

#[derive(Default)]
pub struct App;

impl App {
    fn open_register(model: &mut Model) {
        model.form.reset();
        model.acquisition = AcquisitionState::Idle;
        model.settings_prompt = None;
        model.screen = Screen::Register;
    }

    /// Leaving the register screen throws the form away. A submission that
    /// is still running keeps going; it just no longer owns the screen.
    fn leave_register(model: &mut Model) {
        if model.screen != Screen::Register {
            return;
        }
        if model.submission.in_flight() {
            debug!(
                step = model.submission.step_name(),
                "leaving register screen with submission in flight"
            );
            model.submission_detached = true;
        }
        model.form.reset();
        model.acquisition = AcquisitionState::Idle;
        model.settings_prompt = None;
        model.screen = Screen::UserList;
    }

    fn submit(model: &mut Model, caps: &Capabilities) {
        if model.submission.in_flight() {
            warn!(
                step = model.submission.step_name(),
                "submit ignored, registration already in flight"
            );
            return;
        }

        model.form.submission_attempted = true;
        match RegistrationPayload::prepare(&model.form.values) {
            Err(errors) => {
                debug!(
                    error_count = errors.error_count(),
                    "registration blocked by validation"
                );
                model.form.errors = errors;
            }
            Ok(payload) => {
                model.form.errors = FormFieldErrors::default();
                model.is_loading = true;
                model.register_success = false;
                model.register_failure = false;
                model.last_error = None;

                info!(backend = ?model.config.backend, "submitting registration");
                let step = SubmissionState::begin(payload, model.config.backend);
                Self::apply_submission_step(model, caps, step);
            }
        }
    }

    fn drive_submission(model: &mut Model, caps: &Capabilities, input: SubmissionInput) {
        let state = std::mem::take(&mut model.submission);
        let step = state.advance(input, &model.config.storage_prefix);
        Self::apply_submission_step(model, caps, step);
    }

    fn apply_submission_step(model: &mut Model, caps: &Capabilities, step: SubmissionStep) {
        model.submission = step.next;
        debug!(step = model.submission.step_name(), "submission advanced");

        match step.action {
            SubmissionAction::None => {}
            SubmissionAction::CreateAccount { email, password } => {
                caps.auth
                    .create_account(email, password, Event::AccountCreated);
            }
            SubmissionAction::UploadPhoto { path, local_uri } => {
                caps.storage
                    .upload_file(path, local_uri, Event::PhotoUploaded);
            }
            SubmissionAction::FetchDownloadUrl { path } => {
                caps.storage.download_url(path, Event::DownloadUrlResolved);
            }
            SubmissionAction::SaveDocument { record } => match record_document(&record) {
                Ok(document) => caps.documents.set_document(
                    model.config.users_collection.clone(),
                    record.id.to_string(),
                    document,
                    Event::DocumentSaved,
                ),
                Err(err) => {
                    model.submission = SubmissionState::Idle;
                    Self::fail(model, &err);
                }
            },
            SubmissionAction::Complete(record) => Self::complete(model, record),
            SubmissionAction::Fail(err) => Self::fail(model, &err),
        }
    }

    fn complete(model: &mut Model, record: UserRecord) {
        model.is_loading = false;
        model.register_success = true;

        let user_id = record.id.clone();
        match model.users.prepend(record) {
            Ok(()) => info!(user_id = %user_id, "user registered"),
            Err(err) => warn!(error = %err, "registered user was already listed"),
        }

        if std::mem::take(&mut model.submission_detached) {
            debug!(user_id = %user_id, "registration finished after its screen was left");
            return;
        }

        if model.screen == Screen::Register {
            Self::leave_register(model);
            model.show_toast(REGISTRATION_SUCCESS_MESSAGE, ToastKind::Success);
        }
    }

    /// The form keeps its values so the user can retry; the list is untouched.
    fn fail(model: &mut Model, err: &BackendError) {
        error!(kind = ?err.kind(), error = %err, "registration failed");

        model.is_loading = false;
        model.register_failure = true;
        model.last_error = Some(err.user_message());

        if std::mem::take(&mut model.submission_detached) {
            return;
        }
        let app_error = AppError::from(err);
        model.show_toast(app_error.user_facing_message(), ToastKind::Error);
    }

    fn drive_acquisition(model: &mut Model, caps: &Capabilities, input: AcquisitionInput) {
        let transition = model.acquisition.transition(input);
        model.acquisition = transition.next;

        match transition.action {
            AcquisitionAction::None => {}
            AcquisitionAction::CheckPermission(capability) => {
                caps.permissions.check(capability, move |state| {
                    Event::PermissionChecked { capability, state }
                });
            }
            AcquisitionAction::RequestPermission(capability) => {
                caps.permissions.request(capability, move |state| {
                    Event::PermissionRequested { capability, state }
                });
            }
            AcquisitionAction::OpenPicker(source) => {
                caps.image_picker
                    .acquire(source, model.config.picker.clone(), move |result| {
                        Event::ImagePicked {
                            source,
                            result: Box::new(result),
                        }
                    });
            }
            AcquisitionAction::ShowSettingsPrompt => {
                info!("device permission refused, offering settings");
                model.settings_prompt = Some(SettingsPrompt::permission_required());
            }
            AcquisitionAction::ApplyPhoto(path) => {
                debug!("profile picture selected");
                model.form.set_profile_photo(path);
            }
        }
    }

    fn load_users(model: &mut Model, caps: &Capabilities) {
        if model.config.backend == BackendMode::LocalOnly {
            debug!("local-only mode, nothing to load");
            return;
        }
        model.is_loading = true;
        model.last_error = None;
        caps.documents
            .list_documents(model.config.users_collection.clone(), Event::UsersLoaded);
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        if event.is_user_initiated() {
            debug!(event = event.name(), "user action");
        }

        if event.targets_form() && model.screen != Screen::Register {
            debug!(event = event.name(), "ignoring form event outside the register screen");
            return;
        }

        match event {
            Event::Configure(config) => match (*config).validated() {
                Ok(config) => {
                    info!(
                        backend = ?config.backend,
                        collection = %config.users_collection,
                        "configuration applied"
                    );
                    model.config = config;
                }
                Err(err) => {
                    warn!(error = %err, "configuration rejected");
                    model.set_error(AppError::from(&err));
                }
            },

            Event::LocalDateChanged { today } => model.local_date = Some(today),
            Event::RegisterRequested => Self::open_register(model),
            Event::BackRequested => Self::leave_register(model),
            Event::UsersRequested => Self::load_users(model, caps),

            Event::UsersLoaded(result) => {
                model.is_loading = false;
                match result {
                    Ok(documents) => {
                        let total = documents.len();
                        let records = decode_records(documents);
                        info!(total, loaded = records.len(), "users loaded");
                        model.users.replace_all(records);
                    }
                    Err(err) => {
                        error!(error = %err, "loading users failed");
                        model.last_error = Some(err.user_message());
                    }
                }
            }

            Event::ResetFlags => model.reset_flags(),
            Event::DismissToast => model.clear_toast(),
            Event::DismissError => model.clear_error(),

            Event::TextChanged { field, text } => model.form.field(field).set_value(&text),
            Event::FieldFocused { field } => model.form.field(field).focus(),
            Event::TextSubmitted { field } => match field.next_focus() {
                FocusTarget::Field(next) => model.form.field(next).focus(),
                FocusTarget::DismissKeyboard => model.form.dismiss_keyboard(),
                FocusTarget::DismissKeyboardAndSubmit => {
                    model.form.dismiss_keyboard();
                    Self::submit(model, caps);
                }
            },
            Event::GenderSelected(gender) => model.form.set_gender(gender),
            Event::QualificationSelected(qualification) => {
                model.form.set_qualification(qualification);
            }
            Event::DobSelected { date } => {
                let latest = view::latest_selectable_dob(model.today());
                if date > latest {
                    warn!(%date, %latest, "ignoring birth date after the selectable range");
                } else {
                    model.form.set_dob(date);
                }
            }
            Event::SubmitRequested => {
                model.form.dismiss_keyboard();
                Self::submit(model, caps);
            }

            Event::PhotoPickerOpened => {
                if model.acquisition.is_busy() {
                    debug!("photo acquisition already running");
                } else {
                    model.form.source_prompt_visible = true;
                }
            }
            Event::PhotoPickerDismissed => model.form.source_prompt_visible = false,
            Event::ImageSourceChosen(source) => {
                model.form.source_prompt_visible = false;
                Self::drive_acquisition(model, caps, AcquisitionInput::Start(source));
            }
            Event::PermissionChecked { capability, state } => {
                let input = AcquisitionInput::CheckResolved { capability, state };
                Self::drive_acquisition(model, caps, input);
            }
            Event::PermissionRequested { capability, state } => {
                let input = AcquisitionInput::RequestResolved { capability, state };
                Self::drive_acquisition(model, caps, input);
            }
            Event::ImagePicked { source, result } => {
                let input = AcquisitionInput::ImageResolved {
                    source,
                    result: *result,
                };
                Self::drive_acquisition(model, caps, input);
            }
            Event::SettingsPromptDismissed => model.settings_prompt = None,
            Event::OpenSettingsRequested => {
                model.settings_prompt = None;
                caps.permissions.open_settings();
            }

            Event::AccountCreated(result) => {
                Self::drive_submission(model, caps, SubmissionInput::AccountCreated(result));
            }
            Event::PhotoUploaded(result) => {
                Self::drive_submission(model, caps, SubmissionInput::PhotoUploaded(result));
            }
            Event::DownloadUrlResolved(result) => {
                Self::drive_submission(model, caps, SubmissionInput::DownloadUrl(result));
            }
            Event::DocumentSaved(result) => {
                Self::drive_submission(model, caps, SubmissionInput::DocumentSaved(result));
            }
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from_model(model)
    }
}
