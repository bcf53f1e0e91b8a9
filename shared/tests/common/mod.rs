#![allow(dead_code)]

use chrono::NaiveDate;
use crux_core::capability::Operation;
use crux_core::testing::{AppTester, Update};
use crux_core::Request;
use shared::capabilities::{
    AuthOperation, DocumentOperation, PermissionOperation, PermissionOutput, PickedImage,
    PickerOperation, PlatformPermission, StorageOperation,
};
use shared::{App, Effect, Event, Gender, Model, Qualification, TextField};

pub type Tester = AppTester<App, Effect>;

/// Feeds every event produced by `update` back into the app and returns all
/// effects requested along the way.
pub fn settle(app: &Tester, model: &mut Model, update: Update<Effect, Event>) -> Vec<Effect> {
    let mut effects = update.effects;
    for event in update.events {
        let next = app.update(event, model);
        effects.extend(settle(app, model, next));
    }
    effects
}

pub fn send(app: &Tester, model: &mut Model, event: Event) -> Vec<Effect> {
    let update = app.update(event, model);
    settle(app, model, update)
}

pub fn resolve<Op: Operation>(
    app: &Tester,
    model: &mut Model,
    request: &mut Request<Op>,
    output: Op::Output,
) -> Vec<Effect> {
    let update = app.resolve(request, output).expect("request resolves");
    settle(app, model, update)
}

pub fn permission_request(effects: Vec<Effect>) -> Option<Request<PermissionOperation>> {
    effects.into_iter().find_map(|effect| match effect {
        Effect::Permissions(request) => Some(request),
        _ => None,
    })
}

pub fn picker_request(effects: Vec<Effect>) -> Option<Request<PickerOperation>> {
    effects.into_iter().find_map(|effect| match effect {
        Effect::ImagePicker(request) => Some(request),
        _ => None,
    })
}

pub fn auth_request(effects: Vec<Effect>) -> Option<Request<AuthOperation>> {
    effects.into_iter().find_map(|effect| match effect {
        Effect::Auth(request) => Some(request),
        _ => None,
    })
}

pub fn storage_request(effects: Vec<Effect>) -> Option<Request<StorageOperation>> {
    effects.into_iter().find_map(|effect| match effect {
        Effect::Storage(request) => Some(request),
        _ => None,
    })
}

pub fn document_request(effects: Vec<Effect>) -> Option<Request<DocumentOperation>> {
    effects.into_iter().find_map(|effect| match effect {
        Effect::Documents(request) => Some(request),
        _ => None,
    })
}

pub fn has_backend_effect(effects: &[Effect]) -> bool {
    effects.iter().any(|effect| {
        matches!(
            effect,
            Effect::Auth(_) | Effect::Storage(_) | Effect::Documents(_)
        )
    })
}

pub fn status(permission: PlatformPermission) -> PermissionOutput {
    PermissionOutput::Status(permission)
}

pub fn type_text(app: &Tester, model: &mut Model, field: TextField, text: &str) {
    send(
        app,
        model,
        Event::TextChanged {
            field,
            text: text.to_string(),
        },
    );
}

/// Everything Scenario A needs except the picture.
pub fn fill_details(app: &Tester, model: &mut Model) {
    type_text(app, model, TextField::FirstName, "John");
    type_text(app, model, TextField::LastName, "Dough");
    type_text(app, model, TextField::MobileNumber, "9876543210");
    type_text(app, model, TextField::Email, "john@doe.com");
    type_text(app, model, TextField::Password, "abc123!");
    type_text(app, model, TextField::ConfirmPassword, "abc123!");
    send(app, model, Event::GenderSelected(Gender::Male));
    send(app, model, Event::QualificationSelected(Qualification::Graduate));
    send(
        app,
        model,
        Event::DobSelected {
            date: NaiveDate::from_ymd_opt(1990, 1, 2).expect("valid date"),
        },
    );
}

/// Runs the happy camera path: permission already granted, picture taken.
pub fn take_photo(app: &Tester, model: &mut Model, path: &str) {
    let effects = send(
        app,
        model,
        Event::ImageSourceChosen(shared::capabilities::ImageSource::Camera),
    );
    let mut check = permission_request(effects).expect("permission check");
    let effects = resolve(app, model, &mut check, status(PlatformPermission::Granted));
    let mut pick = picker_request(effects).expect("camera opened");
    resolve(app, model, &mut pick, Ok(PickedImage::from_path(path)));
}

pub fn open_filled_form(app: &Tester, model: &mut Model) {
    send(app, model, Event::RegisterRequested);
    fill_details(app, model);
    take_photo(app, model, "file:///x.jpg");
}
