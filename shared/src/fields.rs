//! Handle-based access to individual text inputs.
//!
//! Each input exposes the same three operations to the form controller:
//! set its value, read its value, take focus. The controller never reaches
//! into an input any other way.

use crate::model::{RegistrationForm, TextField};

pub trait FieldHandle {
    fn set_value(&mut self, value: &str);
    fn value(&self) -> String;
    fn focus(&mut self);
}

/// Where focus goes after the user presses the return key in a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Field(TextField),
    DismissKeyboard,
    DismissKeyboardAndSubmit,
}

impl TextField {
    #[must_use]
    pub const fn next_focus(self) -> FocusTarget {
        match self {
            Self::FirstName => FocusTarget::Field(Self::LastName),
            Self::LastName => FocusTarget::Field(Self::MobileNumber),
            Self::MobileNumber => FocusTarget::Field(Self::Email),
            Self::Email => FocusTarget::DismissKeyboard,
            Self::Password => FocusTarget::Field(Self::ConfirmPassword),
            Self::ConfirmPassword => FocusTarget::DismissKeyboardAndSubmit,
        }
    }
}

pub struct TextFieldHandle<'a> {
    form: &'a mut RegistrationForm,
    field: TextField,
}

impl FieldHandle for TextFieldHandle<'_> {
    fn set_value(&mut self, value: &str) {
        self.form.set_text(self.field, value);
    }

    fn value(&self) -> String {
        self.form.text(self.field)
    }

    fn focus(&mut self) {
        self.form.focused = Some(self.field);
    }
}

impl RegistrationForm {
    pub fn field(&mut self, field: TextField) -> TextFieldHandle<'_> {
        TextFieldHandle { form: self, field }
    }

    pub fn dismiss_keyboard(&mut self) {
        self.focused = None;
    }
}
