//! Registration form rules.
//!
//! Each field is checked independently: required first, then format, then
//! length or cross-field rules. The first failing check wins, so a field
//! never carries two messages.

use regex::Regex;
use std::sync::OnceLock;

use crate::model::{FormField, FormFieldErrors, FormFieldValues};
use crate::{MIN_NAME_LENGTH, MOBILE_NUMBER_DIGITS, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, PASSWORD_SYMBOLS};

pub const PASSWORD_POLICY_MESSAGE: &str = "Password should contain characters, number(s) and special symbols with min 7 length and max 15 length.";
pub const MOBILE_LENGTH_MESSAGE: &str = "Mobile number should contain exact 10 digits of input.";

/// Runs every rule over `values`.
///
/// Returns `None` when no field has a message. Otherwise the full mapping is
/// returned, including empty entries for fields that passed.
pub fn validate(values: &FormFieldValues) -> Option<FormFieldErrors> {
    let mut errors = FormFieldErrors::default();
    for field in FormField::ALL {
        if let Some(message) = check_field(field, values) {
            errors.set(field, message);
        }
    }

    if errors.is_clean() {
        None
    } else {
        Some(errors)
    }
}

/// The message for a single field, if it fails.
pub fn check_field(field: FormField, values: &FormFieldValues) -> Option<&'static str> {
    match field {
        FormField::FirstName => check_name(
            &values.first_name,
            "First name required.",
            "Only alphabets are allowed in first name.",
            "First name should contain more than 3 characters.",
        ),
        FormField::LastName => check_name(
            &values.last_name,
            "Last name required.",
            "Only alphabets are allowed in last name.",
            "Last name should contain more than 3 characters.",
        ),
        FormField::Email => {
            let email = values.email.trim();
            if email.is_empty() {
                Some("Email address required.")
            } else if !is_valid_email(email) {
                Some("Please enter a valid email address.")
            } else {
                None
            }
        }
        FormField::Password => {
            if values.password.is_blank() {
                Some("Password required.")
            } else if !is_valid_password(values.password.expose()) {
                Some(PASSWORD_POLICY_MESSAGE)
            } else {
                None
            }
        }
        FormField::ConfirmPassword => {
            if values.confirm_password.is_blank() {
                Some("Confirm password required.")
            } else if values.password.trimmed() != values.confirm_password.trimmed() {
                Some("Password and Confirm password does not match.")
            } else {
                None
            }
        }
        FormField::MobileNumber => {
            let mobile = values.mobile_number.as_deref().map_or("", str::trim);
            if mobile.is_empty() {
                Some("Mobile number required.")
            } else if !has_only_numbers(mobile) {
                Some("Mobile number should only contains digits.")
            } else if mobile.len() != MOBILE_NUMBER_DIGITS {
                Some(MOBILE_LENGTH_MESSAGE)
            } else {
                None
            }
        }
        FormField::ProfilePhoto => values
            .profile_photo
            .trim()
            .is_empty()
            .then_some("Please select profile picture."),
        FormField::Gender => values.gender.is_none().then_some("Please select gender."),
        FormField::Qualification => values
            .qualification
            .is_none()
            .then_some("Please select your qualification."),
        FormField::Dob => values
            .dob
            .is_none()
            .then_some("Please select your date of birth."),
    }
}

fn check_name(
    raw: &str,
    required: &'static str,
    not_alphabetic: &'static str,
    too_short: &'static str,
) -> Option<&'static str> {
    let name = raw.trim();
    if name.is_empty() {
        Some(required)
    } else if !has_only_characters(name) {
        Some(not_alphabetic)
    } else if name.chars().count() < MIN_NAME_LENGTH {
        Some(too_short)
    } else {
        None
    }
}

pub fn has_only_characters(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic())
}

pub fn has_only_numbers(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^(?-u:\w)+([.-]?(?-u:\w)+)*@(?-u:\w)+([.-]?(?-u:\w)+)*(\.(?-u:\w){2,3})+$")
            .expect("Failed to compile email regex")
    });
    regex.is_match(email)
}

/// 7-15 characters drawn from letters, digits and `!@#$%^&*`, with at least
/// one digit and one symbol.
pub fn is_valid_password(password: &str) -> bool {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&len) {
        return false;
    }

    let allowed = |c: char| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c);
    password.chars().all(allowed)
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gender, Password, Qualification};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn valid_values() -> FormFieldValues {
        FormFieldValues {
            first_name: "John".into(),
            last_name: "Dough".into(),
            email: "john@doe.com".into(),
            password: Password::new("abc123!"),
            confirm_password: Password::new("abc123!"),
            mobile_number: Some("9876543210".into()),
            profile_photo: "file:///x.jpg".into(),
            gender: Some(Gender::Male),
            qualification: Some(Qualification::Graduate),
            dob: NaiveDate::from_ymd_opt(1990, 5, 17),
        }
    }

    fn password_oracle(p: &str) -> bool {
        let symbols = "!@#$%^&*";
        let n = p.chars().count();
        (7..=15).contains(&n)
            && p.chars().any(|c| c.is_ascii_digit())
            && p.chars().any(|c| symbols.contains(c))
            && p.chars()
                .all(|c| c.is_ascii_alphanumeric() || symbols.contains(c))
    }

    #[test]
    fn complete_form_has_no_errors() {
        assert_eq!(validate(&valid_values()), None);
    }

    #[test]
    fn empty_form_flags_every_field() {
        let errors = validate(&FormFieldValues::default()).unwrap();
        assert_eq!(errors.error_count(), FormField::ALL.len());
        assert_eq!(errors.first_name, "First name required.");
        assert_eq!(errors.mobile_number, "Mobile number required.");
        assert_eq!(errors.profile_photo, "Please select profile picture.");
    }

    #[test]
    fn mapping_keeps_empty_entries_for_passing_fields() {
        let mut values = valid_values();
        values.email = "nope".into();
        let errors = validate(&values).unwrap();
        assert_eq!(errors.error_count(), 1);
        assert_eq!(errors.email, "Please enter a valid email address.");
        assert_eq!(errors.first_name, "");
    }

    #[test]
    fn three_letter_last_name_is_too_short() {
        let mut values = valid_values();
        values.last_name = "Doe".into();
        let errors = validate(&values).unwrap();
        assert_eq!(
            errors.last_name,
            "Last name should contain more than 3 characters."
        );
    }

    #[test]
    fn names_must_be_alphabetic() {
        let mut values = valid_values();
        values.first_name = "J0hnny".into();
        values.last_name = "Mc-Dough".into();
        let errors = validate(&values).unwrap();
        assert_eq!(errors.first_name, "Only alphabets are allowed in first name.");
        assert_eq!(errors.last_name, "Only alphabets are allowed in last name.");
    }

    #[test]
    fn format_check_wins_over_length_check() {
        let mut values = valid_values();
        values.first_name = "J1".into();
        let errors = validate(&values).unwrap();
        assert_eq!(errors.first_name, "Only alphabets are allowed in first name.");
    }

    #[test]
    fn whitespace_only_name_is_missing() {
        let mut values = valid_values();
        values.first_name = "   ".into();
        assert_eq!(
            validate(&values).unwrap().first_name,
            "First name required."
        );
    }

    #[test]
    fn five_digit_mobile_number_needs_ten_digits() {
        let mut values = valid_values();
        values.mobile_number = Some("12345".into());
        assert_eq!(validate(&values).unwrap().mobile_number, MOBILE_LENGTH_MESSAGE);
    }

    #[test]
    fn mobile_number_rejects_non_digits() {
        let mut values = valid_values();
        values.mobile_number = Some("98765-4321".into());
        assert_eq!(
            validate(&values).unwrap().mobile_number,
            "Mobile number should only contains digits."
        );
    }

    #[test]
    fn confirm_password_compares_trimmed_values() {
        let mut values = valid_values();
        values.confirm_password = Password::new(" abc123! ");
        assert_eq!(validate(&values), None);

        values.confirm_password = Password::new("abc123?");
        assert_eq!(
            validate(&values).unwrap().confirm_password,
            "Password and Confirm password does not match."
        );
    }

    #[test]
    fn password_policy_examples() {
        assert!(is_valid_password("abc123!"));
        assert!(is_valid_password("1!aaaaa"));
        assert!(!is_valid_password("abc123"));
        assert!(!is_valid_password("abcdefg!"));
        assert!(!is_valid_password("ab1!"));
        assert!(!is_valid_password("abc123!abc123!abc"));
        assert!(!is_valid_password("abc 123!"));
        assert!(!is_valid_password("  abc123!  "));
    }

    #[test]
    fn surrounding_spaces_break_the_password_policy() {
        let mut values = valid_values();
        values.password = Password::new("  abc123!  ");
        values.confirm_password = Password::new("abc123!");
        let errors = validate(&values).unwrap();
        assert_eq!(errors.password, PASSWORD_POLICY_MESSAGE);
        assert_eq!(errors.confirm_password, "");
    }

    #[test]
    fn email_examples() {
        assert!(is_valid_email("john@doe.com"));
        assert!(is_valid_email("john.smith-jr@mail.example.org"));
        assert!(!is_valid_email("john@doe"));
        assert!(!is_valid_email("@doe.com"));
        assert!(!is_valid_email("john doe@x.com"));
        assert!(!is_valid_email("john@doe.comma"));
        assert!(!is_valid_email("jöhn@dóe.com"));
        assert!(!is_valid_email("ユーザー@例え.コム"));
    }

    #[test]
    fn selections_are_required() {
        let mut values = valid_values();
        values.gender = None;
        values.qualification = None;
        values.dob = None;
        let errors = validate(&values).unwrap();
        assert_eq!(errors.gender, "Please select gender.");
        assert_eq!(errors.qualification, "Please select your qualification.");
        assert_eq!(errors.dob, "Please select your date of birth.");
    }

    proptest! {
        #[test]
        fn password_rule_matches_policy(p in "[a-zA-Z0-9!@#$%^&*? ]{0,20}") {
            let mut values = valid_values();
            values.password = Password::new(p.clone());
            values.confirm_password = Password::new(p.clone());
            let flagged = validate(&values)
                .map_or(false, |e| !e.password.is_empty());
            prop_assert_eq!(flagged, !password_oracle(&p));
        }

        #[test]
        fn confirm_mismatch_iff_trimmed_values_differ(
            p in "[a-z0-9!]{1,12}",
            c in "[a-z0-9!]{1,12}",
        ) {
            let mut values = valid_values();
            values.password = Password::new(p.clone());
            values.confirm_password = Password::new(c.clone());
            let flagged = validate(&values)
                .map_or(false, |e| !e.confirm_password.is_empty());
            prop_assert_eq!(flagged, p.trim() != c.trim());
        }

        #[test]
        fn mobile_rule_matches_digit_count(m in "[0-9a-z]{0,14}") {
            let mut values = valid_values();
            values.mobile_number = if m.is_empty() { None } else { Some(m.clone()) };
            let flagged = validate(&values)
                .map_or(false, |e| !e.mobile_number.is_empty());
            let ok = m.len() == 10 && m.chars().all(|c| c.is_ascii_digit());
            prop_assert_eq!(flagged, !ok);
        }

        #[test]
        fn validate_is_idempotent(
            first in "[A-Za-z0-9 ]{0,8}",
            email in "[a-z@.]{0,12}",
            mobile in proptest::option::of("[0-9]{0,12}"),
        ) {
            let mut values = valid_values();
            values.first_name = first;
            values.email = email;
            values.mobile_number = mobile;
            prop_assert_eq!(validate(&values), validate(&values));
        }

        #[test]
        fn any_missing_required_text_field_is_reported(which in 0usize..4) {
            let mut values = valid_values();
            let field = match which {
                0 => { values.first_name.clear(); FormField::FirstName }
                1 => { values.last_name.clear(); FormField::LastName }
                2 => { values.email.clear(); FormField::Email }
                _ => { values.profile_photo.clear(); FormField::ProfilePhoto }
            };
            let errors = validate(&values).unwrap();
            prop_assert!(!errors.get(field).is_empty());
        }
    }
}
