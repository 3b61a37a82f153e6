//! Login/signup form validation.
//!
//! Checks run in a fixed order and the first failure wins:
//! email present → email shape → password present → (signup) username present
//! → (signup) passwords match → (signup) password length.

use std::fmt;

/// Minimum password length accepted at signup.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Which form is being submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        }
    }
}

/// Raw form values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub username: String,
}

/// Form field identifiers, used to place errors inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Email,
    Username,
    Password,
    ConfirmPassword,
}

/// First failing validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    EmailRequired,
    EmailInvalid,
    PasswordRequired,
    UsernameRequired,
    PasswordMismatch,
    PasswordTooShort,
}

impl ValidationError {
    /// The field the error belongs to.
    pub fn field(self) -> FormField {
        match self {
            ValidationError::EmailRequired | ValidationError::EmailInvalid => FormField::Email,
            ValidationError::PasswordRequired | ValidationError::PasswordTooShort => {
                FormField::Password
            }
            ValidationError::UsernameRequired => FormField::Username,
            ValidationError::PasswordMismatch => FormField::ConfirmPassword,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ValidationError::EmailRequired => "Email coordinates required",
            ValidationError::EmailInvalid => "Email coordinates are malformed",
            ValidationError::PasswordRequired => "Passphrase required",
            ValidationError::UsernameRequired => "Designation required",
            ValidationError::PasswordMismatch => "Passphrases do not harmonize",
            ValidationError::PasswordTooShort => "Passphrase must be at least 6 characters",
        };
        f.write_str(message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates a form for the given mode.
///
/// # Errors
/// Returns the first failing rule.
pub fn validate(mode: AuthMode, form: &AuthForm) -> Result<(), ValidationError> {
    let email = form.email.trim();
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if !is_email_shaped(email) {
        return Err(ValidationError::EmailInvalid);
    }
    if form.password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }

    if mode == AuthMode::Signup {
        if form.username.trim().is_empty() {
            return Err(ValidationError::UsernameRequired);
        }
        if form.password != form.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }
        if form.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort);
        }
    }

    Ok(())
}

/// `local@domain.tld`: one `@`, non-empty local part, and a domain with a dot
/// that has characters on both sides. No whitespace anywhere.
fn is_email_shaped(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .rsplit_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}
