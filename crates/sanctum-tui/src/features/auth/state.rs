//! Auth form state.

use sanctum_core::validation::{AuthForm, AuthMode, FormField, ValidationError};

const LOGIN_FIELDS: &[FormField] = &[FormField::Email, FormField::Password];
const SIGNUP_FIELDS: &[FormField] = &[
    FormField::Email,
    FormField::Username,
    FormField::Password,
    FormField::ConfirmPassword,
];

#[derive(Debug, Clone)]
pub struct AuthState {
    pub mode: AuthMode,
    pub form: AuthForm,
    pub focus: FormField,
    /// Error shown under a specific field.
    pub field_error: Option<(FormField, String)>,
    /// Service failure, already carrying the fault marker.
    pub error: Option<String>,
    pub notice: Option<String>,
    /// Set after a sign-up; cleared when the form flips back to login.
    pub return_pending: bool,
    pub restoring: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            mode: AuthMode::Login,
            form: AuthForm::default(),
            focus: FormField::Email,
            field_error: None,
            error: None,
            notice: None,
            return_pending: false,
            restoring: false,
        }
    }
}

impl AuthState {
    pub fn fields(&self) -> &'static [FormField] {
        match self.mode {
            AuthMode::Login => LOGIN_FIELDS,
            AuthMode::Signup => SIGNUP_FIELDS,
        }
    }

    fn focus_index(&self) -> usize {
        self.fields()
            .iter()
            .position(|field| *field == self.focus)
            .unwrap_or(0)
    }

    pub fn focus_next(&mut self) {
        let fields = self.fields();
        self.focus = fields[(self.focus_index() + 1) % fields.len()];
    }

    pub fn focus_prev(&mut self) {
        let fields = self.fields();
        let index = self.focus_index();
        self.focus = fields[(index + fields.len() - 1) % fields.len()];
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Email => &self.form.email,
            FormField::Username => &self.form.username,
            FormField::Password => &self.form.password,
            FormField::ConfirmPassword => &self.form.confirm_password,
        }
    }

    pub fn value_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Email => &mut self.form.email,
            FormField::Username => &mut self.form.username,
            FormField::Password => &mut self.form.password,
            FormField::ConfirmPassword => &mut self.form.confirm_password,
        }
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggled());
    }

    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.return_pending = false;
        self.clear_messages();
        if !self.fields().contains(&self.focus) {
            self.focus = FormField::Email;
        }
    }

    pub fn show_validation(&mut self, err: ValidationError) {
        self.error = None;
        self.focus = err.field();
        self.field_error = Some((err.field(), err.to_string()));
    }

    pub fn error_for(&self, field: FormField) -> Option<&str> {
        self.field_error
            .as_ref()
            .filter(|(f, _)| *f == field)
            .map(|(_, message)| message.as_str())
    }

    pub fn clear_messages(&mut self) {
        self.field_error = None;
        self.error = None;
        self.notice = None;
    }

    pub fn clear_passwords(&mut self) {
        self.form.password.clear();
        self.form.confirm_password.clear();
    }
}

pub fn field_label(field: FormField) -> &'static str {
    match field {
        FormField::Email => "Email",
        FormField::Username => "Designation",
        FormField::Password => "Passphrase",
        FormField::ConfirmPassword => "Confirm",
    }
}

pub fn is_secret(field: FormField) -> bool {
    matches!(field, FormField::Password | FormField::ConfirmPassword)
}
