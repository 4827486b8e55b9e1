// Login form and credential checking

/// Decides whether a username/password pair may sign in.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialCheck {
    fn check(&self, username: &str, password: &str) -> bool;
}

/// Accepts any pair where both fields are filled in. There is no account
/// store behind this.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmptyCredentials;

impl CredentialCheck for NonEmptyCredentials {
    fn check(&self, username: &str, password: &str) -> bool {
        !username.is_empty() && !password.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    /// Set when the last sign-in attempt was refused by the checker.
    pub rejected: bool,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    pub const fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    pub fn push_char(&mut self, c: char) {
        self.rejected = false;
        self.focused_field_mut().push(c);
    }

    pub fn pop_char(&mut self) {
        self.rejected = false;
        self.focused_field_mut().pop();
    }

    pub fn masked_password(&self) -> String {
        "•".repeat(self.password.chars().count())
    }

    /// Run the checker against the form. An incomplete form is refused
    /// without consulting the checker.
    pub fn submit(&mut self, checker: &dyn CredentialCheck) -> bool {
        if !self.is_valid() {
            return false;
        }

        let accepted = checker.check(&self.username, &self.password);
        self.rejected = !accepted;
        if accepted {
            self.password.clear();
        }
        accepted
    }

    fn focused_field_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }
}
