//! Authenticated session handling and the login/register form.
//!
//! The session (bearer token + resolved user identity) persists in
//! localStorage so a reload lands straight in the game. The form itself
//! is a DOM-free state machine: keystroke routing, focus cycling, and
//! validation are plain data transitions, which keeps the whole login
//! flow unit-testable.

use serde::{Deserialize, Serialize};

/// localStorage key for the persisted session.
pub const SESSION_STORAGE_KEY: &str = "clicker-game-auth";

/// An authenticated session. `user_id` is the identity every save is
/// checked against before leaving the client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user_id: String,
    pub username: String,
}

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}

/// Restore a persisted session, discarding anything unreadable.
pub fn load_session() -> Option<AuthSession> {
    let storage = storage()?;
    let json = storage.get_item(SESSION_STORAGE_KEY).ok()??;
    match serde_json::from_str(&json) {
        Ok(session) => Some(session),
        Err(_) => {
            // A stale or corrupt entry would loop forever; drop it.
            let _ = storage.remove_item(SESSION_STORAGE_KEY);
            None
        }
    }
}

pub fn store_session(session: &AuthSession) {
    let json = match serde_json::to_string(session) {
        Ok(j) => j,
        Err(_) => return,
    };
    if let Some(storage) = storage() {
        if let Err(e) = storage.set_item(SESSION_STORAGE_KEY, &json) {
            web_sys::console::warn_1(
                &format!("failed to persist session: {:?}", e).into(),
            );
        }
    }
}

pub fn clear_session() {
    if let Some(storage) = storage() {
        let _ = storage.remove_item(SESSION_STORAGE_KEY);
    }
}

/// Which field of the form currently receives keystrokes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
    Username,
}

/// Login/register form state.
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub username: String,
    /// `false` = sign in, `true` = create account.
    pub register_mode: bool,
    pub focus: LoginField,
    /// Blocking auth error shown under the form (bad credentials,
    /// e-mail in use, …). No automatic retry.
    pub error: Option<String>,
    /// A request is in flight; input is ignored until it settles.
    pub busy: bool,
    /// One-shot notice, e.g. "account created, sign in".
    pub notice: Option<String>,
}

impl LoginForm {
    pub fn new() -> Self {
        Self {
            email: String::new(),
            password: String::new(),
            username: String::new(),
            register_mode: false,
            focus: LoginField::Email,
            error: None,
            busy: false,
            notice: None,
        }
    }

    fn focused_field(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
            LoginField::Username => &mut self.username,
        }
    }

    /// Route a printable character into the focused field. Editing
    /// clears any stale error.
    pub fn type_char(&mut self, c: char) {
        if self.busy || c.is_control() {
            return;
        }
        self.error = None;
        self.focused_field().push(c);
    }

    pub fn backspace(&mut self) {
        if self.busy {
            return;
        }
        self.error = None;
        self.focused_field().pop();
    }

    /// Cycle focus: email → password (→ username in register mode).
    pub fn next_field(&mut self) {
        self.focus = match (self.focus, self.register_mode) {
            (LoginField::Email, _) => LoginField::Password,
            (LoginField::Password, true) => LoginField::Username,
            (LoginField::Password, false) => LoginField::Email,
            (LoginField::Username, _) => LoginField::Email,
        };
    }

    /// Switch between sign-in and create-account modes.
    pub fn toggle_mode(&mut self) {
        if self.busy {
            return;
        }
        self.register_mode = !self.register_mode;
        self.error = None;
        self.notice = None;
        if !self.register_mode && self.focus == LoginField::Username {
            self.focus = LoginField::Email;
        }
    }

    /// Local validation before a request goes out. Mirrors what the
    /// server enforces so most mistakes never cost a round trip.
    pub fn validate(&self) -> Result<(), String> {
        if !self.email.contains('@') || self.email.len() < 3 {
            return Err("Enter a valid e-mail address.".to_string());
        }
        if self.register_mode {
            if self.password.chars().count() < 6 {
                return Err("Password must be at least 6 characters.".to_string());
            }
        } else if self.password.is_empty() {
            return Err("Password is required.".to_string());
        }
        Ok(())
    }

    /// The optional username for registration (empty means "let the
    /// server default it to the e-mail").
    pub fn username_opt(&self) -> Option<&str> {
        let trimmed = self.username.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_serializes_round_trip() {
        let session = AuthSession {
            token: "jwt-token".to_string(),
            user_id: "u-42".to_string(),
            username: "coinlord".to_string(),
        };
        let json = serde_json::to_string(&session).unwrap();
        let back: AuthSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn typing_goes_to_focused_field() {
        let mut form = LoginForm::new();
        for c in "a@b.c".chars() {
            form.type_char(c);
        }
        form.next_field();
        for c in "secret".chars() {
            form.type_char(c);
        }
        assert_eq!(form.email, "a@b.c");
        assert_eq!(form.password, "secret");
    }

    #[test]
    fn backspace_edits_focused_field() {
        let mut form = LoginForm::new();
        form.type_char('x');
        form.type_char('y');
        form.backspace();
        assert_eq!(form.email, "x");
        form.backspace();
        form.backspace(); // already empty, no panic
        assert_eq!(form.email, "");
    }

    #[test]
    fn focus_cycle_skips_username_in_login_mode() {
        let mut form = LoginForm::new();
        assert_eq!(form.focus, LoginField::Email);
        form.next_field();
        assert_eq!(form.focus, LoginField::Password);
        form.next_field();
        assert_eq!(form.focus, LoginField::Email);
    }

    #[test]
    fn focus_cycle_includes_username_when_registering() {
        let mut form = LoginForm::new();
        form.toggle_mode();
        form.next_field();
        form.next_field();
        assert_eq!(form.focus, LoginField::Username);
        form.next_field();
        assert_eq!(form.focus, LoginField::Email);
    }

    #[test]
    fn leaving_register_mode_fixes_focus() {
        let mut form = LoginForm::new();
        form.toggle_mode();
        form.focus = LoginField::Username;
        form.toggle_mode();
        assert_eq!(form.focus, LoginField::Email);
    }

    #[test]
    fn typing_clears_error() {
        let mut form = LoginForm::new();
        form.error = Some("Invalid e-mail or password".to_string());
        form.type_char('a');
        assert!(form.error.is_none());
    }

    #[test]
    fn busy_form_ignores_input() {
        let mut form = LoginForm::new();
        form.busy = true;
        form.type_char('a');
        form.backspace();
        form.toggle_mode();
        assert_eq!(form.email, "");
        assert!(!form.register_mode);
    }

    #[test]
    fn control_characters_are_dropped() {
        let mut form = LoginForm::new();
        form.type_char('\n');
        form.type_char('\t');
        assert_eq!(form.email, "");
    }

    #[test]
    fn validation_rules() {
        let mut form = LoginForm::new();
        assert!(form.validate().is_err()); // empty e-mail

        form.email = "a@b.c".to_string();
        assert!(form.validate().is_err()); // missing password

        form.password = "x".to_string();
        assert!(form.validate().is_ok()); // login mode: any non-empty password

        form.register_mode = true;
        assert!(form.validate().is_err()); // register mode: min 6 chars
        form.password = "secret".to_string();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn username_opt_trims_to_none() {
        let mut form = LoginForm::new();
        assert_eq!(form.username_opt(), None);
        form.username = "   ".to_string();
        assert_eq!(form.username_opt(), None);
        form.username = " coinlord ".to_string();
        assert_eq!(form.username_opt(), Some("coinlord"));
    }
}
