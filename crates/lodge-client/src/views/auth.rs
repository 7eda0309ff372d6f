//! Login and registration forms.

use lodge_shared::types::{LoginRequest, LoginResponse, RegisterRequest};
use lodge_shared::validation::{validate_login, validate_register, Field, FormErrors};
use tracing::{error, info};

use crate::api::Outcome;
use crate::error::Result;
use crate::nav::Route;
use crate::state::AppState;

const LOGIN_FAILED: &str = "Login failed. Check your username and password.";
const REGISTER_FAILED: &str = "Registration failed. The email or username might already be taken.";

#[derive(Debug, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub errors: FormErrors,
    pub submitting: bool,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Returns whether the session is now logged in.
    pub async fn submit(&mut self, state: &AppState) -> Result<bool> {
        self.errors = validate_login(&self.username, &self.password);
        if !self.errors.is_empty() {
            return Ok(false);
        }

        self.submitting = true;
        let body = LoginRequest {
            username: &self.username,
            password: &self.password,
        };
        let result = state.api.post_json::<_, LoginResponse>("login/", &body).await;
        self.submitting = false;

        let response = match result {
            Ok(Outcome::Done(response)) => response,
            Ok(Outcome::Redirecting(_)) => return Ok(false),
            Err(e) => {
                error!(error = %e, "login failed");
                self.errors = FormErrors::single(Field::Form, LOGIN_FAILED);
                return Ok(false);
            }
        };

        {
            let mut session = state.session()?;
            session.set_token(Some(response.token))?;
            if let Some(user) = &response.user {
                session.set_user(user)?;
            }
        }
        info!(username = %self.username, "logged in");
        state.navigator.go(Route::Map);
        Ok(true)
    }
}

#[derive(Debug, Default)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub errors: FormErrors,
    pub submitting: bool,
}

impl RegisterForm {
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    pub async fn submit(&mut self, state: &AppState) -> Result<bool> {
        self.errors = validate_register(&self.email, &self.username, &self.password);
        if !self.errors.is_empty() {
            return Ok(false);
        }

        self.submitting = true;
        let body = RegisterRequest {
            username: &self.username,
            email: &self.email,
            password: &self.password,
        };
        let result = state.api.post_unit("register/", Some(&body)).await;
        self.submitting = false;

        match result {
            Ok(Outcome::Done(())) => {
                info!(username = %self.username, "registered");
                state.navigator.go(Route::Login);
                Ok(true)
            }
            Ok(Outcome::Redirecting(_)) => Ok(false),
            Err(e) => {
                error!(error = %e, "registration failed");
                self.errors = FormErrors::single(Field::Form, REGISTER_FAILED);
                Ok(false)
            }
        }
    }
}
