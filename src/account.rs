//! Account operations: registration, sign-in and profile management.
//!
//! Unlike lists and tasks, account calls have no local fallback; every
//! failure is returned to the caller.

use anyhow::{anyhow, Result};
use std::sync::Arc;

use crate::backend::{Backend, ChangePasswordArgs, Credentials, Profile, RegisterArgs};
use crate::constants::{ERROR_NOT_SIGNED_IN, ERROR_NO_BACKEND};
use crate::preferences::PreferenceStore;
use crate::session::AuthSession;

/// Service wrapping the account endpoints and the persisted token.
#[derive(Clone)]
pub struct AccountService {
    backend: Option<Arc<dyn Backend>>,
    auth: AuthSession,
    preferences: PreferenceStore,
}

impl AccountService {
    pub fn new(backend: Option<Arc<dyn Backend>>, auth: AuthSession, preferences: PreferenceStore) -> Self {
        Self {
            backend,
            auth,
            preferences,
        }
    }

    fn backend(&self) -> Result<&Arc<dyn Backend>> {
        self.backend.as_ref().ok_or_else(|| anyhow!(ERROR_NO_BACKEND))
    }

    fn token(&self) -> Result<String> {
        self.auth.token().ok_or_else(|| anyhow!(ERROR_NOT_SIGNED_IN))
    }

    /// Put the saved token, if any, back into the session.
    ///
    /// # Returns
    /// Whether a token was restored
    pub fn restore_session(&self) -> Result<bool> {
        match self.preferences.token()? {
            Some(token) => {
                self.auth.sign_in(token);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Create an account. Does not sign in.
    pub async fn register(&self, email: &str, username: &str, password: &str) -> Result<Profile> {
        let args = RegisterArgs {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        };
        let profile = self.backend()?.register(&args).await?;
        log::info!("👤 Registered account '{}'", profile.username);
        Ok(profile)
    }

    /// Obtain a token, persist it and start the session.
    pub async fn log_in(&self, username: &str, password: &str) -> Result<()> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        let token = self.backend()?.log_in(&credentials).await?;
        self.preferences.set_token(&token)?;
        self.auth.sign_in(token);
        log::info!("🔑 Signed in as '{}'", username);
        Ok(())
    }

    /// Revoke the token and end the session.
    ///
    /// A token the server no longer accepts is dropped locally as well.
    pub async fn log_out(&self) -> Result<()> {
        let token = self.token()?;
        match self.backend()?.log_out(&token).await {
            Ok(()) => {}
            Err(e) if e.status() == Some(401) => log::debug!("Token already revoked"),
            Err(e) => return Err(e.into()),
        }
        self.preferences.clear_token()?;
        self.auth.sign_out();
        log::info!("🔒 Signed out");
        Ok(())
    }

    /// Details of the signed-in account.
    pub async fn profile(&self) -> Result<Profile> {
        let token = self.token()?;
        Ok(self.backend()?.fetch_profile(&token).await?)
    }

    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        let token = self.token()?;
        let args = ChangePasswordArgs {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.backend()?.change_password(&token, &args).await?;
        log::info!("🔑 Password changed");
        Ok(())
    }
}
