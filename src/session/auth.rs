use std::sync::{Arc, RwLock};

/// Route groups the guard distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteGroup {
    /// Log-in and registration screens
    Auth,
    /// Everything else
    App,
}

/// Where the guard sends the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Redirect {
    LogIn,
    Home,
}

/// Decide whether the current route must be left.
///
/// Signed-out users outside the auth group go to log-in; signed-in users
/// inside the auth group go home.
pub fn route_guard(signed_in: bool, group: RouteGroup) -> Option<Redirect> {
    match (signed_in, group) {
        (false, RouteGroup::App) => Some(Redirect::LogIn),
        (true, RouteGroup::Auth) => Some(Redirect::Home),
        _ => None,
    }
}

/// Current bearer token; the empty string means signed out.
#[derive(Clone, Default)]
pub struct AuthSession {
    token: Arc<RwLock<String>>,
}

impl AuthSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(token.into())),
        }
    }

    pub fn sign_in(&self, token: impl Into<String>) {
        if let Ok(mut current) = self.token.write() {
            *current = token.into();
        }
    }

    pub fn sign_out(&self) {
        if let Ok(mut current) = self.token.write() {
            current.clear();
        }
    }

    /// The token, if signed in.
    pub fn token(&self) -> Option<String> {
        let current = self.token.read().ok()?;
        (!current.is_empty()).then(|| current.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.token().is_some()
    }

    /// Guard decision for the given route group.
    pub fn redirect_for(&self, group: RouteGroup) -> Option<Redirect> {
        route_guard(self.is_signed_in(), group)
    }
}
