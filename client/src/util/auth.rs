//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Guarded routes apply identical unauthenticated redirect behavior, driven
//! by the session store rather than by any page-local state.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::state::auth::AuthState;

/// Where guarded routes send signed-out visitors.
pub const LOGIN_PATH: &str = "/login";

/// Redirect only once boot has settled; while loading, the outcome is unknown.
pub fn should_redirect_unauth(state: &AuthState) -> bool {
    !state.loading && !state.authenticated
}

/// Signed-in visitors on the public auth pages go to the dashboard.
pub fn should_redirect_auth(state: &AuthState) -> bool {
    !state.loading && state.authenticated
}

/// Redirect to `/login` whenever auth has loaded and no user is present.
pub fn install_unauth_redirect<F>(auth: RwSignal<AuthState>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        if auth.with(should_redirect_unauth) {
            navigate(LOGIN_PATH, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
}

/// Redirect to `target` once an authenticated user is present.
pub fn install_auth_redirect<F>(auth: RwSignal<AuthState>, navigate: F, target: &'static str)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        if auth.with(should_redirect_auth) {
            navigate(target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
}
