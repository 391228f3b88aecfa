//! Login page: email + password through the custom login procedure, plus
//! the password-reset request.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use crate::app::use_auth;
use crate::state::toast::Toasts;
use crate::util::auth::install_auth_redirect;

pub(crate) const MISSING_FIELDS: &str = "Please fill in all fields.";
pub(crate) const MISSING_EMAIL: &str = "Enter your email first.";

/// Trim and require both credentials.
pub(crate) fn validate_login_input(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(MISSING_FIELDS);
    }
    Ok((email.to_owned(), password.to_owned()))
}

pub(crate) fn validate_reset_input(email: &str) -> Result<String, &'static str> {
    let email = email.trim();
    if email.is_empty() {
        return Err(MISSING_EMAIL);
    }
    Ok(email.to_owned())
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let toasts = expect_context::<Toasts>();
    let navigate = use_navigate();
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());

    install_auth_redirect(auth.state, navigate.clone(), "/dashboard");

    let busy = move || auth.state.with(|s| s.loading);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let (email_value, password_value) = match validate_login_input(&email.get(), &password.get()) {
            Ok(values) => values,
            Err(msg) => {
                toasts.error(msg);
                return;
            }
        };
        let Some(orchestrator) = auth.orchestrator() else {
            return;
        };
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            match orchestrator.login(&email_value, &password_value).await {
                Ok(_) => {
                    toasts.success("Welcome to TETRAEDRO!");
                    navigate("/dashboard", NavigateOptions::default());
                }
                Err(e) => toasts.error(e.message),
            }
        });
    };

    let on_forgot = move |_| {
        let email_value = match validate_reset_input(&email.get()) {
            Ok(value) => value,
            Err(msg) => {
                toasts.error(msg);
                return;
            }
        };
        let Some(orchestrator) = auth.orchestrator() else {
            return;
        };
        leptos::task::spawn_local(async move {
            match orchestrator.reset_password(&email_value).await {
                Ok(()) => toasts.success(format!("A recovery email was sent to {email_value}")),
                Err(e) => toasts.error(e.message),
            }
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"TETRAEDRO"</h1>
                <p class="login-card__subtitle">"Business Management System v3.0"</p>
                <form class="login-form" on:submit=on_submit>
                    <label for="email">"Email"</label>
                    <input
                        id="email"
                        class="login-input"
                        type="email"
                        autocomplete="email"
                        placeholder="user@company.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <label for="password">"Password"</label>
                    <input
                        id="password"
                        class="login-input"
                        type="password"
                        autocomplete="current-password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <div class="login-form__links">
                        <A href="/register-company">"Register company"</A>
                        <button type="button" class="login-link" on:click=on_forgot>
                            "Forgot your password?"
                        </button>
                    </div>
                    <button class="login-button" type="submit" disabled=busy>
                        {move || if busy() { "Signing in..." } else { "Sign in" }}
                    </button>
                </form>
            </div>
        </div>
    }
}
