//! Dashboard landing page.
//!
//! SYSTEM CONTEXT
//! ==============
//! First route after sign-in. Greets the user by profile name; the summary
//! cards are static until the reporting modules land.

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

use leptos::prelude::*;

use crate::app::use_auth;
use crate::net::types::Profile;

/// Greeting line for `profile`, falling back to a generic name.
pub(crate) fn greeting(profile: Option<&Profile>) -> String {
    let name = profile
        .and_then(|p| p.full_name.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("User");
    format!("Welcome, {name}!")
}

const SUMMARY: [(&str, &str); 4] = [
    ("Active projects", "30"),
    ("Pending audits", "5"),
    ("Open non-conformities", "12"),
    ("Team members", "48"),
];

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();

    view! {
        <div class="dashboard-page">
            <section class="dashboard-welcome">
                <h1>{move || auth.state.with(|s| greeting(s.profile.as_ref()))}</h1>
                <p>"Here is the summary of your management system."</p>
            </section>
            <section class="dashboard-stats">
                {SUMMARY
                    .iter()
                    .map(|(title, value)| {
                        view! {
                            <div class="stat-card">
                                <p class="stat-card__title">{*title}</p>
                                <p class="stat-card__value">{*value}</p>
                            </div>
                        }
                    })
                    .collect_view()}
            </section>
        </div>
    }
}
