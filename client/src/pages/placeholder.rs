//! Stand-in for sections that are not built yet.

use leptos::prelude::*;

#[component]
pub fn PlaceholderPage(title: &'static str) -> impl IntoView {
    view! {
        <div class="placeholder-page">
            <h1>{title} " (in development)"</h1>
        </div>
    }
}
