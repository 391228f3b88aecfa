//! Renders the notification stack from `Toasts` context.

use leptos::prelude::*;

use crate::state::toast::Toasts;

#[component]
pub fn ToastStack() -> impl IntoView {
    let toasts = expect_context::<Toasts>();
    let state = toasts.state();

    view! {
        <div class="toast-stack" aria-live="polite">
            <For
                each=move || state.with(|s| s.items.clone())
                key=|t| t.id
                children=move |t| {
                    let id = t.id;
                    view! {
                        <div class=t.kind.css_class() role="status" on:click=move |_| toasts.dismiss(id)>
                            {t.message}
                        </div>
                    }
                }
            />
        </div>
    }
}
