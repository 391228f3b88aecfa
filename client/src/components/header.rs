//! Top bar: brand, theme toggle and the user menu with sign-out.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::app::use_auth;
use crate::state::toast::Toasts;
use crate::state::ui::UiState;
use crate::util::dark_mode;
use crate::util::permissions::AccessGate;

#[component]
pub fn Header() -> impl IntoView {
    let auth = use_auth();
    let ui = expect_context::<RwSignal<UiState>>();
    let toasts = expect_context::<Toasts>();
    let navigate = use_navigate();

    let display_name = move || auth.state.with(|s| s.display_name().unwrap_or_default().to_owned());
    let position = move || {
        auth.state.with(|s| {
            s.profile
                .as_ref()
                .and_then(|p| p.position.clone())
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| "User".to_owned())
        })
    };
    let is_admin = move || auth.state.with(|s| AccessGate::from_state(s).is_admin());

    let on_toggle_theme = move |_| {
        let next = dark_mode::toggle(ui.get_untracked().dark_mode);
        ui.update(|u| u.dark_mode = next);
    };

    let on_logout = move |_| {
        ui.update(|u| u.user_menu_open = false);
        let Some(orchestrator) = auth.orchestrator() else {
            return;
        };
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            match orchestrator.logout().await {
                Ok(()) => navigate("/login", NavigateOptions::default()),
                Err(e) => toasts.error(e.message),
            }
        });
    };

    let close_menu = move |_| ui.update(|u| u.user_menu_open = false);

    view! {
        <header class="app-header">
            <a href="/dashboard" class="app-header__brand">
                <span class="app-header__logo">"T"</span>
                <span>"TETRAEDRO"</span>
            </a>
            <div class="app-header__actions">
                <button
                    class="app-header__icon"
                    aria-label="Toggle theme"
                    on:click=on_toggle_theme
                >
                    {move || if ui.with(|u| u.dark_mode) { "☀" } else { "☾" }}
                </button>
                <div class="user-menu">
                    <button
                        class="user-menu__trigger"
                        on:click=move |_| ui.update(|u| u.user_menu_open = !u.user_menu_open)
                    >
                        <span class="user-menu__name">{display_name}</span>
                        <span class="user-menu__position">{position}</span>
                    </button>
                    <Show when=move || ui.with(|u| u.user_menu_open)>
                        <div class="user-menu__dropdown">
                            <a href="/profile" on:click=close_menu>"My profile"</a>
                            <Show when=is_admin>
                                <a href="/settings" on:click=close_menu>"Settings"</a>
                            </Show>
                            <button class="user-menu__logout" on:click=on_logout.clone()>"Sign out"</button>
                        </div>
                    </Show>
                </div>
            </div>
        </header>
    }
}
