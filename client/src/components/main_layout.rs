//! Guarded layout for every signed-in route.
//!
//! SYSTEM CONTEXT
//! ==============
//! Wraps the nested routes with header and sidebar. While the orchestrator is
//! booting it shows a loading screen; once boot settles without a user it
//! redirects to `/login`.

use leptos::prelude::*;
use leptos_router::components::Outlet;
use leptos_router::hooks::use_navigate;

use crate::app::use_auth;
use crate::components::header::Header;
use crate::components::sidebar::Sidebar;
use crate::util::auth::install_unauth_redirect;

#[component]
pub fn LoadingScreen() -> impl IntoView {
    view! {
        <div class="loading-screen" role="status">
            <div class="loading-screen__spinner"></div>
            <p>"Loading..."</p>
        </div>
    }
}

#[component]
pub fn MainLayout() -> impl IntoView {
    let auth = use_auth();
    install_unauth_redirect(auth.state, use_navigate());

    let loading = move || auth.state.with(|s| s.loading);
    let authenticated = move || auth.state.with(|s| s.authenticated);

    view! {
        <Show when=move || !loading() fallback=|| view! { <LoadingScreen/> }>
            <Show when=authenticated>
                <div class="app-layout">
                    <Header/>
                    <div class="app-layout__body">
                        <Sidebar/>
                        <main class="app-layout__main">
                            <Outlet/>
                        </main>
                    </div>
                </div>
            </Show>
        </Show>
    }
}
