//! Root application component with routing and context providers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` builds the single session store, identity client and orchestrator
//! for the page, shares them through context, and starts the orchestrator
//! once hydration has finished. On the server only the reactive state is
//! provided; nothing talks to the identity service during SSR.

use leptos::prelude::*;
use leptos_meta::{MetaTags, Stylesheet, Title, provide_meta_context};
use leptos_router::{
    StaticSegment, WildcardSegment,
    components::{ParentRoute, Redirect, Route, Router, Routes},
};

use crate::components::main_layout::MainLayout;
use crate::components::toasts::ToastStack;
use crate::net::supabase::SupabaseClient;
use crate::pages::{
    dashboard::DashboardPage, login::LoginPage, placeholder::PlaceholderPage,
    register_company::RegisterCompanyPage,
};
use crate::state::auth::AuthState;
use crate::state::orchestrator::AuthOrchestrator;
use crate::state::toast::Toasts;
use crate::state::ui::UiState;

/// The orchestrator as wired in the browser.
pub type AppAuth = AuthOrchestrator<SupabaseClient>;

/// Auth handle shared through context: the reactive state everywhere, the
/// orchestrator only in the browser.
#[derive(Clone, Copy)]
pub struct AuthContext {
    pub state: RwSignal<AuthState>,
    #[cfg(feature = "hydrate")]
    orchestrator: StoredValue<AppAuth, LocalStorage>,
}

impl AuthContext {
    /// Orchestrator for running actions; `None` during SSR.
    pub fn orchestrator(&self) -> Option<AppAuth> {
        #[cfg(feature = "hydrate")]
        {
            self.orchestrator.try_get_value()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            None
        }
    }
}

/// Shorthand for `expect_context::<AuthContext>()`.
pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}

#[cfg(feature = "hydrate")]
fn build_auth_context() -> AuthContext {
    use std::rc::Rc;

    use crate::config::ServiceConfig;
    use crate::net::auth_gateway::AuthGateway;
    use crate::state::auth::AuthStore;
    use crate::util::storage::BrowserStorage;

    let store = AuthStore::new(Rc::new(BrowserStorage));
    let client = SupabaseClient::connect(ServiceConfig::from_build_env());
    let mut gateway = AuthGateway::new(client);
    if let Some(origin) = web_sys::window().and_then(|w| w.location().origin().ok()) {
        gateway = gateway.with_reset_origin(&origin);
    }
    let state = store.state();
    AuthContext { state, orchestrator: StoredValue::new_local(AuthOrchestrator::new(gateway, store)) }
}

#[cfg(not(feature = "hydrate"))]
fn build_auth_context() -> AuthContext {
    AuthContext { state: RwSignal::new(AuthState::default()) }
}

/// Rehydrate persisted state and start the orchestrator after hydration, so
/// the first client render matches the server's loading markup.
fn start_auth(auth: AuthContext) {
    Effect::new(move || {
        let Some(orchestrator) = auth.orchestrator() else {
            return;
        };
        orchestrator.store().rehydrate();
        leptos::task::spawn_local(async move { orchestrator.run().await });
    });
    on_cleanup(move || {
        if let Some(orchestrator) = auth.orchestrator() {
            orchestrator.shutdown();
        }
    });
}

/// HTML shell rendered on the server for SSR + hydration.
pub fn shell(options: LeptosOptions) -> impl IntoView {
    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}

/// Root application component.
///
/// Provides all shared state contexts and sets up client-side routing.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let auth = build_auth_context();
    let ui = RwSignal::new(UiState::default());
    let toasts = Toasts::new();

    provide_context(auth);
    provide_context(ui);
    provide_context(toasts);

    start_auth(auth);

    Effect::new(move || {
        let dark = crate::util::dark_mode::read_preference();
        crate::util::dark_mode::apply(dark);
        ui.update(|u| u.dark_mode = dark);
    });

    view! {
        <Stylesheet id="leptos" href="/pkg/tetraedro.css"/>
        <Title text="TETRAEDRO"/>

        <Router>
            <ToastStack/>
            <Routes fallback=|| view! { <Redirect path="/dashboard"/> }>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route path=StaticSegment("register-company") view=RegisterCompanyPage/>
                <ParentRoute path=StaticSegment("") view=MainLayout>
                    <Route path=StaticSegment("") view=|| view! { <Redirect path="/dashboard"/> }/>
                    <Route path=StaticSegment("dashboard") view=DashboardPage/>
                    <Route path=StaticSegment("processes") view=|| view! { <PlaceholderPage title="Processes"/> }/>
                    <Route path=StaticSegment("projects") view=|| view! { <PlaceholderPage title="Projects"/> }/>
                    <Route path=StaticSegment("audits") view=|| view! { <PlaceholderPage title="Audits"/> }/>
                    <Route
                        path=(StaticSegment("quality"), WildcardSegment("section"))
                        view=|| view! { <PlaceholderPage title="Quality"/> }
                    />
                    <Route path=StaticSegment("kpis") view=|| view! { <PlaceholderPage title="KPIs"/> }/>
                    <Route path=StaticSegment("documents") view=|| view! { <PlaceholderPage title="Documents"/> }/>
                    <Route path=StaticSegment("settings") view=|| view! { <PlaceholderPage title="Settings"/> }/>
                    <Route path=StaticSegment("profile") view=|| view! { <PlaceholderPage title="My Profile"/> }/>
                </ParentRoute>
            </Routes>
        </Router>
    }
}
