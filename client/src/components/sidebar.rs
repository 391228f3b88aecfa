//! Collapsible navigation sidebar.
//!
//! DESIGN
//! ======
//! The menu is static data; the access gate filters it per render so the
//! settings entry only shows for administrators.

#[cfg(test)]
#[path = "sidebar_test.rs"]
mod sidebar_test;

use leptos::prelude::*;

use crate::app::use_auth;
use crate::state::ui::UiState;
use crate::util::permissions::AccessGate;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubItem {
    pub name: &'static str,
    pub path: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MenuItem {
    pub name: &'static str,
    pub path: &'static str,
    pub submenu: &'static [SubItem],
    pub admin_only: bool,
}

const fn item(name: &'static str, path: &'static str) -> MenuItem {
    MenuItem { name, path, submenu: &[], admin_only: false }
}

pub const MENU: [MenuItem; 8] = [
    item("Dashboard", "/dashboard"),
    item("Processes", "/processes"),
    item("Projects", "/projects"),
    item("Audits", "/audits"),
    MenuItem {
        name: "Quality",
        path: "/quality",
        submenu: &[
            SubItem { name: "Non-conformities", path: "/quality/non-conformities" },
            SubItem { name: "Corrective actions", path: "/quality/corrective-actions" },
            SubItem { name: "Risks", path: "/quality/risks" },
        ],
        admin_only: false,
    },
    item("KPIs / BSC", "/kpis"),
    item("Documents", "/documents"),
    MenuItem { name: "Settings", path: "/settings", submenu: &[], admin_only: true },
];

/// Menu entries the gate allows.
pub fn visible_menu(gate: &AccessGate) -> Vec<MenuItem> {
    MENU.iter().copied().filter(|m| !m.admin_only || gate.is_admin()).collect()
}

#[component]
pub fn Sidebar() -> impl IntoView {
    let auth = use_auth();
    let ui = expect_context::<RwSignal<UiState>>();
    let collapsed = move || ui.with(|u| u.sidebar_collapsed);

    let entries = move || {
        let gate = auth.state.with(AccessGate::from_state);
        visible_menu(&gate)
            .into_iter()
            .map(|entry| render_entry(entry, ui))
            .collect_view()
    };

    view! {
        <aside class="sidebar" class:sidebar--collapsed=collapsed>
            <div class="sidebar__toggle">
                <button
                    aria-label=move || if collapsed() { "Expand sidebar" } else { "Collapse sidebar" }
                    on:click=move |_| ui.update(UiState::toggle_sidebar)
                >
                    {move || if collapsed() { "›" } else { "‹" }}
                </button>
            </div>
            <nav class="sidebar__nav">{entries}</nav>
            <Show when=move || !collapsed()>
                <p class="sidebar__footer">"TETRAEDRO v3.0"</p>
            </Show>
        </aside>
    }
}

fn render_entry(entry: MenuItem, ui: RwSignal<UiState>) -> impl IntoView {
    let collapsed = move || ui.with(|u| u.sidebar_collapsed);
    let label = move || (!collapsed()).then_some(entry.name);
    if entry.submenu.is_empty() {
        return view! {
            <div class="sidebar__entry">
                <a class="sidebar__link" href=entry.path title=entry.name>{label}</a>
            </div>
        }
        .into_any();
    }
    view! {
        <div class="sidebar__entry">
            <button
                class="sidebar__link"
                title=entry.name
                on:click=move |_| ui.update(|u| u.toggle_submenu(entry.name))
            >
                {label}
            </button>
            <Show when=move || ui.with(|u| u.submenu_visible(entry.name))>
                <div class="sidebar__submenu">
                    {entry
                        .submenu
                        .iter()
                        .map(|sub| view! { <a class="sidebar__sublink" href=sub.path>{sub.name}</a> })
                        .collect_view()}
                </div>
            </Show>
        </div>
    }
    .into_any()
}
