//! # tetraedro-client
//!
//! Leptos + WASM front end for the TETRAEDRO management dashboard.
//!
//! The crate's core is authentication and session state: the session store
//! (`state::auth`), the identity gateway (`net::auth_gateway`) over the
//! hosted service client (`net::supabase`), the orchestrator that keeps them
//! in sync (`state::orchestrator`) and the access gate
//! (`util::permissions`). Pages and components are a thin shell on top.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod pages;
pub mod state;
pub mod util;

/// Browser entry point: install logging and hydrate the server-rendered body.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::hydrate_body(app::App);
}
