//! Application state shared through Leptos context.
//!
//! SYSTEM CONTEXT
//! ==============
//! `auth` holds the session store, `orchestrator` keeps it in sync with the
//! identity service, and `toast`/`ui` carry presentation-only state.

pub mod auth;
pub mod orchestrator;
pub mod toast;
pub mod ui;
