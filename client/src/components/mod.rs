//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components render the signed-in chrome and notifications while reading
//! shared state from Leptos context providers.

pub mod header;
pub mod main_layout;
pub mod sidebar;
pub mod toasts;
