//! Helpers shared by pages, components and the auth core.
//!
//! SYSTEM CONTEXT
//! ==============
//! `storage` and `dark_mode` wrap browser APIs behind SSR-safe fallbacks;
//! `permissions` and `auth` are pure decisions over the session store.

pub mod auth;
pub mod dark_mode;
pub mod permissions;
pub mod storage;
