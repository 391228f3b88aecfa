//! Identity-service boundary: wire types, errors, push channel and clients.
//!
//! SYSTEM CONTEXT
//! ==============
//! `identity` defines what the auth core needs from the hosted service,
//! `supabase` implements it over HTTP, and `auth_gateway` adapts it into the
//! uniform action/read surface used by the orchestrator.

pub mod auth_events;
pub mod auth_gateway;
pub mod error;
#[cfg(test)]
pub(crate) mod fake_identity;
pub mod identity;
pub mod supabase;
pub mod types;
