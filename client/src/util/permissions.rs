//! Access gate: role and permission checks for route guards and UI.
//!
//! DESIGN
//! ======
//! Two modes behind one set of signatures:
//!
//! - **Parity** (`AccessGate::new`): any profile with an assigned role passes
//!   every role and permission check; a profile without one fails them all.
//!   This is the behavior the dashboard ships with today.
//! - **Resolved** (`AccessGate::with_role`): checks compare against the role
//!   row joined by `role_id`, using name equality for roles and permission
//!   set membership for permissions.
//!
//! TRADE-OFFS
//! ==========
//! Parity mode is a placeholder, not an authorization boundary. The hosted
//! service's row policies remain the real enforcement point.

#[cfg(test)]
#[path = "permissions_test.rs"]
mod permissions_test;

use crate::net::types::{Profile, Role};
use crate::state::auth::AuthState;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_QUALITY_MANAGER: &str = "quality_manager";
pub const ROLE_PROJECT_MANAGER: &str = "project_manager";
pub const ROLE_AUDITOR: &str = "auditor";

#[derive(Clone, Debug, PartialEq)]
enum Mode {
    Parity,
    Resolved(Option<Role>),
}

/// Capability checks for the current profile.
#[derive(Clone, Debug, PartialEq)]
pub struct AccessGate {
    role_id: Option<String>,
    mode: Mode,
}

impl AccessGate {
    /// Parity gate over `profile`.
    pub fn new(profile: Option<&Profile>) -> Self {
        Self { role_id: assigned_role(profile), mode: Mode::Parity }
    }

    /// Parity gate over the store's current profile.
    pub fn from_state(state: &AuthState) -> Self {
        Self::new(state.profile.as_ref())
    }

    /// Gate that checks against the resolved `role` row. A role whose id does
    /// not match the profile's `role_id` grants nothing.
    pub fn with_role(profile: Option<&Profile>, role: Option<Role>) -> Self {
        let role_id = assigned_role(profile);
        let role = role.filter(|r| role_id.as_deref() == Some(r.id.as_str()));
        Self { role_id, mode: Mode::Resolved(role) }
    }

    pub fn has_role(&self, name: &str) -> bool {
        if self.role_id.is_none() {
            return false;
        }
        match &self.mode {
            Mode::Parity => true,
            Mode::Resolved(role) => role.as_ref().is_some_and(|r| r.name == name),
        }
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        if self.role_id.is_none() {
            return false;
        }
        match &self.mode {
            Mode::Parity => true,
            Mode::Resolved(role) => role.as_ref().is_some_and(|r| r.grants(permission)),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    pub fn is_quality_manager(&self) -> bool {
        self.has_role(ROLE_QUALITY_MANAGER)
    }

    pub fn is_project_manager(&self) -> bool {
        self.has_role(ROLE_PROJECT_MANAGER)
    }

    pub fn is_auditor(&self) -> bool {
        self.has_role(ROLE_AUDITOR)
    }
}

fn assigned_role(profile: Option<&Profile>) -> Option<String> {
    profile.and_then(|p| p.role_id.clone()).filter(|id| !id.is_empty())
}
