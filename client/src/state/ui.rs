//! Local UI chrome state (theme, sidebar, expanded menus).
//!
//! DESIGN
//! ======
//! Keeps transient presentation concerns out of auth state so the layout can
//! evolve independently of session data.

#[cfg(test)]
#[path = "ui_test.rs"]
mod ui_test;

/// UI state for the guarded layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    pub dark_mode: bool,
    pub sidebar_collapsed: bool,
    pub user_menu_open: bool,
    /// Names of sidebar entries whose submenu is open.
    pub expanded_menus: Vec<String>,
}

impl UiState {
    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
    }

    pub fn toggle_submenu(&mut self, name: &str) {
        if let Some(pos) = self.expanded_menus.iter().position(|m| m == name) {
            self.expanded_menus.remove(pos);
        } else {
            self.expanded_menus.push(name.to_owned());
        }
    }

    /// Submenus are hidden while the sidebar is collapsed.
    pub fn submenu_visible(&self, name: &str) -> bool {
        !self.sidebar_collapsed && self.expanded_menus.iter().any(|m| m == name)
    }
}
