//! Identity-service configuration.
//!
//! SYSTEM CONTEXT
//! ==============
//! The hosted auth/data service is addressed by a base URL and a public API
//! key. Both are injected at build time (`SUPABASE_URL`, `SUPABASE_ANON_KEY`)
//! so the WASM bundle and the SSR host agree without a config round trip.
//!
//! TRADE-OFFS
//! ==========
//! A missing key is only a warning: the shell still renders and every
//! subsequent service call fails with the service's own error message.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";

/// Connection settings for the hosted identity service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    pub url: String,
    pub anon_key: String,
}

impl ServiceConfig {
    /// Read the build-time environment once.
    pub fn from_build_env() -> Self {
        Self::from_values(option_env!("SUPABASE_URL"), option_env!("SUPABASE_ANON_KEY"))
    }

    /// Build a config from optional raw values, applying defaults.
    pub fn from_values(url: Option<&str>, anon_key: Option<&str>) -> Self {
        let url = url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_SERVICE_URL)
            .trim_end_matches('/')
            .to_owned();
        let anon_key = anon_key.map(str::trim).unwrap_or_default().to_owned();
        if anon_key.is_empty() {
            leptos::logging::warn!("SUPABASE_ANON_KEY is not configured; identity service calls will fail");
        }
        Self { url, anon_key }
    }

    pub fn has_anon_key(&self) -> bool {
        !self.anon_key.is_empty()
    }

    /// `{url}/auth/v1/{path}`
    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.url, path.trim_start_matches('/'))
    }

    /// `{url}/rest/v1/{path}`
    pub fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.url, path.trim_start_matches('/'))
    }

    /// `{url}/rest/v1/rpc/{name}`
    pub fn rpc_url(&self, name: &str) -> String {
        self.rest_url(&format!("rpc/{name}"))
    }
}
