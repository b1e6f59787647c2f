// src/common/dev_mode.rs
//! Development mode configuration and utilities
//! Allows bypassing authentication for testing purposes

use chrono::Utc;
use std::env;

use crate::auth::models::{StaffRole, StaffUser};

#[derive(Debug, Clone)]
pub struct DevModeConfig {
    pub enabled: bool,
    pub user_name: String,
    pub user_is_admin: bool,
}

impl DevModeConfig {
    pub fn from_env() -> Self {
        let enabled = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        let user_name = env::var("DEV_USER_NAME").unwrap_or_else(|_| "dev".to_string());

        let user_is_admin = env::var("DEV_USER_IS_ADMIN")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        Self {
            enabled,
            user_name,
            user_is_admin,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            user_name: "dev".to_string(),
            user_is_admin: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Create a dev staff user for testing
    /// Uses a fixed UUID so selections survive restarts
    pub fn create_dev_user(&self, email_domain: &str) -> StaffUser {
        let role = if self.user_is_admin {
            StaffRole::Admin
        } else {
            StaffRole::Professor
        };

        StaffUser {
            id: "00000000-0000-0000-0000-000000000001".to_string(),
            username: self.user_name.clone(),
            email: format!("{}@{}", self.user_name, email_domain),
            role: role.as_str().to_string(),
            created_at: Some(Utc::now().to_rfc3339()),
        }
    }
}

/// Print dev mode status on startup
pub fn print_dev_mode_status(config: &DevModeConfig) {
    if config.enabled {
        println!("⚠️  🔓 DEV MODE ENABLED 🔓 ⚠️");
        println!("   Authentication bypassed for testing");
        println!("   Dev User: {}", config.user_name);
        println!(
            "   Admin: {}",
            if config.user_is_admin { "Yes" } else { "No" }
        );
        println!("   ⚠️  DO NOT USE IN PRODUCTION ⚠️");
        println!();
    } else {
        println!("🔒 Production mode - Authentication required");
    }
}

/// CLI argument parsing for dev mode
pub fn parse_dev_mode_args<I>(args: I) -> Option<bool>
where
    I: IntoIterator<Item = String>,
{
    for arg in args {
        match arg.as_str() {
            "--dev" | "--dev-mode" => return Some(true),
            "--no-dev" | "--prod" | "--production" => return Some(false),
            _ => {}
        }
    }

    None
}

/// Override dev mode from CLI args
pub fn apply_cli_override(mut config: DevModeConfig) -> DevModeConfig {
    if let Some(cli_dev_mode) = parse_dev_mode_args(env::args()) {
        println!("🔧 CLI override: DEV_MODE = {}", cli_dev_mode);
        config.enabled = cli_dev_mode;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dev_mode_args() {
        let args = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        assert_eq!(parse_dev_mode_args(args(&["api", "--dev"])), Some(true));
        assert_eq!(parse_dev_mode_args(args(&["api", "--prod"])), Some(false));
        assert_eq!(parse_dev_mode_args(args(&["api"])), None);
    }

    #[test]
    fn test_dev_user_role_follows_admin_flag() {
        let mut config = DevModeConfig::disabled();
        assert_eq!(config.create_dev_user("dashboard.local").role, "professor");

        config.user_is_admin = true;
        let user = config.create_dev_user("dashboard.local");
        assert_eq!(user.role, "admin");
        assert_eq!(user.email, "dev@dashboard.local");
    }
}
