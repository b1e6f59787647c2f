// src/common/config.rs
//! Environment driven configuration for the API server

use std::collections::HashSet;
use std::env;

pub const DEFAULT_ROLL_NUMBER_PREFIX: &str = "CB.SC.U4CSE";
pub const DEFAULT_LOGIN_EMAIL_DOMAIN: &str = "dashboard.local";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub auth_provider_url: Option<String>,
    pub auth_service_key: Option<String>,
    pub login_email_domain: String,
    pub admin_usernames: HashSet<String>,
    pub roll_number_prefix: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://shortlist.db".to_string());
        let jwt_secret =
            env::var("JWT_SECRET").unwrap_or_else(|_| "replace_with_strong_secret".to_string());
        let jwt_ttl_hours = env::var("JWT_TTL_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .unwrap_or(24);

        let auth_provider_url = env::var("AUTH_PROVIDER_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        let auth_service_key = env::var("AUTH_SERVICE_KEY").ok().filter(|k| !k.is_empty());

        let login_email_domain = env::var("LOGIN_EMAIL_DOMAIN")
            .unwrap_or_else(|_| DEFAULT_LOGIN_EMAIL_DOMAIN.to_string());

        let admin_usernames =
            parse_username_list(&env::var("ADMIN_USERNAMES").unwrap_or_default());

        let roll_number_prefix = env::var("ROLL_NUMBER_PREFIX")
            .unwrap_or_else(|_| DEFAULT_ROLL_NUMBER_PREFIX.to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Self {
            database_url,
            jwt_secret,
            jwt_ttl_hours,
            auth_provider_url,
            auth_service_key,
            login_email_domain,
            admin_usernames,
            roll_number_prefix,
            port,
            cors_origins,
        }
    }

    /// The identity provider account email for a dashboard username
    pub fn login_email(&self, username: &str) -> String {
        format!(
            "{}@{}",
            username.trim().to_lowercase(),
            self.login_email_domain
        )
    }
}

/// Parses a comma separated username list, lowercased and trimmed
pub fn parse_username_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_username_list() {
        let admins = parse_username_list(" Admin, hod ,,");
        assert_eq!(admins.len(), 2);
        assert!(admins.contains("admin"));
        assert!(admins.contains("hod"));
    }

    #[test]
    fn test_login_email_uses_domain() {
        let mut config = AppConfig::from_env();
        config.login_email_domain = "dashboard.local".to_string();
        assert_eq!(config.login_email(" Admin "), "admin@dashboard.local");
    }
}
