// create_user.rs
// Provisions a staff account at the identity provider and registers it locally

use anyhow::{anyhow, bail};
use clap::Parser;
use dotenv::dotenv;
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use shortlist_api::auth::handlers::ensure_staff_user;
use shortlist_api::auth::models::{ChangePasswordRequest, StaffRole};
use shortlist_api::auth::provider::IdentityProvider;
use shortlist_api::auth::validators::PasswordValidator;
use shortlist_api::common::{migrations, AppConfig, Validator};

#[derive(Parser, Debug)]
#[command(about = "Provision a staff account at the identity provider and register it locally")]
struct Args {
    /// Dashboard username; the provider email is derived from it
    #[arg(value_parser = parse_username)]
    username: String,

    /// Grant the admin role
    #[arg(long)]
    admin: bool,

    #[arg(long, env = "STAFF_PASSWORD", hide_env_values = true)]
    password: String,
}

fn parse_username(raw: &str) -> Result<String, String> {
    let username = raw.trim().to_lowercase();
    if username.is_empty() {
        return Err("username must not be blank".to_string());
    }
    Ok(username)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let Args {
        username,
        admin: make_admin,
        password,
    } = Args::parse();

    let validation = PasswordValidator.validate(&ChangePasswordRequest {
        password: password.clone(),
    });
    if !validation.is_valid {
        bail!(
            "{}",
            validation.first_message().unwrap_or("Password rejected")
        );
    }

    let config = AppConfig::from_env();
    let email = config.login_email(&username);

    println!("Creating staff user \"{}\"...", username);
    println!("(Identity provider account: {})\n", email);

    let identity = IdentityProvider::new(
        Client::new(),
        config.auth_provider_url.clone(),
        config.auth_service_key.clone(),
    );
    let account = identity
        .create_user(&email, &password)
        .await
        .map_err(|e| anyhow!("❌ {}", e))?;

    let connect_options =
        SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await?;
    migrations::create_schema(&pool).await?;

    let staff = ensure_staff_user(&pool, &config, &account, &username)
        .await
        .map_err(|e| anyhow!("❌ Could not register staff user: {}", e))?;

    if make_admin && staff.role() != StaffRole::Admin {
        sqlx::query("UPDATE staff_users SET role = ? WHERE id = ?")
            .bind(StaffRole::Admin.as_str())
            .bind(&staff.id)
            .execute(&pool)
            .await?;
    }

    let role = if make_admin {
        StaffRole::Admin
    } else {
        staff.role()
    };

    println!("✅ Staff user created!\n");
    println!("─────────────────────────────────────────────────");
    println!("Username: {}", staff.username);
    println!("Role:     {}", role.as_str());
    println!("ID:       {}", staff.id);
    println!("─────────────────────────────────────────────────");
    println!("\nSign in to the dashboard with this username and the chosen password.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_is_normalised() {
        let args =
            Args::try_parse_from(["create_staff_user", "  Priya ", "--admin", "--password", "x"])
                .unwrap();
        assert_eq!(args.username, "priya");
        assert!(args.admin);
    }

    #[test]
    fn test_blank_username_is_rejected() {
        assert!(Args::try_parse_from(["create_staff_user", "   ", "--password", "x"]).is_err());
    }
}
