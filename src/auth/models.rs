//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// JWT claims structure
#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub exp: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffRole {
    Admin,
    Professor,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Admin => "admin",
            StaffRole::Professor => "professor",
        }
    }

    pub fn from_db(role: &str) -> Self {
        if role.eq_ignore_ascii_case("admin") {
            StaffRole::Admin
        } else {
            StaffRole::Professor
        }
    }
}

/// Staff user database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct StaffUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: Option<String>,
}

impl StaffUser {
    pub fn role(&self) -> StaffRole {
        StaffRole::from_db(&self.role)
    }
}

#[derive(Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
}

/// Public part of a staff user returned to the dashboard
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionUser {
    pub id: String,
    pub username: String,
    pub role: String,
    pub is_admin: bool,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}
