// src/auth/validators.rs

use super::models::{ChangePasswordRequest, LoginRequest};
use crate::common::{ValidationResult, Validator};

const COMMON_PASSWORDS: [&str; 4] = ["password", "12345678", "qwerty", "abc123"];

pub struct LoginValidator;

impl Validator<LoginRequest> for LoginValidator {
    fn validate(&self, data: &LoginRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        let username = data.username.trim();
        if username.is_empty() {
            result.add_error("username", "Username is required");
        } else if username.len() > 64 {
            result.add_error("username", "Username must not exceed 64 characters");
        } else if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            result.add_error(
                "username",
                "Username may only contain letters, digits, '.', '_' and '-'",
            );
        }

        if data.password.is_empty() {
            result.add_error("password", "Password is required");
        }

        result
    }
}

pub struct PasswordValidator;

impl Validator<ChangePasswordRequest> for PasswordValidator {
    fn validate(&self, data: &ChangePasswordRequest) -> ValidationResult {
        let mut result = ValidationResult::new();
        let password = &data.password;

        if password.is_empty() {
            result.add_error("password", "Password is required");
            return result;
        }

        let length = password.chars().count();
        if length < 8 {
            result.add_error("password", "Password must be at least 8 characters long");
        } else if length > 128 {
            result.add_error("password", "Password is too long");
        }

        let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
        let has_digit = password.chars().any(|c| c.is_ascii_digit());
        if !has_letter || !has_digit {
            result.add_error(
                "password",
                "Password must contain at least one letter and one number",
            );
        }

        let lowered = password.to_lowercase();
        if COMMON_PASSWORDS.iter().any(|common| lowered.contains(common)) {
            result.add_error(
                "password",
                "Password is too common. Please choose a stronger password.",
            );
        }

        result
    }
}
