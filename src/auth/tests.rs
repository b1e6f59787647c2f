//! Tests for auth module
//!
//! These tests verify core authentication functionality including:
//! - JWT issuance and validation
//! - Login and password validation rules
//! - Staff role mapping

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::Validator;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

    fn staff(role: &str) -> models::StaffUser {
        models::StaffUser {
            id: "user-123".to_string(),
            username: "prof".to_string(),
            email: "prof@dashboard.local".to_string(),
            role: role.to_string(),
            created_at: Some("2024-01-01T00:00:00Z".to_string()),
        }
    }

    fn password(value: &str) -> models::ChangePasswordRequest {
        models::ChangePasswordRequest {
            password: value.to_string(),
        }
    }

    #[test]
    fn test_issued_token_decodes_with_same_secret() {
        let token = handlers::issue_token(&staff("professor"), "test_secret_key", 24)
            .expect("Failed to issue token");

        let decoded = decode::<models::Claims>(
            &token,
            &DecodingKey::from_secret("test_secret_key".as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .expect("Failed to decode token");

        assert_eq!(decoded.claims.sub, "user-123");
        assert_eq!(decoded.claims.username, "prof");
    }

    #[test]
    fn test_jwt_validation_fails_with_wrong_secret() {
        let token = handlers::issue_token(&staff("professor"), "test_secret_key", 24)
            .expect("Failed to issue token");

        let result = decode::<models::Claims>(
            &token,
            &DecodingKey::from_secret("wrong_secret_key".as_bytes()),
            &Validation::new(Algorithm::HS256),
        );

        assert!(
            result.is_err(),
            "Token validation should fail with wrong secret"
        );
    }

    #[test]
    fn test_bare_token_strips_bearer_prefix() {
        assert_eq!(extractors::bare_token("Bearer abc.def"), "abc.def");
        assert_eq!(extractors::bare_token("abc.def"), "abc.def");
    }

    #[test]
    fn test_staff_role_mapping() {
        assert_eq!(staff("admin").role(), models::StaffRole::Admin);
        assert_eq!(staff("ADMIN").role(), models::StaffRole::Admin);
        assert_eq!(staff("professor").role(), models::StaffRole::Professor);
        assert_eq!(staff("anything").role(), models::StaffRole::Professor);
    }

    #[test]
    fn test_login_validation() {
        let valid = models::LoginRequest {
            username: "admin".to_string(),
            password: "secret".to_string(),
        };
        assert!(validators::LoginValidator.validate(&valid).is_valid);

        let bad_username = models::LoginRequest {
            username: "admin@evil".to_string(),
            password: "secret".to_string(),
        };
        assert!(!validators::LoginValidator.validate(&bad_username).is_valid);

        let empty = models::LoginRequest {
            username: "  ".to_string(),
            password: String::new(),
        };
        assert_eq!(validators::LoginValidator.validate(&empty).errors.len(), 2);
    }

    #[test]
    fn test_password_validation_accepts_strong_password() {
        let result = validators::PasswordValidator.validate(&password("Tutor2024x"));
        assert!(result.is_valid);
    }

    #[test]
    fn test_password_validation_rules() {
        let cases = [
            ("", "Password is required"),
            ("ab1", "Password must be at least 8 characters long"),
            ("onlyletters", "Password must contain at least one letter and one number"),
            ("My12345678x", "Password is too common. Please choose a stronger password."),
            ("xPassWord9", "Password is too common. Please choose a stronger password."),
        ];

        for (input, expected) in cases {
            let result = validators::PasswordValidator.validate(&password(input));
            assert!(!result.is_valid, "{:?} should be rejected", input);
            assert!(
                result.errors.iter().any(|e| e.message == expected),
                "{:?} should report {:?}, got {:?}",
                input,
                expected,
                result.errors
            );
        }

        let too_long = format!("a1{}", "b".repeat(130));
        let result = validators::PasswordValidator.validate(&password(&too_long));
        assert_eq!(result.first_message(), Some("Password is too long"));
    }
}
