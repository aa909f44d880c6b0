//! Auth DTOs shared between server and client

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Role;

/// Login request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration request
///
/// Missing fields deserialize as empty strings so the server can answer
/// "Please add all fields" instead of a serde rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Login / register result: profile plus a fresh access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let ok = RegisterRequest {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "secret".into(),
            role: None,
        };
        assert!(ok.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".into(),
            ..ok.clone()
        };
        let errors = bad_email.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));

        let empty_name = RegisterRequest {
            name: String::new(),
            ..ok
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_register_request_missing_fields() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert!(req.name.is_empty());
        assert!(req.password.is_empty());
        assert!(req.role.is_none());
    }

    #[test]
    fn test_register_request_role() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"name":"A","email":"a@b.co","password":"x","role":"admin"}"#)
                .unwrap();
        assert_eq!(req.role, Some(Role::Admin));
    }
}
