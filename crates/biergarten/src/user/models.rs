//! User data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::validation::{Validate, ValidationErrors, Validator};

/// User entity from database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_account_confirmed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// The caller's own account, as returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_account_confirmed: bool,
    pub created_at: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_account_confirmed: user.is_account_confirmed,
            created_at: user.created_at,
        }
    }
}

/// What other users get to see of an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub created_at: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            created_at: user.created_at,
        }
    }
}

/// Registration payload.
///
/// Fields are optional so a missing one is reported as a field error rather
/// than a body rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.username("username", self.username.as_deref());
        v.email("email", self.email.as_deref());
        v.required_text("password", self.password.as_deref(), 8, 128);
        v.finish()
    }
}

/// Login payload. `username` may also be the account's email address.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.required_text("username", self.username.as_deref(), 1, 254);
        v.required_text("password", self.password.as_deref(), 1, 128);
        v.finish()
    }
}

/// A validated registration, ready to insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldErrorKind;

    #[test]
    fn test_register_request_validation() {
        let request = RegisterRequest {
            username: Some("hophead".into()),
            email: Some("hop@example.com".into()),
            password: Some("correct horse".into()),
        };
        assert!(request.validate().is_ok());

        let errors = RegisterRequest::default().validate().unwrap_err();
        assert_eq!(errors.errors().len(), 3);
        assert_eq!(errors.kind_of("password"), Some(&FieldErrorKind::Required));

        let request = RegisterRequest {
            username: Some("x".into()),
            email: Some("nope".into()),
            password: Some("short".into()),
        };
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.kind_of("username"), Some(&FieldErrorKind::TooShort { min: 3 }));
        assert_eq!(errors.kind_of("email"), Some(&FieldErrorKind::InvalidFormat));
        assert_eq!(errors.kind_of("password"), Some(&FieldErrorKind::TooShort { min: 8 }));
    }

    #[test]
    fn test_user_info_hides_password_hash() {
        let user = User {
            id: "usr_abcdefghijkl".into(),
            username: "hophead".into(),
            email: "hop@example.com".into(),
            password_hash: "$2b$04$hash".into(),
            is_account_confirmed: false,
            created_at: "2024-01-01T00:00:00+00:00".into(),
            updated_at: "2024-01-01T00:00:00+00:00".into(),
        };

        let json = serde_json::to_value(UserInfo::from(user.clone())).unwrap();
        assert_eq!(json["isAccountConfirmed"], false);
        assert!(json.get("passwordHash").is_none());

        let json = serde_json::to_value(PublicUser::from(user)).unwrap();
        assert!(json.get("email").is_none());
    }
}
