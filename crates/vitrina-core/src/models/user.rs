//! Dashboard users and their authorization roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, FieldError};
use crate::models::image::ImageSet;

/// User role for authorization. Profile management and user management are
/// gated on `SuperUser`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum Role {
    #[serde(rename = "super-user")]
    SuperUser,
    #[serde(rename = "administrator")]
    Administrator,
    #[serde(rename = "basic")]
    Basic,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Role::SuperUser => write!(f, "super-user"),
            Role::Administrator => write!(f, "administrator"),
            Role::Basic => write!(f, "basic"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super-user" => Ok(Role::SuperUser),
            "administrator" => Ok(Role::Administrator),
            "basic" => Ok(Role::Basic),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub image: ImageSet,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Incoming user-creation body.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedUser {
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
}

const MIN_PASSWORD_LEN: usize = 6;

fn plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

impl UserDraft {
    pub fn validate(self) -> Result<ValidatedUser, AppError> {
        let mut errors = Vec::new();

        let first_name = match self.first_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(name.to_string()),
            _ => {
                errors.push(FieldError::new(
                    "firstName",
                    "Please provide the user's first name.",
                ));
                None
            }
        };

        let last_name = match self.last_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(name.to_string()),
            _ => {
                errors.push(FieldError::new(
                    "lastName",
                    "Please provide the user's last name.",
                ));
                None
            }
        };

        let email = match self.email.as_deref().map(str::trim) {
            Some(email) if plausible_email(email) => Some(email.to_lowercase()),
            Some(_) => {
                errors.push(FieldError::new(
                    "email",
                    "Please provide a valid email address.",
                ));
                None
            }
            None => {
                errors.push(FieldError::new(
                    "email",
                    "Please provide a user email address.",
                ));
                None
            }
        };

        let role = match self.role {
            Some(role) => Some(role),
            None => {
                errors.push(FieldError::new("role", "Please select the user's role."));
                None
            }
        };

        let password = match self.password.as_deref() {
            Some(password) if password.len() >= MIN_PASSWORD_LEN => Some(password.to_string()),
            Some(_) => {
                errors.push(FieldError::new(
                    "password",
                    "Password must be at least 6 characters.",
                ));
                None
            }
            None => {
                errors.push(FieldError::new("password", "Please provide a password."));
                None
            }
        };

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let first_name = first_name.expect("validated");
        let last_name = last_name.expect("validated");
        let full_name = format!("{} {}", first_name, last_name);
        Ok(ValidatedUser {
            full_name,
            first_name,
            last_name,
            email: email.expect("validated"),
            role: role.expect("validated"),
            password: password.expect("validated"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        for role in [Role::SuperUser, Role::Administrator, Role::Basic] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn full_name_is_derived() {
        let user = UserDraft {
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            email: Some("Ada@Example.com".to_string()),
            role: Some(Role::Administrator),
            password: Some("s3cret!".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(user.full_name, "Ada Lovelace");
        assert_eq!(user.email, "ada@example.com");
    }

    #[test]
    fn all_violations_reported_together() {
        let err = UserDraft {
            email: Some("not-an-email".to_string()),
            password: Some("abc".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        let fields: Vec<_> = err
            .fields()
            .unwrap()
            .iter()
            .map(|f| f.field.as_str())
            .collect();
        assert_eq!(
            fields,
            vec!["firstName", "lastName", "email", "role", "password"]
        );
    }

    #[test]
    fn email_shape_checks() {
        assert!(plausible_email("a@b.co"));
        assert!(!plausible_email("a@b"));
        assert!(!plausible_email("@b.co"));
        assert!(!plausible_email("a@.co"));
        assert!(!plausible_email("plain"));
    }
}
