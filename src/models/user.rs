use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "user_role_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  User,
}

impl std::fmt::Display for Role {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Role::Admin => write!(f, "admin"),
      Role::User => write!(f, "user"),
    }
  }
}

impl std::str::FromStr for Role {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "admin" => Ok(Role::Admin),
      "user" => Ok(Role::User),
      other => Err(format!("Unknown role '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  #[serde(skip_serializing)] // Never send the password hash to a client
  pub password_hash: String,
  pub role: Role,
  #[serde(rename = "avatarPublicId")]
  pub avatar_public_id: Option<String>,
  #[serde(rename = "avatarUrl")]
  pub avatar_url: Option<String>,
  #[serde(skip_serializing)]
  pub reset_token: Option<String>,
  #[serde(skip_serializing)]
  pub reset_token_expires_at: Option<DateTime<Utc>>,
  #[serde(rename = "createdAt")]
  pub created_at: DateTime<Utc>,
  #[serde(rename = "updatedAt")]
  pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn role_round_trips_through_its_string_form() {
    for role in [Role::Admin, Role::User] {
      assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
    }
    assert!("superuser".parse::<Role>().is_err());
  }

  #[test]
  fn user_serialization_omits_credentials() {
    let user = User {
      id: Uuid::new_v4(),
      name: "Ada".into(),
      email: "ada@example.com".into(),
      password_hash: "$argon2id$...".into(),
      role: Role::User,
      avatar_public_id: None,
      avatar_url: None,
      reset_token: Some("secret".into()),
      reset_token_expires_at: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    };
    let json = serde_json::to_value(&user).unwrap();
    assert!(json.get("password_hash").is_none());
    assert!(json.get("reset_token").is_none());
    assert_eq!(json["email"], "ada@example.com");
  }
}
