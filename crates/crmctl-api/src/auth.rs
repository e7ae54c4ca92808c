// Authentication endpoints
//
// Both login flows answer `data: { token, user }`. The caller decides
// whether to install the token on this client (`set_token`); nothing here
// mutates client state so a failed login leaves the previous session intact.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::client::{ApiClient, require_data};
use crate::envelope::de;
use crate::error::Error;

/// The user object returned by the login endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "de::opt_id", skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    /// Filled in by a follow-up role lookup when the login payload lacks it.
    #[serde(
        default,
        rename = "roleName",
        alias = "role_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub role_name: Option<String>,
    /// Everything else the backend sends, kept for display.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AuthUser {
    /// Best human label: username, else email, else id.
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

/// A successful login.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub token: SecretString,
    pub user: AuthUser,
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct LoginData {
    token: String,
    user: AuthUser,
}

/// Minimal role shape needed to label the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RoleRef {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub role_name: String,
}

impl ApiClient {
    /// `POST /auth/login` with email and password.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<LoginResponse, Error> {
        let url = self.endpoint(&["auth", "login"])?;
        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });
        debug!(email, "logging in");
        let envelope = self.post::<LoginData, _>(url, &body).await?;
        into_login(envelope.message.clone(), require_data(envelope, "login")?)
    }

    /// `POST /auth/admin-login`: passwordless admin sign-in.
    pub async fn admin_login(&self, email: &str, is_client_page: bool) -> Result<LoginResponse, Error> {
        let url = self.endpoint(&["auth", "admin-login"])?;
        let body = json!({
            "email": email,
            "isClientPage": is_client_page,
        });
        debug!(email, is_client_page, "admin login");
        let envelope = self.post::<LoginData, _>(url, &body).await?;
        into_login(envelope.message.clone(), require_data(envelope, "admin login")?)
    }

    /// `GET /role/{id}`
    pub async fn get_role(&self, role_id: &str) -> Result<RoleRef, Error> {
        self.get_resource("role", role_id).await
    }
}

fn into_login(message: Option<String>, data: LoginData) -> Result<LoginResponse, Error> {
    if data.token.is_empty() {
        return Err(Error::Authentication {
            message: "server returned an empty token".into(),
        });
    }
    Ok(LoginResponse {
        token: SecretString::from(data.token),
        user: data.user,
        message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn auth_user_accepts_numeric_ids_and_snake_role_name() {
        let user: AuthUser = serde_json::from_value(json!({
            "id": 7,
            "email": "ada@example.com",
            "role_id": 3,
            "role_name": "admin",
            "phone": "5551234567"
        }))
        .unwrap();
        assert_eq!(user.id, "7");
        assert_eq!(user.role_id.as_deref(), Some("3"));
        assert_eq!(user.role_name.as_deref(), Some("admin"));
        assert_eq!(user.extra["phone"], "5551234567");
        assert_eq!(user.display_name(), "ada@example.com");
    }

    #[test]
    fn auth_user_serializes_role_name_camel_case() {
        let user = AuthUser {
            id: "1".into(),
            email: None,
            username: Some("ada".into()),
            role_id: None,
            role_name: Some("manager".into()),
            extra: serde_json::Map::new(),
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["roleName"], "manager");
        assert!(value.get("role_id").is_none());
    }
}
