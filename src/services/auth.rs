//! Authentication service implementation
//!
//! Operator login is delegated to the backend's auth webhook. A successful
//! login yields a session token which the CLI keeps in a small JSON file so
//! that later invocations can tell whether the operator signed in.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn, debug};

use crate::services::webhook::WebhookClient;
use crate::utils::errors::{ZapError, Result};

/// Signed-in operator session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub username: String,
    pub token: String,
    pub authenticated_at: DateTime<Utc>,
}

/// Authentication service backed by the auth webhook
#[derive(Clone)]
pub struct AuthService {
    client: WebhookClient,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(client: WebhookClient) -> Self {
        Self { client }
    }

    /// Log in with operator credentials
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ZapError::InvalidInput("Username and password are required".to_string()));
        }

        debug!(username = username, "Logging in");
        let body = self.client.login(username, password).await?;

        let session = parse_login_response(username, &body)?;
        info!(username = username, "Operator logged in");
        Ok(session)
    }

    /// Persist a session to disk
    pub async fn save_session(session: &AuthSession, path: &Path) -> Result<()> {
        let serialized = serde_json::to_string_pretty(session)?;
        tokio::fs::write(path, serialized).await?;
        debug!(path = %path.display(), "Session saved");
        Ok(())
    }

    /// Load a previously saved session, if any
    pub async fn load_session(path: &Path) -> Result<Option<AuthSession>> {
        match tokio::fs::read_to_string(path).await {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(session) => Ok(Some(session)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring corrupt session file");
                    Ok(None)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Forget a saved session
    pub async fn logout(path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn parse_login_response(username: &str, body: &Value) -> Result<AuthSession> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Invalid credentials");
        return Err(ZapError::Authentication(message.to_string()));
    }

    let token = ["token", "authToken", "accessToken"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ZapError::Authentication("Login response did not include a token".to_string()))?;

    Ok(AuthSession {
        username: username.to_string(),
        token: token.to_string(),
        authenticated_at: Utc::now(),
    })
}
