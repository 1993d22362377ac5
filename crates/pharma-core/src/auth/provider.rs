//! Identity provider token exchange (resource-owner password grant).

use serde::Deserialize;

use crate::config::IdentitySettings;
use crate::error::{ApiError, ApiResult};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const AUTHENTICATION_FAILED: &str = "Authentication failed";

/// Token pair returned by a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

/// Client for the identity provider's token endpoint.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    settings: IdentitySettings,
    http: reqwest::Client,
}

impl IdentityProvider {
    pub fn new(settings: IdentitySettings) -> Self {
        Self::with_client(settings, reqwest::Client::new())
    }

    pub fn with_client(settings: IdentitySettings, http: reqwest::Client) -> Self {
        Self { settings, http }
    }

    pub fn settings(&self) -> &IdentitySettings {
        &self.settings
    }

    /// Exchanges a username and password for a token pair.
    ///
    /// # Errors
    /// Returns `AuthenticationFailed` carrying the provider's
    /// `error_description` when present, else a generic message.
    pub async fn password_grant(&self, username: &str, password: &str) -> ApiResult<TokenPair> {
        let mut form: Vec<(&str, &str)> = vec![
            ("client_id", self.settings.client_id.as_str()),
            ("grant_type", "password"),
            ("username", username),
            ("password", password),
            ("scope", self.settings.scope.as_str()),
        ];
        if let Some(secret) = &self.settings.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        tracing::debug!(
            token_url = %self.settings.token_url,
            username,
            "Requesting token"
        );

        let response = self
            .http
            .post(&self.settings.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Identity provider unreachable");
                let reason = e.to_string();
                ApiError::AuthenticationFailed(if reason.trim().is_empty() {
                    AUTHENTICATION_FAILED.to_string()
                } else {
                    reason
                })
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error: TokenErrorResponse = serde_json::from_str(&body).unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                error = error.error.as_deref().unwrap_or("unknown"),
                "Token request rejected"
            );
            let reason = error
                .error_description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| INVALID_CREDENTIALS.to_string());
            return Err(ApiError::AuthenticationFailed(reason));
        }

        let tokens: TokenResponse = response.json().await.map_err(|e| {
            tracing::warn!(error = %e, "Unparsable token response");
            ApiError::AuthenticationFailed(AUTHENTICATION_FAILED.to_string())
        })?;

        let access_token = tokens
            .access_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::AuthenticationFailed(AUTHENTICATION_FAILED.to_string()))?;

        Ok(TokenPair {
            access_token,
            refresh_token: tokens.refresh_token.filter(|t| !t.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn settings(server: &MockServer) -> IdentitySettings {
        IdentitySettings {
            token_url: format!("{}/realms/pharma/token", server.uri()),
            client_id: "dashboard".to_string(),
            client_secret: Some("s3cret".to_string()),
            scope: "openid profile email".to_string(),
            strict_claims: false,
        }
    }

    #[tokio::test]
    async fn test_password_grant_sends_form_and_returns_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/realms/pharma/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=password"))
            .and(body_string_contains("username=mgr1"))
            .and(body_string_contains("password=pw"))
            .and(body_string_contains("client_id=dashboard"))
            .and(body_string_contains("client_secret=s3cret"))
            .and(body_string_contains("scope=openid+profile+email"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "a.b.c",
                "refresh_token": "r-1",
                "expires_in": 300,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = IdentityProvider::new(settings(&server));
        let tokens = provider.password_grant("mgr1", "pw").await.unwrap();

        assert_eq!(
            tokens,
            TokenPair {
                access_token: "a.b.c".to_string(),
                refresh_token: Some("r-1".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_password_grant_surfaces_error_description() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid user credentials"
            })))
            .mount(&server)
            .await;

        let provider = IdentityProvider::new(settings(&server));
        let err = provider.password_grant("mgr1", "bad").await.unwrap_err();

        assert_eq!(
            err,
            ApiError::AuthenticationFailed("Invalid user credentials".to_string())
        );
    }

    #[tokio::test]
    async fn test_password_grant_generic_message_without_description() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let provider = IdentityProvider::new(settings(&server));
        let err = provider.password_grant("mgr1", "pw").await.unwrap_err();

        assert_eq!(err.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_password_grant_requires_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"refresh_token": "r"})))
            .mount(&server)
            .await;

        let provider = IdentityProvider::new(settings(&server));
        let err = provider.password_grant("mgr1", "pw").await.unwrap_err();

        assert!(matches!(err, ApiError::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn test_password_grant_network_failure_is_authentication_failed() {
        let server = MockServer::start().await;
        let mut unreachable = settings(&server);
        drop(server);
        unreachable.token_url = "http://127.0.0.1:9/token".to_string();

        let provider = IdentityProvider::new(unreachable);
        let err = provider.password_grant("mgr1", "pw").await.unwrap_err();

        match err {
            ApiError::AuthenticationFailed(reason) => assert!(!reason.is_empty()),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
