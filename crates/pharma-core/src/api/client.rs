//! HTTP gateway to the PharmaChain backend.
//!
//! Every resource call goes through [`BackendClient::execute`], which attaches
//! headers and classifies the response. Nothing else builds requests.

use anyhow::{Context, Result, bail};
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use super::page::{Page, PageRequest};
use crate::auth::{SessionManager, SessionReader};
use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult, classify_reqwest_error};

/// User-Agent sent with every backend request.
pub const USER_AGENT_VALUE: &str = concat!("pharma/", env!("CARGO_PKG_VERSION"));

/// Typed client for the backend REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and the session.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionManager,
}

impl BackendClient {
    /// Creates a client rooted at `base_url` (e.g. `http://localhost:8080/api`).
    ///
    /// # Errors
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str, session: SessionManager) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), base_url, session)
    }

    /// Same as [`BackendClient::new`] with a preconfigured HTTP client.
    ///
    /// # Errors
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn with_client(http: reqwest::Client, base_url: &str, session: SessionManager) -> Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid API base URL '{base_url}'"))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            bail!("Invalid API base URL '{base_url}': expected an http(s) URL");
        }
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Client for the base URL resolved from env, config and defaults.
    ///
    /// # Errors
    /// Returns an error if the resolved base URL is invalid.
    pub fn from_config(config: &ApiConfig, session: SessionManager) -> Result<Self> {
        Self::new(&config.effective_base_url()?, session)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Read-only view of the session this client authenticates with.
    pub fn session(&self) -> SessionReader {
        self.session.reader()
    }

    /// Absolute URL for the given path segments. Each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::InvalidRequest(format!("Cannot extend base URL '{}'", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends one request and classifies the response. Returns the raw body
    /// of a success response.
    async fn execute(
        &self,
        method: Method,
        segments: &[&str],
        page: Option<PageRequest>,
        body: Option<String>,
    ) -> ApiResult<String> {
        let url = self.endpoint(segments)?;
        let token = self.session.reader().access_token();

        tracing::debug!(
            method = %method,
            url = %url,
            authenticated = token.is_some(),
            "Backend request"
        );

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, USER_AGENT_VALUE);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(page) = page {
            request = request.query(&page.query());
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            let err = classify_reqwest_error(&e);
            tracing::error!(method = %method, url = %url, error = %err, "Backend unreachable");
            err
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!(method = %method, url = %url, "Backend rejected credentials");
            self.session.expire();
            return Err(ApiError::SessionExpired);
        }
        if status == reqwest::StatusCode::FORBIDDEN {
            tracing::warn!(method = %method, url = %url, "Backend denied access");
            return Err(ApiError::Forbidden);
        }

        let text = response.text().await.map_err(|e| {
            let err = classify_reqwest_error(&e);
            tracing::error!(method = %method, url = %url, error = %err, "Failed to read response body");
            err
        })?;

        if !status.is_success() {
            let err = ApiError::request_failed(status.as_u16(), &text);
            tracing::warn!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                error = %err,
                "Backend request failed"
            );
            return Err(err);
        }

        Ok(text)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> ApiResult<T> {
        let body = self.execute(Method::GET, segments, None, None).await?;
        parse_body(&body)
    }

    pub(crate) async fn list<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        page: PageRequest,
    ) -> ApiResult<Page<T>> {
        let body = self.execute(Method::GET, segments, Some(page), None).await?;
        parse_body(&body)
    }

    /// Sends a JSON body with `method` and parses the response.
    pub(crate) async fn send<B, T>(&self, method: Method, segments: &[&str], body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload =
            serde_json::to_string(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        let body = self.execute(method, segments, None, Some(payload)).await?;
        parse_body(&body)
    }

    /// Deletes a resource; any success body is ignored.
    pub(crate) async fn delete(&self, segments: &[&str]) -> ApiResult<()> {
        self.execute(Method::DELETE, segments, None, None).await?;
        Ok(())
    }
}

fn parse_body<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    serde_json::from_str(body).map_err(|e| {
        tracing::warn!(error = %e, "Unexpected response shape");
        ApiError::InvalidResponse(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::{MemorySessionStore, PersistedSession, UserIdentity};

    fn signed_in_session(token: &str) -> SessionManager {
        let manager = SessionManager::new(MemorySessionStore::with_session(PersistedSession {
            access_token: token.to_string(),
            refresh_token: None,
            user: UserIdentity {
                username: "mgr1".to_string(),
                roles: vec!["MANAGER".to_string()],
                ..Default::default()
            },
        }));
        manager.restore();
        manager
    }

    fn anonymous_session() -> SessionManager {
        let manager = SessionManager::new(MemorySessionStore::new());
        manager.restore();
        manager
    }

    fn client(server: &MockServer, session: &SessionManager) -> BackendClient {
        BackendClient::new(&format!("{}/api", server.uri()), session.clone()).unwrap()
    }

    /// True if the request the server received carried an Authorization header.
    async fn sent_authorization(server: &MockServer) -> Vec<bool> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| r.headers.contains_key("authorization"))
            .collect()
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let session = anonymous_session();
        assert!(BackendClient::new("not a url", session.clone()).is_err());
        assert!(BackendClient::new("mailto:ops@pharma.test", session).is_err());
    }

    #[test]
    fn test_endpoint_joins_and_encodes_segments() {
        let session = anonymous_session();
        let client = BackendClient::new("http://backend.test/api/", session).unwrap();

        let url = client.endpoint(&["managers", "A B/1", "drivers"]).unwrap();
        assert_eq!(url.as_str(), "http://backend.test/api/managers/A%20B%2F1/drivers");
    }

    #[tokio::test]
    async fn test_attaches_token_and_standard_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admins/me"))
            .and(header("authorization", "Bearer tok-1"))
            .and(header("content-type", "application/json"))
            .and(header("user-agent", USER_AGENT_VALUE))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "300001"})))
            .expect(1)
            .mount(&server)
            .await;

        let session = signed_in_session("tok-1");
        let me: Value = client(&server, &session).get(&["admins", "me"]).await.unwrap();
        assert_eq!(me["code"], "300001");
    }

    #[tokio::test]
    async fn test_list_without_session_sends_no_authorization_and_expires() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/drivers"))
            .and(query_param("page", "0"))
            .and(query_param("size", "20"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let session = anonymous_session();
        let mut events = session.subscribe();
        let err = client(&server, &session)
            .list::<Value>(&["drivers"], PageRequest::default())
            .await
            .unwrap_err();

        assert_eq!(err, ApiError::SessionExpired);
        assert_eq!(sent_authorization(&server).await, vec![false]);
        assert!(!session.reader().is_authenticated());
        assert_eq!(events.try_recv().unwrap().route(), crate::auth::Route::Login);
    }

    #[tokio::test]
    async fn test_logout_then_request_omits_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let session = signed_in_session("tok-1");
        let client = client(&server, &session);
        let _: Vec<Value> = client.get(&["managers", "me", "drivers"]).await.unwrap();
        session.logout();
        let _: Vec<Value> = client.get(&["managers", "me", "drivers"]).await.unwrap();

        assert_eq!(sent_authorization(&server).await, vec![true, false]);
    }

    #[tokio::test]
    async fn test_forbidden_keeps_session() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/managers/M100"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/managers"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
            .expect(1)
            .mount(&server)
            .await;

        let session = signed_in_session("tok-1");
        let client = client(&server, &session);

        let err = client.delete(&["managers", "M100"]).await.unwrap_err();
        assert_eq!(err, ApiError::Forbidden);
        assert!(session.reader().is_authenticated());

        let page: Page<Value> = client
            .list(&["managers"], PageRequest::default())
            .await
            .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_error_message_from_body_or_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/clients"))
            .and(body_json(json!({"name": "Pharmacie Atlas"})))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({"message": "Client already exists"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/clients/C1"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
            .mount(&server)
            .await;

        let session = signed_in_session("tok-1");
        let client = client(&server, &session);

        let err = client
            .send::<_, Value>(Method::POST, &["clients"], &json!({"name": "Pharmacie Atlas"}))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::RequestFailed {
                status: 409,
                message: "Client already exists".to_string()
            }
        );

        let err = client.get::<Value>(&["clients", "C1"]).await.unwrap_err();
        assert_eq!(err.to_string(), "API Error: 500");
        assert!(session.reader().is_authenticated());
    }

    #[tokio::test]
    async fn test_delete_ignores_empty_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/transfers/12"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let session = signed_in_session("tok-1");
        client(&server, &session).delete(&["transfers", "12"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let session = signed_in_session("tok-1");
        let err = client(&server, &session)
            .get::<Value>(&["transfers", "1"])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_network_failure_keeps_session() {
        let session = signed_in_session("tok-1");
        let client = BackendClient::new("http://127.0.0.1:9/api", session.clone()).unwrap();

        let err = client.get::<Value>(&["admins"]).await.unwrap_err();
        assert!(matches!(err, ApiError::NetworkFailure(_)), "{err:?}");
        assert!(session.reader().is_authenticated());
    }
}
