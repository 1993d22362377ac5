use reqwest::Method;

use crate::api::client::BackendClient;
use crate::api::page::{Page, PageRequest};
use crate::api::types::{Patch, Transfer, TransferStatus, TransferStatusUpdate};
use crate::error::{ApiError, ApiResult};

const TRANSFERS: &str = "transfers";

/// `/transfers` endpoints. New transfers are created under a bordereau.
#[derive(Debug, Clone, Copy)]
pub struct Transfers<'a> {
    client: &'a BackendClient,
}

impl<'a> Transfers<'a> {
    pub(crate) fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: PageRequest) -> ApiResult<Page<Transfer>> {
        self.client.list(&[TRANSFERS], page).await
    }

    pub async fn get(&self, id: i64) -> ApiResult<Transfer> {
        self.client.get(&[TRANSFERS, &id.to_string()]).await
    }

    pub async fn update(&self, id: i64, fields: &Patch) -> ApiResult<Transfer> {
        self.client
            .send(Method::PUT, &[TRANSFERS, &id.to_string()], fields)
            .await
    }

    /// Accepts or rejects a pending transfer.
    pub async fn set_status(&self, id: i64, status: TransferStatus) -> ApiResult<Transfer> {
        if status == TransferStatus::Other {
            return Err(ApiError::InvalidRequest(format!(
                "unknown transfer status for transfer {id}"
            )));
        }
        self.client
            .send(
                Method::PATCH,
                &[TRANSFERS, &id.to_string(), "status"],
                &TransferStatusUpdate { status },
            )
            .await
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.client.delete(&[TRANSFERS, &id.to_string()]).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::{MemorySessionStore, SessionManager};

    #[tokio::test]
    async fn test_set_status_patches_status_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/transfers/5/status"))
            .and(body_json(json!({"status": "ACCEPTED"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5, "status": "ACCEPTED"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri(), SessionManager::new(MemorySessionStore::new()))
            .unwrap();
        let transfer = client
            .transfers()
            .set_status(5, TransferStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(transfer.status, TransferStatus::Accepted);
    }

    #[tokio::test]
    async fn test_set_status_refuses_unknown_status() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 5})))
            .expect(0)
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri(), SessionManager::new(MemorySessionStore::new()))
            .unwrap();
        let err = client
            .transfers()
            .set_status(5, TransferStatus::Other)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_not_found_carries_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/transfers/404"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"message": "Transfer not found: 404"})),
            )
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri(), SessionManager::new(MemorySessionStore::new()))
            .unwrap();
        let err = client.transfers().get(404).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(matches!(err, ApiError::RequestFailed { .. }));
        assert_eq!(err.to_string(), "Transfer not found: 404");
    }
}
