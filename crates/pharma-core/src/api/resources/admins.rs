use reqwest::Method;

use super::AccountInfo;
use crate::api::client::BackendClient;
use crate::api::page::{Page, PageRequest};
use crate::api::types::{Admin, AdminCreate, AdminUpdate, Patch};
use crate::error::ApiResult;

const ADMINS: &str = "admins";

/// `/admins` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Admins<'a> {
    client: &'a BackendClient,
}

impl<'a> Admins<'a> {
    pub(crate) fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: PageRequest) -> ApiResult<Page<Admin>> {
        self.client.list(&[ADMINS], page).await
    }

    pub async fn get(&self, id: i64) -> ApiResult<Admin> {
        self.client.get(&[ADMINS, &id.to_string()]).await
    }

    /// Account summary of the logged-in admin.
    pub async fn me(&self) -> ApiResult<AccountInfo> {
        self.client.get(&[ADMINS, "me"]).await
    }

    pub async fn my_profile(&self) -> ApiResult<Admin> {
        self.client.get(&[ADMINS, "me", "profile"]).await
    }

    pub async fn create(&self, admin: &AdminCreate) -> ApiResult<Admin> {
        self.client.send(Method::POST, &[ADMINS], admin).await
    }

    pub async fn update(&self, id: i64, admin: &AdminUpdate) -> ApiResult<Admin> {
        self.client
            .send(Method::PUT, &[ADMINS, &id.to_string()], admin)
            .await
    }

    pub async fn partial_update(&self, id: i64, fields: &Patch) -> ApiResult<Admin> {
        self.client
            .send(Method::PATCH, &[ADMINS, &id.to_string()], fields)
            .await
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        self.client.delete(&[ADMINS, &id.to_string()]).await
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
    async fn test_create_then_partial_update() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admins"))
            .and(body_json(json!({
                "code": "300002",
                "username": "adm2",
                "password": "changeme",
                "email": "adm2@pharma.test"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 2, "code": "300002", "username": "adm2", "isActive": true
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/admins/2"))
            .and(body_json(json!({"isActive": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 2, "code": "300002", "username": "adm2", "isActive": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = SessionManager::new(MemorySessionStore::new());
        let client = BackendClient::new(&server.uri(), session).unwrap();

        let created = client
            .admins()
            .create(&AdminCreate {
                code: "300002".to_string(),
                username: "adm2".to_string(),
                password: "changeme".to_string(),
                email: Some("adm2@pharma.test".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(created.is_active);

        let mut fields = Patch::new();
        fields.insert("isActive".to_string(), json!(false));
        let updated = client.admins().partial_update(created.id, &fields).await.unwrap();
        assert!(!updated.is_active);
    }
}
