use reqwest::Method;

use super::AccountInfo;
use crate::api::client::BackendClient;
use crate::api::page::{Page, PageRequest};
use crate::api::types::{Bordereau, DeliveryItem, Driver, DriverCreate, Patch};
use crate::error::ApiResult;

const DRIVERS: &str = "drivers";

/// `/drivers` endpoints. Drivers are addressed by their code.
#[derive(Debug, Clone, Copy)]
pub struct Drivers<'a> {
    client: &'a BackendClient,
}

impl<'a> Drivers<'a> {
    pub(crate) fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: PageRequest) -> ApiResult<Page<Driver>> {
        self.client.list(&[DRIVERS], page).await
    }

    pub async fn get(&self, code: &str) -> ApiResult<Driver> {
        self.client.get(&[DRIVERS, code]).await
    }

    pub async fn me(&self) -> ApiResult<AccountInfo> {
        self.client.get(&[DRIVERS, "me"]).await
    }

    pub async fn my_profile(&self) -> ApiResult<Driver> {
        self.client.get(&[DRIVERS, "me", "profile"]).await
    }

    pub async fn my_bordereaux(&self) -> ApiResult<Vec<Bordereau>> {
        self.client.get(&[DRIVERS, "me", "bordereaux"]).await
    }

    pub async fn my_delivery_items(&self) -> ApiResult<Vec<DeliveryItem>> {
        self.client.get(&[DRIVERS, "me", "delivery-items"]).await
    }

    pub async fn create(&self, driver: &DriverCreate) -> ApiResult<Driver> {
        self.client.send(Method::POST, &[DRIVERS], driver).await
    }

    pub async fn update(&self, code: &str, driver: &DriverCreate) -> ApiResult<Driver> {
        self.client.send(Method::PUT, &[DRIVERS, code], driver).await
    }

    pub async fn partial_update(&self, code: &str, fields: &Patch) -> ApiResult<Driver> {
        self.client.send(Method::PATCH, &[DRIVERS, code], fields).await
    }

    pub async fn delete(&self, code: &str) -> ApiResult<()> {
        self.client.delete(&[DRIVERS, code]).await
    }

    pub async fn bordereaux(&self, code: &str) -> ApiResult<Vec<Bordereau>> {
        self.client.get(&[DRIVERS, code, "bordereaux"]).await
    }

    pub async fn delivery_items(&self, code: &str) -> ApiResult<Vec<DeliveryItem>> {
        self.client.get(&[DRIVERS, code, "delivery-items"]).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::{MemorySessionStore, SessionManager};

    #[tokio::test]
    async fn test_list_passes_page_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drivers"))
            .and(query_param("page", "2"))
            .and(query_param("size", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"id": 11, "code": "100011", "username": "drv11", "licenseNumber": "LIC-11"}],
                "totalPages": 3,
                "totalElements": 11,
                "last": true,
                "number": 2,
                "size": 5
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = BackendClient::new(&server.uri(), SessionManager::new(MemorySessionStore::new()))
            .unwrap();
        let page = client.drivers().list(PageRequest::new(2, 5)).await.unwrap();

        assert!(page.last);
        assert_eq!(page.number, 2);
        assert_eq!(page.content[0].license_number, "LIC-11");
    }
}
