use reqwest::Method;

use crate::api::client::BackendClient;
use crate::api::page::{Page, PageRequest};
use crate::api::types::{Client, ClientCreate, DeliveryItem, Patch};
use crate::error::ApiResult;

const CLIENTS: &str = "clients";

/// `/clients` endpoints (pharmacies), addressed by client code.
#[derive(Debug, Clone, Copy)]
pub struct Clients<'a> {
    client: &'a BackendClient,
}

impl<'a> Clients<'a> {
    pub(crate) fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: PageRequest) -> ApiResult<Page<Client>> {
        self.client.list(&[CLIENTS], page).await
    }

    pub async fn get(&self, client_code: &str) -> ApiResult<Client> {
        self.client.get(&[CLIENTS, client_code]).await
    }

    pub async fn create(&self, body: &ClientCreate) -> ApiResult<Client> {
        self.client.send(Method::POST, &[CLIENTS], body).await
    }

    pub async fn update(&self, client_code: &str, body: &ClientCreate) -> ApiResult<Client> {
        self.client.send(Method::PUT, &[CLIENTS, client_code], body).await
    }

    pub async fn partial_update(&self, client_code: &str, fields: &Patch) -> ApiResult<Client> {
        self.client
            .send(Method::PATCH, &[CLIENTS, client_code], fields)
            .await
    }

    pub async fn delete(&self, client_code: &str) -> ApiResult<()> {
        self.client.delete(&[CLIENTS, client_code]).await
    }

    pub async fn delivery_items(&self, client_code: &str) -> ApiResult<Vec<DeliveryItem>> {
        self.client.get(&[CLIENTS, client_code, "delivery-items"]).await
    }
}
