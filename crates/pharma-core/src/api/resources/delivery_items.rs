use reqwest::Method;

use crate::api::client::BackendClient;
use crate::api::page::{Page, PageRequest};
use crate::api::types::{DeliveryItem, DeliveryItemUpdate, DeliveryProof, Patch};
use crate::error::ApiResult;

const DELIVERY_ITEMS: &str = "delivery-items";

/// `/delivery-items` endpoints, addressed by BL (delivery note) number.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryItems<'a> {
    client: &'a BackendClient,
}

impl<'a> DeliveryItems<'a> {
    pub(crate) fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: PageRequest) -> ApiResult<Page<DeliveryItem>> {
        self.client.list(&[DELIVERY_ITEMS], page).await
    }

    pub async fn get(&self, bl_number: &str) -> ApiResult<DeliveryItem> {
        self.client.get(&[DELIVERY_ITEMS, bl_number]).await
    }

    pub async fn update(&self, bl_number: &str, update: &DeliveryItemUpdate) -> ApiResult<DeliveryItem> {
        self.client
            .send(Method::PUT, &[DELIVERY_ITEMS, bl_number], update)
            .await
    }

    pub async fn partial_update(&self, bl_number: &str, fields: &Patch) -> ApiResult<DeliveryItem> {
        self.client
            .send(Method::PATCH, &[DELIVERY_ITEMS, bl_number], fields)
            .await
    }

    pub async fn delete(&self, bl_number: &str) -> ApiResult<()> {
        self.client.delete(&[DELIVERY_ITEMS, bl_number]).await
    }

    /// Records notes and signature for a delivered item.
    pub async fn submit_proof(&self, bl_number: &str, proof: &DeliveryProof) -> ApiResult<DeliveryItem> {
        self.client
            .send(Method::PUT, &[DELIVERY_ITEMS, bl_number, "proof"], proof)
            .await
    }
}
