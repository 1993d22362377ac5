use reqwest::Method;

use crate::api::client::BackendClient;
use crate::api::page::{Page, PageRequest};
use crate::api::types::{
    Assignment, Bordereau, BordereauScan, BordereauUpdate, DeliveryItem, Patch, Transfer,
    TransferCreate,
};
use crate::error::ApiResult;

const BORDEREAUX: &str = "bordereaux";

/// `/bordereaux` endpoints, addressed by bordereau number.
#[derive(Debug, Clone, Copy)]
pub struct Bordereaux<'a> {
    client: &'a BackendClient,
}

impl<'a> Bordereaux<'a> {
    pub(crate) fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: PageRequest) -> ApiResult<Page<Bordereau>> {
        self.client.list(&[BORDEREAUX], page).await
    }

    pub async fn get(&self, number: &str) -> ApiResult<Bordereau> {
        self.client.get(&[BORDEREAUX, number]).await
    }

    /// Registers a scanned bordereau together with its delivery items.
    pub async fn scan(&self, scan: &BordereauScan) -> ApiResult<Bordereau> {
        self.client.send(Method::POST, &[BORDEREAUX, "scan"], scan).await
    }

    pub async fn update(&self, number: &str, update: &BordereauUpdate) -> ApiResult<Bordereau> {
        self.client.send(Method::PUT, &[BORDEREAUX, number], update).await
    }

    pub async fn partial_update(&self, number: &str, fields: &Patch) -> ApiResult<Bordereau> {
        self.client
            .send(Method::PATCH, &[BORDEREAUX, number], fields)
            .await
    }

    pub async fn delete(&self, number: &str) -> ApiResult<()> {
        self.client.delete(&[BORDEREAUX, number]).await
    }

    /// Moves a bordereau to another driver and sector manager.
    pub async fn reassign(&self, number: &str, assignment: &Assignment) -> ApiResult<Bordereau> {
        self.client
            .send(Method::PUT, &[BORDEREAUX, number, "assignments"], assignment)
            .await
    }

    pub async fn delivery_items(&self, number: &str) -> ApiResult<Vec<DeliveryItem>> {
        self.client.get(&[BORDEREAUX, number, "delivery-items"]).await
    }

    /// Starts a handover of this bordereau to another driver.
    pub async fn create_transfer(&self, number: &str, transfer: &TransferCreate) -> ApiResult<Transfer> {
        self.client
            .send(Method::POST, &[BORDEREAUX, number, "transfers"], transfer)
            .await
    }
}
