use reqwest::Method;

use super::AccountInfo;
use crate::api::client::BackendClient;
use crate::api::page::{Page, PageRequest};
use crate::api::types::{Bordereau, Client, Driver, Manager, ManagerCreate, Patch};
use crate::error::ApiResult;

const MANAGERS: &str = "managers";

/// `/managers` endpoints. Managers are addressed by their code.
#[derive(Debug, Clone, Copy)]
pub struct Managers<'a> {
    client: &'a BackendClient,
}

impl<'a> Managers<'a> {
    pub(crate) fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: PageRequest) -> ApiResult<Page<Manager>> {
        self.client.list(&[MANAGERS], page).await
    }

    pub async fn get(&self, code: &str) -> ApiResult<Manager> {
        self.client.get(&[MANAGERS, code]).await
    }

    pub async fn me(&self) -> ApiResult<AccountInfo> {
        self.client.get(&[MANAGERS, "me"]).await
    }

    pub async fn my_profile(&self) -> ApiResult<Manager> {
        self.client.get(&[MANAGERS, "me", "profile"]).await
    }

    pub async fn my_drivers(&self) -> ApiResult<Vec<Driver>> {
        self.client.get(&[MANAGERS, "me", "drivers"]).await
    }

    pub async fn my_clients(&self) -> ApiResult<Vec<Client>> {
        self.client.get(&[MANAGERS, "me", "clients"]).await
    }

    pub async fn my_bordereaux(&self) -> ApiResult<Vec<Bordereau>> {
        self.client.get(&[MANAGERS, "me", "bordereaux"]).await
    }

    pub async fn create(&self, manager: &ManagerCreate) -> ApiResult<Manager> {
        self.client.send(Method::POST, &[MANAGERS], manager).await
    }

    /// Replaces a manager. The backend accepts the creation payload here.
    pub async fn update(&self, code: &str, manager: &ManagerCreate) -> ApiResult<Manager> {
        self.client.send(Method::PUT, &[MANAGERS, code], manager).await
    }

    pub async fn partial_update(&self, code: &str, fields: &Patch) -> ApiResult<Manager> {
        self.client.send(Method::PATCH, &[MANAGERS, code], fields).await
    }

    pub async fn delete(&self, code: &str) -> ApiResult<()> {
        self.client.delete(&[MANAGERS, code]).await
    }

    pub async fn drivers(&self, code: &str) -> ApiResult<Vec<Driver>> {
        self.client.get(&[MANAGERS, code, "drivers"]).await
    }

    pub async fn clients(&self, code: &str) -> ApiResult<Vec<Client>> {
        self.client.get(&[MANAGERS, code, "clients"]).await
    }

    pub async fn bordereaux(&self, code: &str) -> ApiResult<Vec<Bordereau>> {
        self.client.get(&[MANAGERS, code, "bordereaux"]).await
    }
}
