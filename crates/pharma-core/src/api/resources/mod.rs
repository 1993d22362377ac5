//! Resource families of the backend API.
//!
//! Each family is a borrowed handle over [`BackendClient`]; all calls share
//! its execution path.

mod admins;
mod bordereaux;
mod clients;
mod delivery_items;
mod drivers;
mod managers;
mod transfers;

pub use admins::Admins;
pub use bordereaux::Bordereaux;
pub use clients::Clients;
pub use delivery_items::DeliveryItems;
pub use drivers::Drivers;
pub use managers::Managers;
pub use transfers::Transfers;

use super::client::BackendClient;

/// Account summary returned by the `/…/me` endpoints.
pub type AccountInfo = serde_json::Map<String, serde_json::Value>;

impl BackendClient {
    pub fn admins(&self) -> Admins<'_> {
        Admins::new(self)
    }

    pub fn managers(&self) -> Managers<'_> {
        Managers::new(self)
    }

    pub fn drivers(&self) -> Drivers<'_> {
        Drivers::new(self)
    }

    pub fn clients(&self) -> Clients<'_> {
        Clients::new(self)
    }

    pub fn bordereaux(&self) -> Bordereaux<'_> {
        Bordereaux::new(self)
    }

    pub fn delivery_items(&self) -> DeliveryItems<'_> {
        DeliveryItems::new(self)
    }

    pub fn transfers(&self) -> Transfers<'_> {
        Transfers::new(self)
    }
}
