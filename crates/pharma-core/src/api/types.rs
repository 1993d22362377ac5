//! Backend resource models and request bodies.
//!
//! Response models are lenient: missing or null fields default and nested
//! relations may be absent. Request bodies omit unset optional fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Body for partial updates: only the listed fields are changed.
pub type Patch = serde_json::Map<String, serde_json::Value>;

/// Reads an explicit JSON `null` as the field's default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Admin {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Manager {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(deserialize_with = "null_as_default")]
    pub secteur_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    pub assigned_admin: Option<Admin>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Driver {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(deserialize_with = "null_as_default")]
    pub license_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub created_at: String,
    pub assigned_manager: Option<Manager>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    #[serde(deserialize_with = "null_as_default")]
    pub client_code: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub coordinates: String,
    /// Manager responsible for the client's sector.
    pub secteur: Option<Manager>,
    #[serde(deserialize_with = "null_as_default")]
    pub auto_created: bool,
}

macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:tt),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant,)+
            /// A value this client does not know about.
            #[default]
            #[serde(rename = "OTHER", other)]
            Other,
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Other => "OTHER",
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().replace('-', "_").to_uppercase();
                match wanted.as_str() {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(format!(
                        "unknown {} '{s}' (expected one of: {})",
                        stringify!($name),
                        [$($wire),+].join(", ")
                    )),
                }
            }
        }
    };
}

status_enum!(
    /// Lifecycle of a bordereau (delivery manifest).
    BordereauStatus {
        Pending => "PENDING",
        InProgress => "IN_PROGRESS",
        Completed => "COMPLETED",
        Cancelled => "CANCELLED",
    }
);

status_enum!(
    DeliveryItemStatus {
        Pending => "PENDING",
        InTransit => "IN_TRANSIT",
        Delivered => "DELIVERED",
        Failed => "FAILED",
    }
);

status_enum!(
    /// State of a bordereau handover between drivers.
    TransferStatus {
        Pending => "PENDING",
        Accepted => "ACCEPTED",
        Rejected => "REJECTED",
    }
);

/// Delivery manifest scanned by a driver, grouping delivery items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Bordereau {
    #[serde(deserialize_with = "null_as_default")]
    pub bordereau_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub delivery_date: String,
    pub current_driver: Option<Driver>,
    pub secteur: Option<Manager>,
    pub original_driver: Option<Driver>,
    #[serde(deserialize_with = "null_as_default")]
    pub status: BordereauStatus,
    pub scanned_at: Option<String>,
    pub completed_at: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub auto_created: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryItem {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub bl_number: String,
    pub bordereau: Option<Bordereau>,
    pub client: Option<Client>,
    #[serde(deserialize_with = "null_as_default")]
    pub nombre_colis: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub nombre_sachets: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub status: DeliveryItemStatus,
    pub delivered_at: Option<String>,
    pub delivery_notes: Option<String>,
    pub recipient_signature: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transfer {
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    pub bordereau: Option<Bordereau>,
    pub from_driver: Option<Driver>,
    pub to_driver: Option<Driver>,
    pub transferred_at: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub transfer_barcode: String,
    #[serde(deserialize_with = "null_as_default")]
    pub reason: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: TransferStatus,
}

// Request bodies.

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreate {
    pub code: String,
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdate {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerCreate {
    pub code: String,
    pub username: String,
    pub password: String,
    pub secteur_name: String,
    pub phone: String,
    pub address: String,
    pub assigned_admin_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverCreate {
    pub code: String,
    pub username: String,
    pub password: String,
    pub license_number: String,
    pub phone: String,
    pub assigned_manager_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCreate {
    pub client_code: String,
    pub name: String,
    pub address: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<String>,
    pub secteur_code: String,
}

/// One line of a scanned bordereau.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannedItem {
    pub bl_number: String,
    pub client_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_address: Option<String>,
    pub nombre_colis: u32,
    pub nombre_sachets: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BordereauScan {
    pub bordereau_number: String,
    pub delivery_date: String,
    pub driver_code: String,
    pub manager_code: String,
    pub delivery_items: Vec<ScannedItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BordereauUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BordereauStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub driver_code: String,
    pub manager_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre_colis: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre_sachets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeliveryItemStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_signature: Option<String>,
}

/// Proof of delivery attached to a delivered item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryProof {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_signature: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferCreate {
    pub to_driver_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_barcode: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransferStatusUpdate {
    pub status: TransferStatus,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_bordereau_parses_nested_relations() {
        let bordereau: Bordereau = serde_json::from_value(json!({
            "bordereauNumber": "B-2024-001",
            "deliveryDate": "2024-05-02",
            "currentDriver": {"id": 7, "code": "100007", "username": "drv7"},
            "secteur": {"id": 2, "code": "200002", "secteurName": "Casa Nord"},
            "status": "IN_PROGRESS",
            "completedAt": null,
            "autoCreated": true
        }))
        .unwrap();

        assert_eq!(bordereau.status, BordereauStatus::InProgress);
        assert_eq!(bordereau.current_driver.unwrap().username, "drv7");
        assert_eq!(bordereau.secteur.unwrap().secteur_name, "Casa Nord");
        assert!(bordereau.original_driver.is_none());
        assert!(bordereau.completed_at.is_none());
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let item: DeliveryItem =
            serde_json::from_value(json!({"blNumber": "BL-1", "status": "RETURNED"})).unwrap();
        assert_eq!(item.status, DeliveryItemStatus::Other);
    }

    #[test]
    fn test_null_fields_read_as_defaults() {
        let client: Client = serde_json::from_value(json!({
            "clientCode": "400002",
            "name": "Pharmacie du Port",
            "address": null,
            "phone": null,
            "coordinates": null,
            "secteur": null,
            "autoCreated": null
        }))
        .unwrap();
        assert_eq!(client.client_code, "400002");
        assert_eq!(client.phone, "");
        assert_eq!(client.coordinates, "");
        assert!(!client.auto_created);

        let transfer: Transfer = serde_json::from_value(json!({
            "id": 3,
            "reason": null,
            "transferBarcode": null,
            "status": null
        }))
        .unwrap();
        assert_eq!(transfer.id, 3);
        assert_eq!(transfer.reason, "");
        assert_eq!(transfer.status, TransferStatus::Other);

        let item: DeliveryItem = serde_json::from_value(json!({
            "blNumber": "BL-4",
            "nombreColis": null,
            "client": {"clientCode": "400002", "phone": null}
        }))
        .unwrap();
        assert_eq!(item.nombre_colis, 0);
        assert_eq!(item.client.unwrap().phone, "");
    }

    #[test]
    fn test_other_status_serializes_like_as_str() {
        assert_eq!(
            serde_json::to_value(TransferStatus::Other).unwrap(),
            json!(TransferStatus::Other.as_str())
        );
    }

    #[test]
    fn test_status_from_str_is_lenient() {
        assert_eq!("accepted".parse(), Ok(TransferStatus::Accepted));
        assert_eq!(" in-progress ".parse(), Ok(BordereauStatus::InProgress));
        let err = "lost".parse::<TransferStatus>().unwrap_err();
        assert!(err.contains("PENDING, ACCEPTED, REJECTED"), "{err}");
    }

    #[test]
    fn test_request_bodies_skip_unset_fields() {
        let body = serde_json::to_value(DeliveryItemUpdate {
            status: Some(DeliveryItemStatus::Delivered),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body, json!({"status": "DELIVERED"}));

        let body = serde_json::to_value(Assignment {
            driver_code: "100001".to_string(),
            manager_code: "200001".to_string(),
        })
        .unwrap();
        assert_eq!(body, json!({"driverCode": "100001", "managerCode": "200001"}));
    }
}
