//! Role-gated dashboard sections.

use std::fmt;

use super::identity::{RoleSet, has_any_role};

/// A dashboard area that only some roles may open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Admins,
    Managers,
    Drivers,
    Clients,
    Bordereaux,
    DeliveryItems,
    Transfers,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Admins,
        Section::Managers,
        Section::Drivers,
        Section::Clients,
        Section::Bordereaux,
        Section::DeliveryItems,
        Section::Transfers,
    ];

    /// Roles allowed to open this section.
    pub fn allowed_roles(self) -> &'static [&'static str] {
        match self {
            Section::Admins => &["admin"],
            Section::Managers | Section::Drivers | Section::Clients => &["admin", "manager"],
            Section::Bordereaux | Section::DeliveryItems | Section::Transfers => {
                &["admin", "manager", "driver"]
            }
        }
    }

    pub fn is_visible_to(self, roles: &RoleSet) -> bool {
        has_any_role(roles, self.allowed_roles())
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Admins => "admins",
            Section::Managers => "managers",
            Section::Drivers => "drivers",
            Section::Clients => "clients",
            Section::Bordereaux => "bordereaux",
            Section::DeliveryItems => "delivery-items",
            Section::Transfers => "transfers",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sections the given roles may open, in menu order.
pub fn visible_sections(roles: &RoleSet) -> Vec<Section> {
    Section::ALL
        .into_iter()
        .filter(|section| section.is_visible_to(roles))
        .collect()
}
