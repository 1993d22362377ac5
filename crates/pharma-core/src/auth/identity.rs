//! Authenticated user identity derived from token claims.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::claims::TokenClaims;

/// Set of lower-cased role names.
pub type RoleSet = BTreeSet<String>;

/// Who is logged in. Immutable once built; a new login replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    /// Stable identifier from the token issuer (`sub`).
    #[serde(alias = "keycloakUserId")]
    pub subject_id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// Domain code linking the user to a backend profile record.
    pub code: String,
    /// Roles as issued. Compare through [`UserIdentity::roles`].
    #[serde(default)]
    pub roles: Vec<String>,
}

impl UserIdentity {
    /// Builds an identity from decoded claims; absent claims become empty strings.
    pub fn from_claims(claims: &TokenClaims) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Self {
            subject_id: text(&claims.sub),
            username: text(&claims.preferred_username),
            email: text(&claims.email),
            first_name: text(&claims.given_name),
            last_name: text(&claims.family_name),
            code: text(&claims.code),
            roles: claims
                .realm_access
                .as_ref()
                .map(|access| access.roles.clone())
                .unwrap_or_default(),
        }
    }

    /// Normalized (lower-cased, trimmed) role set.
    pub fn roles(&self) -> RoleSet {
        normalize_roles(&self.roles)
    }

    /// True if any of `allowed` matches one of this identity's roles, ignoring case.
    pub fn has_any_role<S: AsRef<str>>(&self, allowed: &[S]) -> bool {
        has_any_role(&self.roles(), allowed)
    }

    /// "First Last", falling back to the username.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }

    /// Upper-cased initials of first and last name.
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .flat_map(char::to_uppercase)
            .collect()
    }
}

/// Lower-cases and trims role names, dropping empties.
pub fn normalize_roles<S: AsRef<str>>(roles: &[S]) -> RoleSet {
    roles
        .iter()
        .map(|role| role.as_ref().trim().to_lowercase())
        .filter(|role| !role.is_empty())
        .collect()
}

/// Case-insensitive membership check of `allowed` against a normalized set.
pub fn has_any_role<S: AsRef<str>>(roles: &RoleSet, allowed: &[S]) -> bool {
    normalize_roles(allowed)
        .iter()
        .any(|role| roles.contains(role))
}
