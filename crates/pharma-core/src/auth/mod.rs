//! Authentication: token exchange, identity, persisted session and role checks.

pub mod claims;
pub mod guard;
pub mod identity;
pub mod provider;
pub mod session;
pub mod store;

pub use claims::{TokenClaims, decode_claims};
pub use guard::{Section, visible_sections};
pub use identity::{RoleSet, UserIdentity};
pub use provider::{IdentityProvider, TokenPair};
pub use session::{
    AccessDecision, Authenticated, Route, Session, SessionEvent, SessionManager, SessionReader,
};
pub use store::{FileSessionStore, MemorySessionStore, PersistedSession, SessionStore};
