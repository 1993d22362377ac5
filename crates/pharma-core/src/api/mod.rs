//! Backend REST client: one execution path, typed resource families.

pub mod client;
pub mod page;
pub mod resources;
pub mod types;

pub use client::{BackendClient, USER_AGENT_VALUE};
pub use page::{Page, PageRequest};
pub use resources::AccountInfo;
