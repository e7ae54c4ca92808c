// crmctl-api: Async Rust client for the CRM administration REST API

pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod resources;
pub mod transport;

pub use auth::{AuthUser, LoginResponse, RoleRef};
pub use client::ApiClient;
pub use envelope::{DEFAULT_LIMIT, DEFAULT_PAGE, Envelope, Limit, ListQuery, Page, value_id};
pub use error::Error;
pub use transport::TransportConfig;
