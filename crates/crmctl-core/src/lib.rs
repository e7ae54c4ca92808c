//! Data layer between `crmctl-api` and the command-line front end.
//!
//! - **[`Console`]** holds the transport, the query cache, the resource
//!   registry and the signed-in session. [`Console::init`] restores a saved
//!   session; a 401 from any operation signs it out again.
//!
//! - **[`QueryCache`]** stores list and single-record responses under tags.
//!   Identical requests share one fetch, writes mark dependent entries stale,
//!   and deletes patch cached lists optimistically with rollback on failure.
//!
//! - **[`ResourceApi<T>`]** is the list/get/create/update/delete set for one
//!   resource, produced uniformly from a [`ResourceDescriptor`].
//!
//! - **[`table`]** turns field descriptors into rendered, sortable columns
//!   and row action menus; [`modules`] declares them for every resource.

pub mod cache;
pub mod config;
pub mod console;
pub mod error;
pub mod model;
pub mod modules;
pub mod resource;
pub mod session;
pub mod table;
pub mod validation;

// ── Primary re-exports ──────────────────────────────────────────────
pub use cache::{QueryCache, QueryKey, Tag, TagId};
pub use config::ConsoleConfig;
pub use console::Console;
pub use error::{CoreError, Failure};
pub use modules::{FormMode, Intent, Lookups};
pub use resource::{AuthFailureHook, ResourceApi, ResourceDescriptor, ResourceRegistry};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore, SessionUser};
pub use validation::{FieldError, Rule, ValidationErrors};

pub use model::{
    Contact, Entity, Filter, FilterType, Lead, LeadStatus, Pipeline, Priority, Role, Stage, StageType, User,
};

pub use crmctl_api::{DEFAULT_LIMIT, Limit, ListQuery, Page};
