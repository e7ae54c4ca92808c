// ── Domain model ──
//
// Typed views of the backend's records. Every type keeps unknown fields in
// `extra` so a record can be read, edited, and written back whole.

pub mod common;

pub mod contact;
pub mod filter;
pub mod lead;
pub mod pipeline;
pub mod role;
pub mod stage;
pub mod user;

// ── Re-exports ──────────────────────────────────────────────────────

pub use common::{Entity, SYSTEM_CREATOR, from_record, parse_timestamp, to_record};

pub use contact::Contact;
pub use filter::{Filter, FilterType};
pub use lead::{Lead, LeadStatus, Priority};
pub use pipeline::Pipeline;
pub use role::{ADMIN_ROLE, Role};
pub use stage::{Stage, StageType};
pub use user::User;
