// ── Resource-API factory ──
//
// One generic operation set (list/get/create/update/delete) per resource,
// sharing the console's query cache.

mod api;
mod descriptor;
mod registry;

pub use api::{AuthFailureHook, ResourceApi};
pub use descriptor::ResourceDescriptor;
pub use registry::ResourceRegistry;
