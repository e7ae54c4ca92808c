// ── Runtime console configuration ──
//
// Describes *where* the backend lives and how to talk to it. Never touches
// disk: the CLI resolves profiles and hands a `ConsoleConfig` in.

use std::time::Duration;

use url::Url;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for one backend.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// API root, e.g. `https://crm.example.com/api`.
    pub base_url: Url,
    /// Request timeout.
    pub timeout: Duration,
    /// Page size used when a list call leaves `limit` unset.
    pub page_size: u32,
}

impl ConsoleConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            page_size: crmctl_api::DEFAULT_LIMIT,
        }
    }
}
