use tracing::{debug, info};

use crate::writer::DEFAULT_MAX_PAGES_PER_GROUP;

pub const DEFAULT_PACKAGE_NAME: &str = "date-fns";

/// Settings shared by `migrate` and `publish`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Name of the package record versions are attached to.
    pub package_name: String,
    /// Pages per write group; the first group also carries the version record.
    pub max_pages_per_group: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            max_pages_per_group: DEFAULT_MAX_PAGES_PER_GROUP,
        }
    }
}

impl RunConfig {
    pub fn trace_loaded(&self) {
        info!(
            package = %self.package_name,
            max_pages_per_group = self.max_pages_per_group,
            "Loaded RunConfig"
        );
        debug!(?self, "RunConfig loaded (full debug)");
    }
}
