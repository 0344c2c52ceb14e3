//! Lineage configuration

use serde::Deserialize;

/// Lineage resolution settings
#[derive(Debug, Clone, Deserialize)]
pub struct LineageConfig {
    /// Log a warning when boxes linked to pallets do not match the lot's
    /// recorded box count
    #[serde(default = "default_warn_on_box_mismatch")]
    pub warn_on_box_mismatch: bool,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            warn_on_box_mismatch: default_warn_on_box_mismatch(),
        }
    }
}

fn default_warn_on_box_mismatch() -> bool {
    true
}
