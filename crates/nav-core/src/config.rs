//! Engine configuration.

use crate::{Cost, CoreError, CoreResult};

/// Top-level navigation configuration.
///
/// Typically loaded from a JSON file by the application crate and passed to
/// `NavigationServiceBuilder`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavConfig {
    /// Stamina cap for every traveler.  New travelers start full.
    pub max_stamina: Cost,

    /// Graphs with at least this many locations build their path index on
    /// Rayon's pool when the `parallel` feature of `nav-graph` is enabled.
    /// Below it the sequential build is faster.
    pub parallel_index_min_nodes: usize,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            max_stamina:              100,
            parallel_index_min_nodes: 64,
        }
    }
}

impl NavConfig {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_stamina == 0 {
            return Err(CoreError::Config("max_stamina must be positive".into()));
        }
        Ok(())
    }
}
