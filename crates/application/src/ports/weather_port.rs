//! Weather snapshot port
//!
//! The pipeline never fetches weather itself; the hosting UI (which owns the
//! forecast data it is already rendering) supplies the current snapshot.

use domain::WeatherSnapshot;
#[cfg(test)]
use mockall::automock;

/// Port for the hosting layer's current weather snapshot
#[cfg_attr(test, automock)]
pub trait WeatherSnapshotPort: Send + Sync {
    /// The snapshot to embed in the next prompt, if one is available
    fn current(&self) -> Option<WeatherSnapshot>;
}
