pub mod provider;
pub mod snapshot;

pub use provider::{StatsProvider, TeamRef};
pub use snapshot::SnapshotProvider;
