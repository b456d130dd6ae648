use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{HeadToHead, TeamForm};

/// A team as known to a stats provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: u32,
    pub name: String,
}

/// Trait that every team-statistics source must implement.
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Resolve a free-text team name. `Ok(None)` means no such team.
    async fn search_team(&self, query: &str) -> Result<Option<TeamRef>>;

    /// Recent form of a team previously returned by `search_team`.
    async fn team_form(&self, team_id: u32) -> Result<TeamForm>;

    /// Prior meetings, oriented so that `home_id` is the home side.
    async fn head_to_head(&self, home_id: u32, away_id: u32) -> Result<HeadToHead>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
