//! File-backed stats provider.
//!
//! Serves team form and head-to-head records from a JSON snapshot written by
//! whatever collects the data:
//!
//! ```json
//! {
//!   "teams": [{ "id": 1, "name": "Fenerbahce", "wins": 4, "draws": 1, "losses": 1,
//!               "goals_for": 15, "goals_against": 6, "recent_results": ["W", "D"] }],
//!   "head_to_head": [{ "home_id": 1, "away_id": 2, "home_wins": 12, "away_wins": 8, "draws": 5 }]
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::provider::{StatsProvider, TeamRef};
use crate::models::{HeadToHead, TeamForm};

pub struct SnapshotProvider {
    teams: Vec<(TeamRef, TeamForm)>,
    h2h: HashMap<(u32, u32), HeadToHead>,
}

impl SnapshotProvider {
    pub fn open(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        let value: Value = serde_json::from_str(&raw)
            .with_context(|| format!("parsing snapshot {}", path.display()))?;
        let provider = Self::from_value(&value)?;
        info!(
            "Loaded snapshot {} ({} teams, {} head-to-head records)",
            path.display(),
            provider.teams.len(),
            provider.h2h.len()
        );
        Ok(provider)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        let mut teams = Vec::new();
        for (i, entry) in array_field(value, "teams")?.iter().enumerate() {
            let path = format!("teams[{i}]");
            let id = read_id(entry, "id", &path)?;
            let form = TeamForm::from_value(entry, &path)?;
            if teams.iter().any(|(t, _): &(TeamRef, TeamForm)| t.id == id) {
                bail!("{path}: duplicate team id {id}");
            }
            teams.push((
                TeamRef {
                    id,
                    name: form.name.clone(),
                },
                form,
            ));
        }

        let mut h2h = HashMap::new();
        for (i, entry) in array_field(value, "head_to_head")?.iter().enumerate() {
            let path = format!("head_to_head[{i}]");
            let home_id = read_id(entry, "home_id", &path)?;
            let away_id = read_id(entry, "away_id", &path)?;
            h2h.insert((home_id, away_id), HeadToHead::from_value(entry, &path)?);
        }

        Ok(SnapshotProvider { teams, h2h })
    }

    fn find(&self, query: &str) -> Option<&TeamRef> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        let exact = self
            .teams
            .iter()
            .map(|(t, _)| t)
            .find(|t| t.name.to_lowercase() == needle);
        exact.or_else(|| {
            self.teams
                .iter()
                .map(|(t, _)| t)
                .find(|t| t.name.to_lowercase().contains(&needle))
        })
    }
}

#[async_trait]
impl StatsProvider for SnapshotProvider {
    async fn search_team(&self, query: &str) -> Result<Option<TeamRef>> {
        let found = self.find(query).cloned();
        debug!(query, found = ?found.as_ref().map(|t| t.id), "team search");
        Ok(found)
    }

    async fn team_form(&self, team_id: u32) -> Result<TeamForm> {
        self.teams
            .iter()
            .find(|(t, _)| t.id == team_id)
            .map(|(_, form)| form.clone())
            .ok_or_else(|| anyhow!("unknown team id {team_id}"))
    }

    async fn head_to_head(&self, home_id: u32, away_id: u32) -> Result<HeadToHead> {
        if let Some(record) = self.h2h.get(&(home_id, away_id)) {
            return Ok(*record);
        }
        if let Some(record) = self.h2h.get(&(away_id, home_id)) {
            return Ok(record.reversed());
        }
        Ok(HeadToHead::default())
    }

    fn name(&self) -> &str {
        "snapshot"
    }
}

fn array_field<'a>(value: &'a Value, key: &str) -> Result<&'a [Value]> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => bail!("snapshot field `{key}` must be an array"),
    }
}

fn read_id(entry: &Value, key: &str, path: &str) -> Result<u32> {
    entry
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|id| u32::try_from(id).ok())
        .ok_or_else(|| anyhow!("{path}.{key}: expected a non-negative integer id"))
}
