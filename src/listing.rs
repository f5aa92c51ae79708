use std::cmp::Reverse;
use std::collections::HashMap;

use worker::D1Database;

use crate::db;
use crate::error::ApiError;
use crate::models;

/// Client-facing message for any store failure while listing.
pub const LIST_FAILED: &str = "Failed to fetch agents";

/// Listing orders offered by `GET /agents?sort=`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first.
    #[default]
    Recent,
    /// By name, ascending.
    Az,
    /// Most forked first, computed after fetching in recent order.
    Forks,
    /// Most starred first.
    Leaderboard,
}

impl SortOrder {
    /// Absent or empty means the default; anything unrecognized is rejected.
    pub fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(SortOrder::default());
        };
        match raw.to_ascii_lowercase().as_str() {
            "recent" => Ok(SortOrder::Recent),
            "az" => Ok(SortOrder::Az),
            "forks" => Ok(SortOrder::Forks),
            "leaderboard" => Ok(SortOrder::Leaderboard),
            _ => Err(ApiError::Validation(format!(
                "invalid sort '{raw}' (expected recent|az|forks|leaderboard)"
            ))),
        }
    }

    /// SQL `ORDER BY` body. Fork ordering happens in memory, so it fetches by recency.
    pub fn order_by(&self) -> &'static str {
        match self {
            Self::Recent | Self::Forks => "id DESC",
            Self::Az => "name ASC, id DESC",
            Self::Leaderboard => "stars DESC, id DESC",
        }
    }
}

pub async fn list_agents(
    d1: &D1Database,
    order: SortOrder,
    limit: u32,
) -> Result<Vec<models::AgentSummary>, ApiError> {
    let agents = db::list_agents(d1, order, limit)
        .await
        .map_err(ApiError::internal(LIST_FAILED))?;
    let counts = db::fork_counts(d1, order, limit)
        .await
        .map_err(ApiError::internal(LIST_FAILED))?;
    Ok(annotate(agents, &counts, order))
}

/// Attach fork counts and apply the in-memory part of the ordering.
///
/// The `forks` sort is stable, so agents with equal counts keep the order
/// they were fetched in.
pub fn annotate(
    agents: Vec<models::Agent>,
    counts: &HashMap<i64, i64>,
    order: SortOrder,
) -> Vec<models::AgentSummary> {
    let mut summaries: Vec<models::AgentSummary> = agents
        .into_iter()
        .map(|agent| {
            let forks = counts.get(&agent.id).copied().unwrap_or(0);
            agent.into_summary(forks)
        })
        .collect();

    if order == SortOrder::Forks {
        summaries.sort_by_key(|s| Reverse(s.fork_count.unwrap_or(0)));
    }
    summaries
}
