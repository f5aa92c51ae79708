use serde::{Deserialize, Serialize};

use super::{AgentSnapshot, NewAgent};
use crate::error::ApiError;
use crate::stars::clamp_stars;

const MISSING_FIELDS: &str = "Missing required fields";

// ── Ids ─────────────────────────────────────────────────────────

/// Agent ids arrive as JSON numbers or as the string form the API emits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum IdValue {
    Number(i64),
    Text(String),
}

impl IdValue {
    /// `Ok(None)` for an empty string, which clients send for "no id".
    pub fn to_agent_id(&self) -> Result<Option<i64>, ApiError> {
        match self {
            IdValue::Number(n) if *n > 0 => Ok(Some(*n)),
            IdValue::Number(n) => Err(ApiError::Validation(format!("invalid agent id: {n}"))),
            IdValue::Text(s) if s.trim().is_empty() => Ok(None),
            IdValue::Text(s) => parse_agent_id(s).map(Some),
        }
    }
}

/// Parse a path or body id. Only positive integers are valid agent ids.
pub fn parse_agent_id(raw: &str) -> Result<i64, ApiError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::Validation("Invalid agent ID".into())),
    }
}

// ── Create ──────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub prompt: Option<String>,
    pub tools: Option<Vec<String>>,
    pub original_agent_id: Option<IdValue>,
}

impl CreateAgent {
    pub fn validate(self) -> Result<NewAgent, ApiError> {
        let (Some(name), Some(description), Some(prompt)) = (
            non_blank(self.title),
            non_blank(self.description),
            non_blank(self.prompt),
        ) else {
            return Err(ApiError::Validation(MISSING_FIELDS.into()));
        };

        let tools = self.tools.unwrap_or_default();

        let original_agent_id = match &self.original_agent_id {
            Some(v) => v
                .to_agent_id()
                .map_err(|_| ApiError::Validation("invalid originalAgentId".into()))?,
            None => None,
        };

        Ok(NewAgent {
            name,
            description,
            prompt,
            tools,
            original_agent_id,
        })
    }
}

fn non_blank(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.trim().is_empty())
}

// ── Stars ───────────────────────────────────────────────────────

/// Absolute star update, `PATCH /agents`.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateStars {
    pub id: Option<IdValue>,
    pub stars: Option<i64>,
}

impl UpdateStars {
    /// Returns `(id, clamped_stars)`.
    pub fn validate(&self) -> Result<(i64, i64), ApiError> {
        let (Some(id), Some(stars)) = (&self.id, self.stars) else {
            return Err(ApiError::Validation(MISSING_FIELDS.into()));
        };
        let id = id
            .to_agent_id()?
            .ok_or_else(|| ApiError::Validation(MISSING_FIELDS.into()))?;
        Ok((id, clamp_stars(stars)))
    }
}

/// Relative star update, `POST /agents/:id/stars`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AdjustStars {
    pub delta: i64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StarsUpdated {
    pub id: String,
    pub stars: i64,
}

// ── Delete ──────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct AgentDeleted {
    pub id: String,
    pub deleted: bool,
}

// ── Forks ───────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForkInfo {
    pub fork_count: i64,
    pub next_fork_number: i64,
    pub suggested_name: String,
    pub original_agent: AgentSnapshot,
}

// ── Health ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct HealthResponse<'a> {
    pub service: &'a str,
    pub status: &'a str,
}
