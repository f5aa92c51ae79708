use serde::{Deserialize, Serialize};

// ── Tool catalog ────────────────────────────────────────────────

/// A capability an agent may be granted.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ToolInfo {
    pub value: &'static str,
    pub label: &'static str,
}

/// Suggested tools with display labels, served at `GET /tools`. Agents may
/// carry identifiers outside this list.
pub const AVAILABLE_TOOLS: &[ToolInfo] = &[
    ToolInfo { value: "search", label: "Web Search" },
    ToolInfo { value: "browse", label: "Web Browser" },
    ToolInfo { value: "code_interpreter", label: "Code Interpreter" },
    ToolInfo { value: "file_reader", label: "File Reader" },
    ToolInfo { value: "calculator", label: "Calculator" },
    ToolInfo { value: "image_generation", label: "Image Generation" },
    ToolInfo { value: "email", label: "Email" },
    ToolInfo { value: "calendar", label: "Calendar" },
];

// ── Agent ───────────────────────────────────────────────────────

/// A shared agent configuration as stored in the `agents` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub prompt: String,
    pub tools: Vec<String>,
    pub original_agent_id: Option<i64>,
    pub stars: i64,
    pub created_at: String,
}

impl Agent {
    /// External representation. `fork_count` is only emitted when positive.
    pub fn into_summary(self, fork_count: i64) -> AgentSummary {
        AgentSummary {
            id: self.id.to_string(),
            title: self.name,
            description: self.description,
            prompt: self.prompt,
            tools: self.tools,
            stars: self.stars,
            created_at: self.created_at,
            original_agent_id: self.original_agent_id.map(|id| id.to_string()),
            fork_count: (fork_count > 0).then_some(fork_count),
        }
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id.to_string(),
            name: self.name.clone(),
            description: self.description.clone(),
            prompt: self.prompt.clone(),
            tools: self.tools.clone(),
        }
    }
}

/// Agent as exposed over HTTP: string id, `title` for the name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub prompt: String,
    pub tools: Vec<String>,
    pub stars: i64,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fork_count: Option<i64>,
}

/// The fields of an original agent a client needs to prefill a fork.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSnapshot {
    pub id: String,
    pub name: String,
    pub description: String,
    pub prompt: String,
    pub tools: Vec<String>,
}

/// Validated input for inserting a new agent.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAgent {
    pub name: String,
    pub description: String,
    pub prompt: String,
    pub tools: Vec<String>,
    pub original_agent_id: Option<i64>,
}
