use crate::listing::SortOrder;
use crate::models;
use std::collections::HashMap;
use wasm_bindgen::JsValue;
use worker::*;

fn now_iso() -> String {
    js_sys::Date::new_0()
        .to_iso_string()
        .as_string()
        .unwrap_or_default()
}

fn opt_int(v: Option<i64>) -> JsValue {
    match v {
        Some(v) => int(v),
        None => JsValue::NULL,
    }
}

// D1 binds JS numbers; i64 would cross as BigInt.
fn int(v: i64) -> JsValue {
    JsValue::from_f64(v as f64)
}

fn changed(res: &D1Result) -> Result<bool> {
    Ok(res
        .meta()?
        .map(|m| m.changes.unwrap_or(0) > 0)
        .unwrap_or(false))
}

// ── Agents ──────────────────────────────────────────────────────

pub async fn insert_agent(db: &D1Database, agent: &models::NewAgent) -> Result<models::Agent> {
    let now = now_iso();
    let tools_json = serde_json::to_string(&agent.tools)
        .map_err(|e| Error::RustError(format!("serialize tools: {e}")))?;

    let row: Option<AgentRow> = db
        .prepare(
            "INSERT INTO agents (name, description, prompt, tools, original_agent_id, stars, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)
             RETURNING *",
        )
        .bind(&[
            JsValue::from_str(&agent.name),
            JsValue::from_str(&agent.description),
            JsValue::from_str(&agent.prompt),
            JsValue::from_str(&tools_json),
            opt_int(agent.original_agent_id),
            JsValue::from_str(&now),
        ])?
        .first(None)
        .await?;

    row.map(AgentRow::into_agent)
        .ok_or_else(|| Error::RustError("insert returned no row".into()))
}

pub async fn get_agent(db: &D1Database, id: i64) -> Result<Option<models::Agent>> {
    let row: Option<AgentRow> = db
        .prepare("SELECT * FROM agents WHERE id = ?1")
        .bind(&[int(id)])?
        .first(None)
        .await?;
    Ok(row.map(AgentRow::into_agent))
}

pub async fn list_agents(
    db: &D1Database,
    order: SortOrder,
    limit: u32,
) -> Result<Vec<models::Agent>> {
    let query = list_query(order);
    let result: D1Result = db.prepare(&query).bind(&[JsValue::from(limit)])?.all().await?;
    let rows: Vec<AgentRow> = result.results()?;
    Ok(rows.into_iter().map(AgentRow::into_agent).collect())
}

fn list_query(order: SortOrder) -> String {
    format!("SELECT * FROM agents ORDER BY {} LIMIT ?1", order.order_by())
}

pub async fn delete_agent(db: &D1Database, id: i64) -> Result<bool> {
    let res: D1Result = db
        .prepare("DELETE FROM agents WHERE id = ?1")
        .bind(&[int(id)])?
        .run()
        .await?;
    changed(&res)
}

// ── Forks ───────────────────────────────────────────────────────

pub async fn count_forks(db: &D1Database, id: i64) -> Result<i64> {
    let row: Option<CountRow> = db
        .prepare("SELECT COUNT(*) AS count FROM agents WHERE original_agent_id = ?1")
        .bind(&[int(id)])?
        .first(None)
        .await?;
    Ok(row.map(|r| r.count).unwrap_or(0))
}

/// Fork counts for the page `list_agents` returns for the same order and limit.
/// Agents with no forks are absent.
pub async fn fork_counts(
    db: &D1Database,
    order: SortOrder,
    limit: u32,
) -> Result<HashMap<i64, i64>> {
    let result: D1Result = db
        .prepare(&fork_counts_query(order))
        .bind(&[JsValue::from(limit)])?
        .all()
        .await?;
    let rows: Vec<ForkCountRow> = result.results()?;
    Ok(rows
        .into_iter()
        .map(|r| (r.original_agent_id, r.fork_count))
        .collect())
}

// The page is selected in a subquery so the bind count stays at one whatever
// the limit; D1 caps bound parameters per statement.
fn fork_counts_query(order: SortOrder) -> String {
    format!(
        "SELECT original_agent_id, COUNT(*) AS fork_count FROM agents
         WHERE original_agent_id IN (SELECT id FROM agents ORDER BY {} LIMIT ?1)
         GROUP BY original_agent_id",
        order.order_by()
    )
}

// ── Stars ───────────────────────────────────────────────────────

/// Returns the stored value, or `None` if the agent does not exist.
pub async fn set_stars(db: &D1Database, id: i64, stars: i64) -> Result<Option<i64>> {
    let row: Option<StarsRow> = db
        .prepare("UPDATE agents SET stars = MAX(0, ?1) WHERE id = ?2 RETURNING stars")
        .bind(&[int(stars), int(id)])?
        .first(None)
        .await?;
    Ok(row.map(|r| r.stars))
}

/// Atomic relative update; the clamp happens inside the same statement.
pub async fn adjust_stars(db: &D1Database, id: i64, delta: i64) -> Result<Option<i64>> {
    let row: Option<StarsRow> = db
        .prepare("UPDATE agents SET stars = MAX(0, stars + ?1) WHERE id = ?2 RETURNING stars")
        .bind(&[int(delta), int(id)])?
        .first(None)
        .await?;
    Ok(row.map(|r| r.stars))
}

// ── Rows ────────────────────────────────────────────────────────

#[derive(Debug, serde::Deserialize)]
struct CountRow {
    count: i64,
}

#[derive(Debug, serde::Deserialize)]
struct StarsRow {
    stars: i64,
}

#[derive(Debug, serde::Deserialize)]
struct ForkCountRow {
    original_agent_id: i64,
    fork_count: i64,
}

#[derive(Debug, serde::Deserialize)]
pub struct AgentRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub prompt: String,
    pub tools: Option<String>,
    pub original_agent_id: Option<i64>,
    pub stars: i64,
    pub created_at: String,
}

impl AgentRow {
    pub fn into_agent(self) -> models::Agent {
        models::Agent {
            id: self.id,
            name: self.name,
            description: self.description,
            prompt: self.prompt,
            tools: parse_tools(&self.tools),
            original_agent_id: self.original_agent_id,
            stars: self.stars.max(0),
            created_at: self.created_at,
        }
    }
}

fn parse_tools(tools: &Option<String>) -> Vec<String> {
    tools
        .as_ref()
        .and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(tools: Option<&str>) -> AgentRow {
        AgentRow {
            id: 3,
            name: "Bot".into(),
            description: "d".into(),
            prompt: "p".into(),
            tools: tools.map(Into::into),
            original_agent_id: Some(1),
            stars: 4,
            created_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    const ORDERS: [SortOrder; 4] = [
        SortOrder::Recent,
        SortOrder::Az,
        SortOrder::Forks,
        SortOrder::Leaderboard,
    ];

    // D1 rejects statements binding more than this many parameters.
    const D1_MAX_BOUND_PARAMS: usize = 100;

    fn placeholders(sql: &str) -> usize {
        sql.matches('?').count()
    }

    #[test]
    fn fork_counts_query_binds_only_the_limit() {
        for order in ORDERS {
            let q = fork_counts_query(order);
            assert_eq!(placeholders(&q), 1, "{q}");
            assert!(q.contains("LIMIT ?1"));
            assert!(q.contains("GROUP BY original_agent_id"));
        }
    }

    #[test]
    fn fork_counts_bind_count_independent_of_max_list_limit() {
        assert!(crate::config::MAX_LIST_LIMIT as usize > D1_MAX_BOUND_PARAMS);
        for order in ORDERS {
            assert!(placeholders(&fork_counts_query(order)) <= D1_MAX_BOUND_PARAMS);
        }
    }

    #[test]
    fn fork_counts_page_matches_listing_page() {
        for order in ORDERS {
            let page = format!("SELECT id FROM agents ORDER BY {} LIMIT ?1", order.order_by());
            assert!(fork_counts_query(order).contains(&page));
            assert!(list_query(order).ends_with(&format!("ORDER BY {} LIMIT ?1", order.order_by())));
        }
    }

    #[test]
    fn tools_parse_preserving_order_and_duplicates() {
        let agent = row(Some(r#"["search","calculator","search"]"#)).into_agent();
        assert_eq!(agent.tools, vec!["search", "calculator", "search"]);
    }

    #[test]
    fn missing_or_corrupt_tools_become_empty() {
        assert!(row(None).into_agent().tools.is_empty());
        assert!(row(Some("not json")).into_agent().tools.is_empty());
        assert!(row(Some("{}")).into_agent().tools.is_empty());
    }

    #[test]
    fn row_maps_all_columns() {
        let agent = row(Some("[]")).into_agent();
        assert_eq!(agent.id, 3);
        assert_eq!(agent.name, "Bot");
        assert_eq!(agent.original_agent_id, Some(1));
        assert_eq!(agent.stars, 4);
    }
}
