use worker::D1Database;

use crate::db;
use crate::error::ApiError;
use crate::models;

pub const FORKS_FAILED: &str = "Failed to fetch fork count";

/// Name offered to a client forking `name` for the `next`-th time.
pub fn suggested_fork_name(name: &str, next: i64) -> String {
    if next == 1 {
        format!("{name} (Fork)")
    } else {
        format!("{name} (Fork {next})")
    }
}

/// Fork info for `original` given how many agents already point at it.
///
/// The count is by `original_agent_id` only; a renamed fork still counts.
pub fn fork_info(original: &models::Agent, fork_count: i64) -> models::ForkInfo {
    let next_fork_number = fork_count + 1;
    models::ForkInfo {
        fork_count,
        next_fork_number,
        suggested_name: suggested_fork_name(&original.name, next_fork_number),
        original_agent: original.snapshot(),
    }
}

pub async fn resolve(d1: &D1Database, id: i64) -> Result<models::ForkInfo, ApiError> {
    let original = db::get_agent(d1, id)
        .await
        .map_err(ApiError::internal(FORKS_FAILED))?
        .ok_or_else(ApiError::not_found)?;
    let fork_count = db::count_forks(d1, id)
        .await
        .map_err(ApiError::internal(FORKS_FAILED))?;
    Ok(fork_info(&original, fork_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot() -> models::Agent {
        models::Agent {
            id: 1,
            name: "Bot".into(),
            description: "d".into(),
            prompt: "p".into(),
            tools: vec!["search".into()],
            original_agent_id: None,
            stars: 0,
            created_at: "2026-01-01T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn first_fork_has_no_number() {
        assert_eq!(suggested_fork_name("Bot", 1), "Bot (Fork)");
    }

    #[test]
    fn later_forks_are_numbered() {
        assert_eq!(suggested_fork_name("Bot", 2), "Bot (Fork 2)");
        assert_eq!(suggested_fork_name("Bot", 11), "Bot (Fork 11)");
    }

    #[test]
    fn unforked_agent() {
        let info = fork_info(&bot(), 0);
        assert_eq!(info.fork_count, 0);
        assert_eq!(info.next_fork_number, 1);
        assert_eq!(info.suggested_name, "Bot (Fork)");
        assert_eq!(info.original_agent.id, "1");
        assert_eq!(info.original_agent.tools, vec!["search"]);
    }

    #[test]
    fn next_number_follows_count() {
        let info = fork_info(&bot(), 4);
        assert_eq!(info.fork_count, 4);
        assert_eq!(info.next_fork_number, 5);
        assert_eq!(info.suggested_name, "Bot (Fork 5)");
    }

    #[test]
    fn forking_a_fork_nests_the_suffix() {
        let mut fork = bot();
        fork.name = "Bot (Fork)".into();
        assert_eq!(fork_info(&fork, 0).suggested_name, "Bot (Fork) (Fork)");
    }

    #[test]
    fn store_failure_reports_fork_context() {
        let err = ApiError::internal(FORKS_FAILED)(worker::Error::RustError("D1_ERROR".into()));
        assert_eq!(err.status(), 500);
        assert_eq!(err.body("id").error, "Failed to fetch fork count");
    }

    #[test]
    fn fork_info_serializes_camel_case() {
        let json = serde_json::to_value(fork_info(&bot(), 0)).unwrap();
        assert_eq!(json["forkCount"], 0);
        assert_eq!(json["nextForkNumber"], 1);
        assert_eq!(json["suggestedName"], "Bot (Fork)");
        assert_eq!(json["originalAgent"]["name"], "Bot");
    }
}
