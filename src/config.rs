use worker::{console_log, Env};

/// D1 binding holding the `agents` table.
pub const DB_BINDING: &str = "DB";

const LIST_LIMIT_VAR: &str = "LIST_LIMIT";
const SERVICE_NAME_VAR: &str = "SERVICE_NAME";

pub const DEFAULT_LIST_LIMIT: u32 = 50;
pub const MAX_LIST_LIMIT: u32 = 200;
const DEFAULT_SERVICE_NAME: &str = "subnet";

/// Runtime settings read from worker vars, falling back to built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub list_limit: u32,
    pub service_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            list_limit: DEFAULT_LIST_LIMIT,
            service_name: DEFAULT_SERVICE_NAME.into(),
        }
    }
}

impl Config {
    pub fn from_env(env: &Env) -> Self {
        let defaults = Self::default();
        let var = |name: &str| env.var(name).ok().map(|v| v.to_string());
        Self {
            list_limit: parse_list_limit(var(LIST_LIMIT_VAR).as_deref()).unwrap_or_else(|raw| {
                console_log!(
                    "WARN: {LIST_LIMIT_VAR}={raw:?} is not a number; using {DEFAULT_LIST_LIMIT}"
                );
                defaults.list_limit
            }),
            service_name: var(SERVICE_NAME_VAR)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.service_name),
        }
    }
}

/// Absent means the default. `Err` carries the raw value that failed to parse.
fn parse_list_limit(raw: Option<&str>) -> Result<u32, String> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_LIST_LIMIT);
    };
    raw.trim()
        .parse::<u32>()
        .map(|n| n.clamp(1, MAX_LIST_LIMIT))
        .map_err(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.list_limit, 50);
        assert_eq!(c.service_name, "subnet");
    }

    #[test]
    fn list_limit_absent_uses_default() {
        assert_eq!(parse_list_limit(None), Ok(DEFAULT_LIST_LIMIT));
    }

    #[test]
    fn list_limit_parses_and_clamps() {
        assert_eq!(parse_list_limit(Some("25")), Ok(25));
        assert_eq!(parse_list_limit(Some(" 10 ")), Ok(10));
        assert_eq!(parse_list_limit(Some("0")), Ok(1));
        assert_eq!(parse_list_limit(Some("5000")), Ok(MAX_LIST_LIMIT));
    }

    #[test]
    fn unparseable_list_limit_reports_raw_value() {
        assert_eq!(parse_list_limit(Some("fifty")), Err("fifty".to_string()));
        assert_eq!(parse_list_limit(Some("-3")), Err("-3".to_string()));
        assert_eq!(parse_list_limit(Some("")), Err(String::new()));
        assert_eq!(
            parse_list_limit(Some("fifty")).unwrap_or(Config::default().list_limit),
            DEFAULT_LIST_LIMIT
        );
    }
}
