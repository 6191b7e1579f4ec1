use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_GROUP_NAME: &str = "atlassian_id";
pub const DEFAULT_SOURCE_URL: &str = "https://ip-ranges.atlassian.com/";
pub const GROUP_DESCRIPTION: &str = "Security group managed by range-sync";
pub const MALFORMED_FEED_MESSAGE: &str = "Malformed JSON, aborting";

/// Parameters resolved once per invocation from the raw event payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncParams {
    pub dry_run: bool,
    pub verbose: bool,
    pub group_name: String,
    pub source_url: String,
}

impl SyncParams {
    /// Resolves each parameter independently, falling back to its default
    /// when the key is absent from the event.
    pub fn from_event(event: &Value) -> Self {
        Self {
            dry_run: flag_param(event, "DRY_RUN"),
            verbose: flag_param(event, "VERBOSE"),
            group_name: string_param(event, "GROUP_NAME", DEFAULT_GROUP_NAME),
            source_url: string_param(event, "IPRANGE_URL", DEFAULT_SOURCE_URL),
        }
    }
}

/// Flag values are accepted from string payload values only; a native JSON
/// boolean does not count.
pub fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

fn flag_param(event: &Value, key: &str) -> bool {
    event
        .get(key)
        .and_then(Value::as_str)
        .map(parse_flag)
        .unwrap_or(false)
}

fn string_param(event: &Value, key: &str, default: &str) -> String {
    event
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncResponse {
    pub message: String,
}

impl SyncResponse {
    pub fn malformed_feed() -> Self {
        Self {
            message: MALFORMED_FEED_MESSAGE.to_string(),
        }
    }

    pub fn updated(rule_count: usize) -> Self {
        Self {
            message: format!("successfully updated {rule_count} security group rules"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn from_event_applies_defaults_for_empty_payload() {
        let params = SyncParams::from_event(&json!({}));

        assert_eq!(
            params,
            SyncParams {
                dry_run: false,
                verbose: false,
                group_name: DEFAULT_GROUP_NAME.to_string(),
                source_url: DEFAULT_SOURCE_URL.to_string(),
            }
        );
    }

    #[test]
    fn from_event_reads_overrides() {
        let params = SyncParams::from_event(&json!({
            "DRY_RUN": "true",
            "VERBOSE": "TRUE",
            "GROUP_NAME": "edge_allowlist",
            "IPRANGE_URL": "https://ranges.example.com/v1",
        }));

        assert!(params.dry_run);
        assert!(params.verbose);
        assert_eq!(params.group_name, "edge_allowlist");
        assert_eq!(params.source_url, "https://ranges.example.com/v1");
    }

    #[test]
    fn flags_parse_true_only_from_true_strings() {
        assert!(parse_flag("true"));
        assert!(parse_flag("True"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag("yes"));
        assert!(!parse_flag("1"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn flags_ignore_native_booleans() {
        let params = SyncParams::from_event(&json!({
            "DRY_RUN": true,
            "VERBOSE": true,
        }));

        assert!(!params.dry_run);
        assert!(!params.verbose);
    }

    #[test]
    fn updated_message_carries_rule_count() {
        assert_eq!(
            SyncResponse::updated(17).message,
            "successfully updated 17 security group rules"
        );
        assert_eq!(SyncResponse::malformed_feed().message, "Malformed JSON, aborting");
    }
}
