use serde_json::{json, Value};

use crate::adapters::feed::RangeFeed;
use crate::adapters::firewall::FirewallApi;
use crate::runtime::contract::{SyncParams, SyncResponse, GROUP_DESCRIPTION};
use crate::runtime::feed::extract_cidrs;
use crate::runtime::rules::{build_ingress_rules, SecurityGroupState};

/// Fatal workflow failure. The binary maps this into a failed invocation,
/// so the host sees no result payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncHandlerError {
    pub message: String,
}

/// Runs one full synchronization pass: resolve parameters, fetch the range
/// feed, resolve (or create) the target group, then replace its ingress
/// rules with the image of the feed.
///
/// A feed missing the expected structure terminates the run normally with
/// an explanatory message and no firewall calls. Revoke always completes
/// before authorize is attempted.
pub fn handle_sync_event(
    event: Value,
    feed: &dyn RangeFeed,
    firewall: &dyn FirewallApi,
) -> Result<SyncResponse, SyncHandlerError> {
    let params = SyncParams::from_event(&event);
    if params.verbose {
        log_sync_info(
            "sync_started",
            json!({
                "group_name": params.group_name,
                "source_url": params.source_url,
                "dry_run": params.dry_run,
            }),
        );
    }

    let feed_body = feed
        .fetch_ranges(&params.source_url)
        .map_err(|error| fatal("range_fetch_failed", error))?;

    let addresses = match extract_cidrs(&feed_body) {
        Ok(value) => value,
        Err(error) => {
            log_sync_error(
                "malformed_range_feed",
                json!({
                    "source_url": params.source_url,
                    "error": error.to_string(),
                }),
            );
            return Ok(SyncResponse::malformed_feed());
        }
    };

    let group = resolve_group(&params, firewall)?;

    if !group.ingress_rules.is_empty() {
        if params.verbose {
            log_sync_info(
                "revoking_existing_rules",
                json!({
                    "group_id": group.group_id,
                    "rules": group.ingress_rules,
                }),
            );
        }
        firewall
            .revoke_ingress(&group.group_id, &group.ingress_rules, params.dry_run)
            .map_err(|error| fatal("rule_revoke_failed", error))?;
    }

    let rules = build_ingress_rules(&params.group_name, &addresses);
    if params.verbose {
        log_sync_info(
            "authorizing_new_rules",
            json!({
                "group_id": group.group_id,
                "rules": rules,
            }),
        );
    }
    firewall
        .authorize_ingress(&group.group_id, &rules, params.dry_run)
        .map_err(|error| fatal("rule_authorize_failed", error))?;

    Ok(SyncResponse::updated(rules.len()))
}

fn resolve_group(
    params: &SyncParams,
    firewall: &dyn FirewallApi,
) -> Result<SecurityGroupState, SyncHandlerError> {
    let groups = firewall
        .describe_groups(&params.group_name, params.dry_run)
        .map_err(|error| fatal("group_lookup_failed", error))?;

    // Name uniqueness is assumed; the first match wins when it is not.
    if groups.len() > 1 && params.verbose {
        log_sync_info(
            "multiple_group_matches",
            json!({
                "group_name": params.group_name,
                "matches": groups.len(),
            }),
        );
    }

    match groups.into_iter().next() {
        Some(group) => Ok(group),
        None => {
            if params.verbose {
                log_sync_info(
                    "creating_missing_group",
                    json!({ "group_name": params.group_name }),
                );
            }
            let group_id = firewall
                .create_group(&params.group_name, GROUP_DESCRIPTION, params.dry_run)
                .map_err(|error| fatal("group_create_failed", error))?;
            Ok(SecurityGroupState {
                group_id,
                ingress_rules: Vec::new(),
            })
        }
    }
}

fn fatal(event: &str, error: String) -> SyncHandlerError {
    log_sync_error(event, json!({ "error": error }));
    SyncHandlerError { message: error }
}

fn log_sync_info(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "sync_handler",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}

fn log_sync_error(event: &str, details: serde_json::Value) {
    eprintln!(
        "{}",
        json!({
            "component": "sync_handler",
            "level": "error",
            "event": event,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "details": details,
        })
    );
}
