use serde_json::Value;

/// The fetched feed decoded as JSON but missing the expected structure.
///
/// This is the recoverable-data case: the caller reports it and stops
/// without touching the firewall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedFeed;

impl std::fmt::Display for MalformedFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("range feed is missing the expected top-level items list")
    }
}

impl std::error::Error for MalformedFeed {}

/// Extracts the CIDR strings from a fetched range feed.
///
/// The feed must carry a top-level `items` array; each item contributes its
/// `cidr` string field, and items without one are skipped. Output order
/// follows feed order.
pub fn extract_cidrs(feed: &Value) -> Result<Vec<String>, MalformedFeed> {
    let Some(items) = feed.get("items").and_then(Value::as_array) else {
        return Err(MalformedFeed);
    };

    let mut addresses = Vec::with_capacity(items.len());
    for item in items {
        if let Some(cidr) = item.get("cidr").and_then(Value::as_str) {
            addresses.push(cidr.to_string());
        }
    }

    Ok(addresses)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extracts_cidrs_in_feed_order() {
        let feed = json!({
            "items": [
                {"cidr": "203.0.113.0/24", "region": "global"},
                {"cidr": "2001:db8::/32"},
                {"cidr": "198.51.100.0/22"},
            ]
        });

        let addresses = extract_cidrs(&feed).expect("feed should parse");
        assert_eq!(
            addresses,
            vec!["203.0.113.0/24", "2001:db8::/32", "198.51.100.0/22"]
        );
    }

    #[test]
    fn skips_items_without_a_cidr_field() {
        let feed = json!({
            "items": [
                {"cidr": "203.0.113.0/24"},
                {"region": "us-east-1"},
                {"cidr": 42},
                {"cidr": "198.51.100.0/22"},
            ]
        });

        let addresses = extract_cidrs(&feed).expect("feed should parse");
        assert_eq!(addresses, vec!["203.0.113.0/24", "198.51.100.0/22"]);
    }

    #[test]
    fn missing_items_key_is_malformed() {
        let feed = json!({"ranges": []});
        assert_eq!(extract_cidrs(&feed), Err(MalformedFeed));
    }

    #[test]
    fn non_array_items_value_is_malformed() {
        let feed = json!({"items": "203.0.113.0/24"});
        assert_eq!(extract_cidrs(&feed), Err(MalformedFeed));

        let feed = json!("not an object");
        assert_eq!(extract_cidrs(&feed), Err(MalformedFeed));
    }

    #[test]
    fn empty_items_list_yields_no_addresses() {
        let feed = json!({"items": []});
        assert_eq!(extract_cidrs(&feed), Ok(Vec::new()));
    }
}
