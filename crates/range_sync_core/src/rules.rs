use serde::{Deserialize, Serialize};

pub const RULE_PROTOCOL: &str = "tcp";
pub const RULE_FROM_PORT: i32 = 0;
pub const RULE_TO_PORT: i32 = 65535;

/// Source range of an ingress rule, classified by address family.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RuleSource {
    Ipv4(String),
    Ipv6(String),
}

impl RuleSource {
    /// Classification is purely syntactic: a CIDR containing a colon is
    /// IPv6, anything else is IPv4.
    pub fn classify(cidr: &str) -> Self {
        if cidr.contains(':') {
            Self::Ipv6(cidr.to_string())
        } else {
            Self::Ipv4(cidr.to_string())
        }
    }
}

/// A single ingress permission, one source range per rule.
///
/// Built rules always carry ports and a description; rules read back from
/// the provider may lack either.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngressRule {
    pub protocol: String,
    pub from_port: Option<i32>,
    pub to_port: Option<i32>,
    pub source: RuleSource,
    pub description: Option<String>,
}

/// The resolved target group: provider-assigned identifier plus the exact
/// ingress rule list read at resolution time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecurityGroupState {
    pub group_id: String,
    pub ingress_rules: Vec<IngressRule>,
}

/// Builds one full-port-range tcp rule per fetched address.
pub fn build_ingress_rules(group_name: &str, addresses: &[String]) -> Vec<IngressRule> {
    addresses
        .iter()
        .map(|address| IngressRule {
            protocol: RULE_PROTOCOL.to_string(),
            from_port: Some(RULE_FROM_PORT),
            to_port: Some(RULE_TO_PORT),
            source: RuleSource::classify(address),
            description: Some(format!("{group_name} {address}")),
        })
        .collect()
}
