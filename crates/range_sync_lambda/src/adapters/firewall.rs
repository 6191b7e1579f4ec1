use aws_sdk_ec2::types::{Filter, IpPermission, IpRange, Ipv6Range, SecurityGroup};

use crate::runtime::rules::{IngressRule, RuleSource, SecurityGroupState};

/// Firewall-management collaborator. Every method accepts the invocation's
/// dry-run flag and passes it through to the underlying call unchanged.
pub trait FirewallApi {
    fn describe_groups(
        &self,
        group_name: &str,
        dry_run: bool,
    ) -> Result<Vec<SecurityGroupState>, String>;

    fn create_group(
        &self,
        group_name: &str,
        description: &str,
        dry_run: bool,
    ) -> Result<String, String>;

    fn revoke_ingress(
        &self,
        group_id: &str,
        rules: &[IngressRule],
        dry_run: bool,
    ) -> Result<(), String>;

    fn authorize_ingress(
        &self,
        group_id: &str,
        rules: &[IngressRule],
        dry_run: bool,
    ) -> Result<(), String>;
}

/// EC2-backed firewall adapter.
#[derive(Debug, Clone)]
pub struct Ec2FirewallApi {
    ec2_client: aws_sdk_ec2::Client,
}

impl Ec2FirewallApi {
    pub fn new(ec2_client: aws_sdk_ec2::Client) -> Self {
        Self { ec2_client }
    }
}

impl FirewallApi for Ec2FirewallApi {
    fn describe_groups(
        &self,
        group_name: &str,
        dry_run: bool,
    ) -> Result<Vec<SecurityGroupState>, String> {
        let client = self.ec2_client.clone();
        let name = group_name.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let filter = Filter::builder().name("group-name").values(name).build();
                let output = client
                    .describe_security_groups()
                    .filters(filter)
                    .dry_run(dry_run)
                    .send()
                    .await
                    .map_err(|error| format!("failed to describe security groups: {error}"))?;

                Ok(output
                    .security_groups()
                    .iter()
                    .filter_map(group_state)
                    .collect())
            })
        })
    }

    fn create_group(
        &self,
        group_name: &str,
        description: &str,
        dry_run: bool,
    ) -> Result<String, String> {
        let client = self.ec2_client.clone();
        let name = group_name.to_string();
        let group_description = description.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .create_security_group()
                    .group_name(name)
                    .description(group_description)
                    .dry_run(dry_run)
                    .send()
                    .await
                    .map_err(|error| format!("failed to create security group: {error}"))?;

                output
                    .group_id()
                    .map(str::to_string)
                    .ok_or_else(|| "security group created but no id returned".to_string())
            })
        })
    }

    fn revoke_ingress(
        &self,
        group_id: &str,
        rules: &[IngressRule],
        dry_run: bool,
    ) -> Result<(), String> {
        let client = self.ec2_client.clone();
        let target_group_id = group_id.to_string();
        let permissions: Vec<IpPermission> = rules.iter().map(permission_from_rule).collect();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .revoke_security_group_ingress()
                    .group_id(target_group_id)
                    .set_ip_permissions(Some(permissions))
                    .dry_run(dry_run)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to revoke security group ingress: {error}"))
            })
        })
    }

    fn authorize_ingress(
        &self,
        group_id: &str,
        rules: &[IngressRule],
        dry_run: bool,
    ) -> Result<(), String> {
        let client = self.ec2_client.clone();
        let target_group_id = group_id.to_string();
        let permissions: Vec<IpPermission> = rules.iter().map(permission_from_rule).collect();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .authorize_security_group_ingress()
                    .group_id(target_group_id)
                    .set_ip_permissions(Some(permissions))
                    .dry_run(dry_run)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        format!("failed to authorize security group ingress: {error}")
                    })
            })
        })
    }
}

/// Groups without a provider-assigned id are dropped.
fn group_state(group: &SecurityGroup) -> Option<SecurityGroupState> {
    let group_id = group.group_id()?.to_string();
    let ingress_rules = group
        .ip_permissions()
        .iter()
        .flat_map(rules_from_permission)
        .collect();

    Some(SecurityGroupState {
        group_id,
        ingress_rules,
    })
}

/// Flattens an EC2 permission into one rule per source range, preserving
/// exactly what was read so a later revoke can carry it back.
pub fn rules_from_permission(permission: &IpPermission) -> Vec<IngressRule> {
    let protocol = permission.ip_protocol().unwrap_or("-1").to_string();
    let from_port = permission.from_port();
    let to_port = permission.to_port();

    let mut rules = Vec::new();
    for range in permission.ip_ranges() {
        if let Some(cidr) = range.cidr_ip() {
            rules.push(IngressRule {
                protocol: protocol.clone(),
                from_port,
                to_port,
                source: RuleSource::Ipv4(cidr.to_string()),
                description: range.description().map(str::to_string),
            });
        }
    }
    for range in permission.ipv6_ranges() {
        if let Some(cidr) = range.cidr_ipv6() {
            rules.push(IngressRule {
                protocol: protocol.clone(),
                from_port,
                to_port,
                source: RuleSource::Ipv6(cidr.to_string()),
                description: range.description().map(str::to_string),
            });
        }
    }

    rules
}

/// An IPv4 source lands in `IpRanges` (`CidrIp`), an IPv6 source in
/// `Ipv6Ranges` (`CidrIpv6`).
pub fn permission_from_rule(rule: &IngressRule) -> IpPermission {
    let mut builder = IpPermission::builder().ip_protocol(&rule.protocol);
    if let Some(port) = rule.from_port {
        builder = builder.from_port(port);
    }
    if let Some(port) = rule.to_port {
        builder = builder.to_port(port);
    }

    match &rule.source {
        RuleSource::Ipv4(cidr) => {
            let mut range = IpRange::builder().cidr_ip(cidr);
            if let Some(description) = &rule.description {
                range = range.description(description);
            }
            builder = builder.ip_ranges(range.build());
        }
        RuleSource::Ipv6(cidr) => {
            let mut range = Ipv6Range::builder().cidr_ipv6(cidr);
            if let Some(description) = &rule.description {
                range = range.description(description);
            }
            builder = builder.ipv6_ranges(range.build());
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use crate::runtime::rules::build_ingress_rules;

    use super::*;

    #[test]
    fn ipv4_rule_lands_in_ip_ranges() {
        let rules = build_ingress_rules("atlassian_id", &["203.0.113.0/24".to_string()]);
        let permission = permission_from_rule(&rules[0]);

        assert_eq!(permission.ip_protocol(), Some("tcp"));
        assert_eq!(permission.from_port(), Some(0));
        assert_eq!(permission.to_port(), Some(65535));
        assert_eq!(permission.ip_ranges().len(), 1);
        assert!(permission.ipv6_ranges().is_empty());
        assert_eq!(permission.ip_ranges()[0].cidr_ip(), Some("203.0.113.0/24"));
        assert_eq!(
            permission.ip_ranges()[0].description(),
            Some("atlassian_id 203.0.113.0/24")
        );
    }

    #[test]
    fn ipv6_rule_lands_in_ipv6_ranges() {
        let rules = build_ingress_rules("atlassian_id", &["2001:db8::/32".to_string()]);
        let permission = permission_from_rule(&rules[0]);

        assert!(permission.ip_ranges().is_empty());
        assert_eq!(permission.ipv6_ranges().len(), 1);
        assert_eq!(
            permission.ipv6_ranges()[0].cidr_ipv6(),
            Some("2001:db8::/32")
        );
        assert_eq!(
            permission.ipv6_ranges()[0].description(),
            Some("atlassian_id 2001:db8::/32")
        );
    }

    #[test]
    fn permission_round_trips_at_rule_granularity() {
        let rules = build_ingress_rules(
            "atlassian_id",
            &["203.0.113.0/24".to_string(), "2001:db8::/32".to_string()],
        );

        for rule in &rules {
            let read_back = rules_from_permission(&permission_from_rule(rule));
            assert_eq!(read_back, vec![rule.clone()]);
        }
    }

    #[test]
    fn multi_range_permission_flattens_to_one_rule_per_range() {
        let permission = IpPermission::builder()
            .ip_protocol("tcp")
            .from_port(0)
            .to_port(65535)
            .ip_ranges(IpRange::builder().cidr_ip("203.0.113.0/24").build())
            .ip_ranges(IpRange::builder().cidr_ip("198.51.100.0/22").build())
            .ipv6_ranges(Ipv6Range::builder().cidr_ipv6("2001:db8::/32").build())
            .build();

        let rules = rules_from_permission(&permission);

        assert_eq!(rules.len(), 3);
        assert_eq!(
            rules[0].source,
            RuleSource::Ipv4("203.0.113.0/24".to_string())
        );
        assert_eq!(
            rules[1].source,
            RuleSource::Ipv4("198.51.100.0/22".to_string())
        );
        assert_eq!(
            rules[2].source,
            RuleSource::Ipv6("2001:db8::/32".to_string())
        );
        assert_eq!(rules[0].description, None);
    }

    #[test]
    fn portless_permission_keeps_ports_absent() {
        let permission = IpPermission::builder()
            .ip_protocol("-1")
            .ip_ranges(IpRange::builder().cidr_ip("0.0.0.0/0").build())
            .build();

        let rules = rules_from_permission(&permission);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].protocol, "-1");
        assert_eq!(rules[0].from_port, None);
        assert_eq!(rules[0].to_port, None);

        let rebuilt = permission_from_rule(&rules[0]);
        assert_eq!(rebuilt.from_port(), None);
        assert_eq!(rebuilt.to_port(), None);
    }
}
