//! Firewall rule matching: which ports a VPC's security groups open to
//! another VPC's address range.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::cidr;
use crate::inventory::{SecurityGroup, Vpc};

/// Mechanism tag carried by every rule match
pub const RULE_MECHANISM: &str = "Rule";

/// How repeated ports within one ordered pair are reported
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PortPolicy {
    /// One match per distinct `(group, port)`, sorted
    #[default]
    Dedup,
    /// One match per matching rule range, in scan order
    PerRuleSet,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SecurityMatch {
    pub group_id: String,
    pub port: i32,
}

impl SecurityMatch {
    pub fn mechanism(&self) -> &'static str {
        RULE_MECHANISM
    }
}

/// Ingress ports of `source`'s security groups reachable from
/// `destination`'s range.
///
/// Universal ranges are skipped: they say nothing about this particular
/// neighbor. Permissions without a port (or with port 0) are skipped too.
pub fn match_rules(
    source: &Vpc,
    security_groups: &[SecurityGroup],
    destination: &Vpc,
    policy: PortPolicy,
) -> Vec<SecurityMatch> {
    let mut matches = Vec::new();

    for group in security_groups.iter().filter(|g| g.vpc_id == source.id) {
        for permission in &group.ip_permissions {
            let port = match permission.from_port {
                Some(port) if port != 0 => port,
                _ => continue,
            };
            for range in &permission.ip_ranges {
                if cidr::is_universal(&range.cidr_ip) {
                    continue;
                }
                if cidr::overlaps_or_false(&range.cidr_ip, &destination.cidr) {
                    debug!(
                        "{} on {} allows port {} from {}",
                        group.group_id, source.id, port, destination.id
                    );
                    matches.push(SecurityMatch {
                        group_id: group.group_id.clone(),
                        port,
                    });
                }
            }
        }
    }

    match policy {
        PortPolicy::Dedup => matches
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
        PortPolicy::PerRuleSet => matches,
    }
}

fn port_label(port: i32) -> String {
    if port < 0 {
        "all".to_string()
    } else {
        port.to_string()
    }
}

/// Ports of `matches` joined for display.
///
/// `Dedup` lists each port once, ascending. `PerRuleSet` lists one port per
/// match, in the order the matches were found.
pub fn ports_label<'a>(
    matches: impl IntoIterator<Item = &'a SecurityMatch>,
    policy: PortPolicy,
) -> String {
    let ports = matches.into_iter().map(|m| m.port);
    let ports: Vec<i32> = match policy {
        PortPolicy::Dedup => ports.collect::<BTreeSet<_>>().into_iter().collect(),
        PortPolicy::PerRuleSet => ports.collect(),
    };
    ports
        .into_iter()
        .map(port_label)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Group ids of `matches` in first-seen order.
pub fn matched_groups(matches: &[SecurityMatch]) -> Vec<&str> {
    let mut groups: Vec<&str> = Vec::new();
    for m in matches {
        if !groups.contains(&m.group_id.as_str()) {
            groups.push(&m.group_id);
        }
    }
    groups
}
