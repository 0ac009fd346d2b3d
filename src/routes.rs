//! Route classification: which route tables of a VPC forward traffic towards
//! a destination range, and through what.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::cidr;
use crate::inventory::{RouteRecord, RouteTableRecord, Vpc};

/// Destination (and gateway) value that marks intra-VPC traffic
pub const LOCAL: &str = "local";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteMechanism {
    Direct,
    Peering,
    TransitGateway,
}

impl RouteMechanism {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteMechanism::Direct => "Direct",
            RouteMechanism::Peering => "Peering",
            RouteMechanism::TransitGateway => "TransitGateway",
        }
    }

    pub fn is_gateway(&self) -> bool {
        !matches!(self, RouteMechanism::Direct)
    }
}

impl fmt::Display for RouteMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    pub destination: String,
    pub mechanism: RouteMechanism,
    /// Transit gateway or peering id; for direct routes the gateway id, if any
    pub target_id: String,
    pub gateway_id: Option<String>,
}

fn present(id: &Option<String>) -> Option<&str> {
    id.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl RouteEntry {
    /// Returns `None` for routes without a CIDR destination (prefix lists).
    ///
    /// A transit gateway id takes precedence over a peering id when upstream
    /// data carries both.
    pub fn from_record(record: &RouteRecord) -> Option<Self> {
        let destination = present(&record.destination_cidr_block)?.to_string();
        let gateway_id = present(&record.gateway_id).map(str::to_string);

        let (mechanism, target_id) = if let Some(tgw) = present(&record.transit_gateway_id) {
            (RouteMechanism::TransitGateway, tgw.to_string())
        } else if let Some(pcx) = present(&record.vpc_peering_connection_id) {
            (RouteMechanism::Peering, pcx.to_string())
        } else {
            (RouteMechanism::Direct, gateway_id.clone().unwrap_or_default())
        };

        Some(Self {
            destination,
            mechanism,
            target_id,
            gateway_id,
        })
    }

    pub fn is_local(&self) -> bool {
        self.destination == LOCAL || self.gateway_id.as_deref() == Some(LOCAL)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RouteTable {
    pub id: String,
    pub vpc_id: String,
    pub entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn from_record(record: &RouteTableRecord) -> Self {
        Self {
            id: record.route_table_id.clone(),
            vpc_id: record.vpc_id.clone(),
            entries: record
                .routes
                .iter()
                .filter_map(RouteEntry::from_record)
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RouteRelationship {
    pub route_table_id: String,
    pub mechanism: RouteMechanism,
    pub target_id: String,
}

/// Every route of `source` that forwards traffic into `destination_cidr`.
///
/// One relationship per qualifying entry, in table then entry order; nothing
/// is deduplicated.
pub fn classify_routes(
    source: &Vpc,
    route_tables: &[RouteTable],
    destination_cidr: &str,
) -> Vec<RouteRelationship> {
    let mut relationships = Vec::new();

    for table in route_tables.iter().filter(|t| t.vpc_id == source.id) {
        for entry in &table.entries {
            if entry.is_local() {
                continue;
            }
            if !cidr::overlaps_or_false(&entry.destination, destination_cidr) {
                continue;
            }
            debug!(
                "Route {} in {} of {} reaches {} ({})",
                entry.destination, table.id, source.id, destination_cidr, entry.mechanism
            );
            relationships.push(RouteRelationship {
                route_table_id: table.id.clone(),
                mechanism: entry.mechanism,
                target_id: entry.target_id.clone(),
            });
        }
    }

    relationships
}
