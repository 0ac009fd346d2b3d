//! Inventory records as delivered by the resource fetcher.
//!
//! Field names follow the EC2 `describe-*` responses so snapshots can be
//! captured straight from the cloud CLI.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::warn;

use crate::routes::RouteTable;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct VpcRecord {
    pub vpc_id: String,
    pub cidr_block: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct RouteRecord {
    #[serde(default)]
    pub destination_cidr_block: Option<String>,
    #[serde(default)]
    pub gateway_id: Option<String>,
    #[serde(default)]
    pub transit_gateway_id: Option<String>,
    #[serde(default)]
    pub vpc_peering_connection_id: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct RouteTableRecord {
    pub route_table_id: String,
    pub vpc_id: String,
    #[serde(default)]
    pub routes: Vec<RouteRecord>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct IpRange {
    pub cidr_ip: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct IpPermission {
    #[serde(default)]
    pub ip_protocol: Option<String>,
    #[serde(default)]
    pub from_port: Option<i32>,
    #[serde(default)]
    pub to_port: Option<i32>,
    #[serde(default)]
    pub ip_ranges: Vec<IpRange>,
}

/// A security group with its ingress permissions.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct SecurityGroup {
    pub group_id: String,
    #[serde(default)]
    pub group_name: Option<String>,
    pub vpc_id: String,
    #[serde(default)]
    pub ip_permissions: Vec<IpPermission>,
}

/// Everything the fetcher returns for one region.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct RegionInventory {
    #[serde(default)]
    pub vpcs: Vec<VpcRecord>,
    #[serde(default)]
    pub route_tables: Vec<RouteTableRecord>,
    #[serde(default)]
    pub security_groups: Vec<SecurityGroup>,
}

/// A frozen, multi-region inventory. Region order is the default run order.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct InventorySnapshot {
    #[serde(default)]
    pub regions: IndexMap<String, RegionInventory>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Vpc {
    pub id: String,
    pub cidr: String,
    pub name: String,
    pub region: String,
}

impl Vpc {
    pub fn from_record(record: &VpcRecord, region: &str) -> Self {
        let name = record
            .tags
            .iter()
            .find(|t| t.key == "Name" && !t.value.is_empty())
            .map(|t| t.value.clone())
            .unwrap_or_else(|| record.vpc_id.clone());

        Self {
            id: record.vpc_id.clone(),
            cidr: record.cidr_block.clone(),
            name,
            region: region.to_string(),
        }
    }
}

/// One region's inventory, converted and indexed by owning VPC.
#[derive(Clone, Debug, Default)]
pub struct RegionResources {
    pub region: String,
    pub vpcs: Vec<Vpc>,
    route_tables: HashMap<String, Vec<RouteTable>>,
    security_groups: HashMap<String, Vec<SecurityGroup>>,
}

impl RegionResources {
    pub fn from_inventory(region: &str, inventory: &RegionInventory) -> Self {
        let mut seen = HashSet::new();
        let vpcs = inventory
            .vpcs
            .iter()
            .filter(|record| {
                let first = seen.insert(record.vpc_id.as_str());
                if !first {
                    warn!("Ignoring repeated VPC {} in {}", record.vpc_id, region);
                }
                first
            })
            .map(|record| Vpc::from_record(record, region))
            .collect();

        let mut route_tables: HashMap<String, Vec<RouteTable>> = HashMap::new();
        for record in &inventory.route_tables {
            route_tables
                .entry(record.vpc_id.clone())
                .or_default()
                .push(RouteTable::from_record(record));
        }

        let mut security_groups: HashMap<String, Vec<SecurityGroup>> = HashMap::new();
        for group in &inventory.security_groups {
            security_groups
                .entry(group.vpc_id.clone())
                .or_default()
                .push(group.clone());
        }

        Self {
            region: region.to_string(),
            vpcs,
            route_tables,
            security_groups,
        }
    }

    pub fn route_tables_for(&self, vpc_id: &str) -> &[RouteTable] {
        self.route_tables
            .get(vpc_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn security_groups_for(&self, vpc_id: &str) -> &[SecurityGroup] {
        self.security_groups
            .get(vpc_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
