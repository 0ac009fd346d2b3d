use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

use crate::errors::{GraphError, GraphResult};
use crate::routes::RouteMechanism;

const VPC_ICON: &str = "https://static-00.iconduck.com/assets.00/networkingcontentdelivery-amazonvpc-internetgateway-icon-491x512-g9bp4hsr.png";
const ROUTE_TABLE_ICON: &str =
    "https://symbols.getvecta.com/stencil_20/8_customer-gateway.5f8e151d08.jpg";
const TRANSIT_GATEWAY_ICON: &str = "https://global-uploads.webflow.com/5f05d5858fab461d0d08eaeb/635a593ae410e66d0c8b8b00_transit_gateway_light.svg";
const PEERING_ICON: &str = "https://symbols.getvecta.com/stencil_9/28_vpc-peering.735192d824.svg";
const SECURITY_GROUP_ICON: &str = "https://www.cloudoptics.io/wp-content/uploads/2015/03/aws_sg.png";

/// Node id of a resource within the pass at `level`
pub fn node_id(resource_id: &str, level: usize) -> String {
    format!("{}-{}", resource_id, level)
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    #[serde(rename = "VPC")]
    Vpc,
    RouteTable,
    TransitGateway,
    PeeringConnection,
    SecurityGroup,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Vpc => "VPC",
            NodeKind::RouteTable => "RouteTable",
            NodeKind::TransitGateway => "TransitGateway",
            NodeKind::PeeringConnection => "PeeringConnection",
            NodeKind::SecurityGroup => "SecurityGroup",
        }
    }

    pub fn default_icon(&self) -> &'static str {
        match self {
            NodeKind::Vpc => VPC_ICON,
            NodeKind::RouteTable => ROUTE_TABLE_ICON,
            NodeKind::TransitGateway => TRANSIT_GATEWAY_ICON,
            NodeKind::PeeringConnection => PEERING_ICON,
            NodeKind::SecurityGroup => SECURITY_GROUP_ICON,
        }
    }

    pub fn default_size(&self) -> u32 {
        match self {
            NodeKind::Vpc => 25,
            NodeKind::PeeringConnection => 20,
            NodeKind::RouteTable | NodeKind::TransitGateway | NodeKind::SecurityGroup => 15,
        }
    }

    /// Node kind standing for the hop of a gateway route
    pub fn for_gateway(mechanism: RouteMechanism) -> Option<Self> {
        match mechanism {
            RouteMechanism::Direct => None,
            RouteMechanism::Peering => Some(NodeKind::PeeringConnection),
            RouteMechanism::TransitGateway => Some(NodeKind::TransitGateway),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeMechanism {
    Route(RouteMechanism),
    Rule,
}

impl EdgeMechanism {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeMechanism::Route(mechanism) => mechanism.as_str(),
            EdgeMechanism::Rule => crate::rules::RULE_MECHANISM,
        }
    }
}

impl fmt::Display for EdgeMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Node {
    pub id: String,
    pub resource_id: String,
    pub kind: NodeKind,
    pub label: String,
    pub region: String,
    pub level: usize,
    pub icon: String,
    pub size: u32,
    pub group: Option<String>,
    pub vpc_id: Option<String>,
}

impl Node {
    /// Id that stays unique after regions are merged
    pub fn qualified_id(&self) -> String {
        format!("{}/{}", self.region, self.id)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub region: String,
    pub level: usize,
    pub label: Option<String>,
    pub mechanism: EdgeMechanism,
    pub directed: bool,
    /// Traffic is permitted but no route carries it
    pub dashed: bool,
    /// Route table behind a collapsed gateway hop
    pub via: Option<String>,
}

impl Edge {
    pub fn qualified_source(&self) -> String {
        format!("{}/{}", self.region, self.source)
    }

    pub fn qualified_target(&self) -> String {
        format!("{}/{}", self.region, self.target)
    }
}

/// Named, optional display fields for a node.
#[derive(Clone, Debug)]
pub struct NodeBuilder {
    kind: NodeKind,
    resource_id: String,
    level: usize,
    label: Option<String>,
    icon: Option<String>,
    size: Option<u32>,
    group: Option<String>,
    vpc_id: Option<String>,
}

impl NodeBuilder {
    pub fn new(kind: NodeKind, resource_id: &str, level: usize) -> Self {
        Self {
            kind,
            resource_id: resource_id.to_string(),
            level,
            label: None,
            icon: None,
            size: None,
            group: None,
            vpc_id: None,
        }
    }

    pub fn id(&self) -> String {
        node_id(&self.resource_id, self.level)
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn vpc_id(mut self, vpc_id: impl Into<String>) -> Self {
        self.vpc_id = Some(vpc_id.into());
        self
    }

    pub fn build(self, region: &str) -> Node {
        Node {
            id: node_id(&self.resource_id, self.level),
            label: self.label.unwrap_or_else(|| self.resource_id.clone()),
            icon: self
                .icon
                .unwrap_or_else(|| self.kind.default_icon().to_string()),
            size: self.size.unwrap_or_else(|| self.kind.default_size()),
            resource_id: self.resource_id,
            kind: self.kind,
            region: region.to_string(),
            level: self.level,
            group: self.group,
            vpc_id: self.vpc_id,
        }
    }
}

/// Named, optional display fields for an edge between two node ids.
#[derive(Clone, Debug)]
pub struct EdgeBuilder {
    source: String,
    target: String,
    level: usize,
    mechanism: EdgeMechanism,
    label: Option<String>,
    directed: bool,
    dashed: bool,
    via: Option<String>,
}

impl EdgeBuilder {
    pub fn new(source: &str, target: &str, level: usize, mechanism: EdgeMechanism) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            level,
            mechanism,
            label: None,
            directed: true,
            dashed: false,
            via: None,
        }
    }

    pub fn label(mut self, label: Option<String>) -> Self {
        self.label = label.filter(|l| !l.is_empty());
        self
    }

    pub fn directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    pub fn dashed(mut self, dashed: bool) -> Self {
        self.dashed = dashed;
        self
    }

    pub fn via(mut self, route_table_id: impl Into<String>) -> Self {
        self.via = Some(route_table_id.into());
        self
    }
}

/// Nodes and edges of a single region, built by one resolution pass.
///
/// Nodes are keyed by id so a resource seen from several pairs in the same
/// pass maps to one node. Edges are only accepted once both endpoints exist.
#[derive(Clone, Debug, Default)]
pub struct GraphFragment {
    pub region: String,
    nodes: IndexMap<String, Node>,
    edges: Vec<Edge>,
}

impl GraphFragment {
    pub fn new(region: &str) -> Self {
        Self {
            region: region.to_string(),
            nodes: IndexMap::new(),
            edges: Vec::new(),
        }
    }

    /// Creates the node if it does not exist yet and returns its id.
    ///
    /// An existing node keeps its attributes, but picks up a group if it had
    /// none.
    pub fn ensure_node(&mut self, builder: NodeBuilder) -> String {
        let id = builder.id();
        match self.nodes.get_mut(&id) {
            Some(existing) => {
                if existing.group.is_none() && builder.group.is_some() {
                    existing.group = builder.group;
                }
            }
            None => {
                let node = builder.build(&self.region);
                debug!("Adding {} node {} in {}", node.kind, node.id, self.region);
                self.nodes.insert(id.clone(), node);
            }
        }
        id
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn add_edge(&mut self, builder: EdgeBuilder) -> GraphResult<()> {
        let id = format!("e{}-{}", builder.level, self.edges.len());
        for endpoint in [&builder.source, &builder.target] {
            if !self.nodes.contains_key(endpoint) {
                return Err(GraphError::Consistency {
                    edge: id,
                    node: endpoint.clone(),
                });
            }
        }

        self.edges.push(Edge {
            id,
            source: builder.source,
            target: builder.target,
            region: self.region.clone(),
            level: builder.level,
            label: builder.label,
            mechanism: builder.mechanism,
            directed: builder.directed,
            dashed: builder.dashed,
            via: builder.via,
        });
        Ok(())
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Node>, Vec<Edge>) {
        (self.nodes.into_values().collect(), self.edges)
    }
}

/// The accumulated graph of a run.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Graph {
    pub name: String,
    pub regions: Vec<String>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Appends a region's fragment. Each region may be merged once.
    pub fn merge(&mut self, fragment: GraphFragment) -> GraphResult<()> {
        if self.regions.contains(&fragment.region) {
            return Err(GraphError::RegionMergedTwice(fragment.region));
        }
        debug!(
            "Merging region {} ({} nodes, {} edges)",
            fragment.region,
            fragment.node_count(),
            fragment.edge_count()
        );
        self.regions.push(fragment.region.clone());
        let (nodes, edges) = fragment.into_parts();
        self.nodes.extend(nodes);
        self.edges.extend(edges);
        Ok(())
    }

    pub fn get_node(&self, region: &str, id: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|n| n.region == region && n.id == id)
    }

    pub fn nodes_in_region<'a>(&'a self, region: &'a str) -> impl Iterator<Item = &'a Node> {
        self.nodes.iter().filter(move |n| n.region == region)
    }

    pub fn edges_in_region<'a>(&'a self, region: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.region == region)
    }

    /// Stable sort by position of the region in `order`; unknown regions last.
    pub fn sort_by_regions(&mut self, order: &[String]) {
        let rank: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(idx, region)| (region.as_str(), idx))
            .collect();
        let rank_of = |region: &str| rank.get(region).copied().unwrap_or(usize::MAX);

        self.regions.sort_by_key(|r| rank_of(r.as_str()));
        self.nodes.sort_by_key(|n| rank_of(n.region.as_str()));
        self.edges.sort_by_key(|e| rank_of(e.region.as_str()));
    }

    pub fn stats(&self) -> String {
        format!(
            "Regions: {}, Nodes: {}, Edges: {}",
            self.regions.len(),
            self.nodes.len(),
            self.edges.len()
        )
    }

    pub fn verify_graph_integrity(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let mut keys: HashSet<(&str, &str)> = HashSet::new();

        for node in &self.nodes {
            if !keys.insert((node.region.as_str(), node.id.as_str())) {
                errors.push(
                    GraphError::DuplicateNode {
                        region: node.region.clone(),
                        id: node.id.clone(),
                    }
                    .to_string(),
                );
            }
        }

        for edge in &self.edges {
            for endpoint in [&edge.source, &edge.target] {
                if !keys.contains(&(edge.region.as_str(), endpoint.as_str())) {
                    errors.push(
                        GraphError::Consistency {
                            edge: edge.id.clone(),
                            node: format!("{}/{}", edge.region, endpoint),
                        }
                        .to_string(),
                    );
                }
            }
        }

        if errors.is_empty() {
            debug!("All edges have valid source and target nodes");
            Ok(())
        } else {
            warn!("Graph integrity check found {} problems", errors.len());
            Err(errors)
        }
    }
}
