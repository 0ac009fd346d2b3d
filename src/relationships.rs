//! Pairwise relationship resolution.
//!
//! For every ordered pair of VPCs in a region the route classifier and the
//! rule matcher are consulted, and the combination decides what is drawn:
//!
//! - routes found: a solid edge chain per route, carrying the permitted ports
//!   (if any) on its last edge;
//! - no route but permitted ports: a dashed chain through each security group,
//!   flagging permission without a network path;
//! - neither: nothing.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::GraphResult;
use crate::graph::{EdgeBuilder, EdgeMechanism, GraphFragment, NodeBuilder, NodeKind};
use crate::inventory::{RegionResources, Vpc};
use crate::routes::{classify_routes, RouteMechanism, RouteRelationship};
use crate::rules::{match_rules, matched_groups, ports_label, PortPolicy};

/// Shape of the edge chain drawn for a route through a gateway
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChainStyle {
    /// `source -> gateway -> other`; the route table is kept as `via`
    #[default]
    Collapsed,
    /// `source -> route table -> gateway -> other`
    Full,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ResolveOptions {
    pub port_policy: PortPolicy,
    pub chain_style: ChainStyle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PairOutcome {
    Routed { routes: usize, ports: Option<String> },
    PermittedUnrouted { groups: usize },
    Unrelated,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub vpcs: usize,
    pub pairs_evaluated: usize,
    pub routed_pairs: usize,
    pub permitted_unrouted_pairs: usize,
}

impl ResolveStats {
    pub fn absorb(&mut self, other: &ResolveStats) {
        self.vpcs += other.vpcs;
        self.pairs_evaluated += other.pairs_evaluated;
        self.routed_pairs += other.routed_pairs;
        self.permitted_unrouted_pairs += other.permitted_unrouted_pairs;
    }
}

#[derive(Clone, Debug)]
pub struct RegionResolution {
    pub fragment: GraphFragment,
    pub stats: ResolveStats,
}

fn vpc_node(vpc: &Vpc, level: usize) -> NodeBuilder {
    NodeBuilder::new(NodeKind::Vpc, &vpc.id, level)
        .label(&vpc.name)
        .vpc_id(&vpc.id)
}

/// Resolves every ordered pair of the region into one fragment.
///
/// The level of a pass is the position of its source VPC in the region's
/// fetch order; the source is added as the pass's central node even when it
/// relates to nothing.
pub fn resolve_region(
    resources: &RegionResources,
    options: &ResolveOptions,
) -> GraphResult<RegionResolution> {
    let mut fragment = GraphFragment::new(&resources.region);
    let mut stats = ResolveStats {
        vpcs: resources.vpcs.len(),
        ..Default::default()
    };

    for (level, source) in resources.vpcs.iter().enumerate() {
        fragment.ensure_node(vpc_node(source, level).group(&source.id));

        for other in &resources.vpcs {
            if other.id == source.id {
                continue;
            }
            stats.pairs_evaluated += 1;

            match resolve_pair(&mut fragment, resources, source, other, level, options)? {
                PairOutcome::Routed { .. } => stats.routed_pairs += 1,
                PairOutcome::PermittedUnrouted { .. } => stats.permitted_unrouted_pairs += 1,
                PairOutcome::Unrelated => {}
            }
        }
    }

    info!(
        "Resolved region {}: {} VPCs, {} pairs, {} routed, {} permitted without route",
        resources.region,
        stats.vpcs,
        stats.pairs_evaluated,
        stats.routed_pairs,
        stats.permitted_unrouted_pairs
    );

    Ok(RegionResolution { fragment, stats })
}

/// Resolves the ordered pair `(source, other)` into `fragment`.
pub fn resolve_pair(
    fragment: &mut GraphFragment,
    resources: &RegionResources,
    source: &Vpc,
    other: &Vpc,
    level: usize,
    options: &ResolveOptions,
) -> GraphResult<PairOutcome> {
    let routes = classify_routes(source, resources.route_tables_for(&source.id), &other.cidr);
    let rules = match_rules(
        source,
        resources.security_groups_for(&source.id),
        other,
        options.port_policy,
    );

    if !routes.is_empty() {
        let ports = if rules.is_empty() {
            None
        } else {
            Some(ports_label(&rules, options.port_policy))
        };
        debug!(
            "{} -> {}: {} route(s), ports {:?}",
            source.id,
            other.id,
            routes.len(),
            ports
        );
        for route in &routes {
            emit_route_chain(
                fragment,
                source,
                other,
                route,
                level,
                ports.clone(),
                options.chain_style,
            )?;
        }
        return Ok(PairOutcome::Routed {
            routes: routes.len(),
            ports,
        });
    }

    if !rules.is_empty() {
        let groups = matched_groups(&rules);
        debug!(
            "{} -> {}: permitted by {:?} without a route",
            source.id, other.id, groups
        );
        let source_id = fragment.ensure_node(vpc_node(source, level));
        let other_id = fragment.ensure_node(vpc_node(other, level));
        for group_id in &groups {
            let label = ports_label(
                rules.iter().filter(|m| m.group_id == *group_id),
                options.port_policy,
            );
            let group_node = fragment.ensure_node(
                NodeBuilder::new(NodeKind::SecurityGroup, group_id, level).vpc_id(&source.id),
            );
            for (from, to) in [(&source_id, &group_node), (&group_node, &other_id)] {
                fragment.add_edge(
                    EdgeBuilder::new(from, to, level, EdgeMechanism::Rule)
                        .label(Some(label.clone()))
                        .dashed(true),
                )?;
            }
        }
        return Ok(PairOutcome::PermittedUnrouted {
            groups: groups.len(),
        });
    }

    Ok(PairOutcome::Unrelated)
}

fn emit_route_chain(
    fragment: &mut GraphFragment,
    source: &Vpc,
    other: &Vpc,
    route: &RouteRelationship,
    level: usize,
    ports: Option<String>,
    chain_style: ChainStyle,
) -> GraphResult<()> {
    let mechanism = EdgeMechanism::Route(route.mechanism);
    let source_id = fragment.ensure_node(vpc_node(source, level));
    let other_id = fragment.ensure_node(vpc_node(other, level));

    let gateway_id = NodeKind::for_gateway(route.mechanism).map(|kind| {
        fragment.ensure_node(NodeBuilder::new(kind, &route.target_id, level))
    });
    let route_table_needed =
        route.mechanism == RouteMechanism::Direct || chain_style == ChainStyle::Full;
    let route_table_id = route_table_needed.then(|| {
        fragment.ensure_node(
            NodeBuilder::new(NodeKind::RouteTable, &route.route_table_id, level)
                .vpc_id(&source.id),
        )
    });

    let mut hops = vec![source_id];
    hops.extend(route_table_id);
    hops.extend(gateway_id);
    hops.push(other_id);

    let last = hops.len() - 2;
    for (idx, pair) in hops.windows(2).enumerate() {
        let mut edge = EdgeBuilder::new(&pair[0], &pair[1], level, mechanism);
        if idx == 0 && !route_table_needed {
            edge = edge.via(&route.route_table_id);
        }
        if idx == last {
            edge = edge.label(ports.clone());
        }
        fragment.add_edge(edge)?;
    }

    Ok(())
}
