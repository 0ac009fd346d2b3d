//! Dataset for the vis-network viewer: `{ nodes, edges, options }`.
//!
//! Node and edge ids are region-qualified so regions that reuse VPC ids
//! stay apart in a single canvas.

use crate::graph::{Edge, Graph, Node, NodeKind};
use serde_json::{json, Value};
use std::error::Error;

pub fn render(graph: &Graph) -> Result<String, Box<dyn Error>> {
    let res = json!({
        "name": graph.name,
        "nodes": graph.nodes.iter().map(vis_node).collect::<Vec<_>>(),
        "edges": graph.edges.iter().map(vis_edge).collect::<Vec<_>>(),
        "options": options(),
    });
    Ok(serde_json::to_string_pretty(&res)?)
}

fn vis_node(node: &Node) -> Value {
    let mut value = json!({
        "id": node.qualified_id(),
        "label": node.label,
        "title": format!("{} {} ({})", node.kind, node.resource_id, node.region),
        "shape": "circularImage",
        "image": node.icon,
        "size": node.size,
        "level": node.level,
        "region": node.region,
    });
    if let Some(group) = &node.group {
        value["group"] = json!(group);
    }
    if node.kind == NodeKind::RouteTable {
        value["scaling"] = json!({ "min": 15, "max": 15 });
    }
    value
}

fn vis_edge(edge: &Edge) -> Value {
    let mut value = json!({
        "id": format!("{}/{}", edge.region, edge.id),
        "from": edge.qualified_source(),
        "to": edge.qualified_target(),
        "level": edge.level,
        "dashes": edge.dashed,
        "mechanism": edge.mechanism.as_str(),
    });

    match &edge.label {
        Some(ports) => {
            value["title"] = json!(ports);
            value["width"] = json!(2);
            value["arrows"] = json!({
                "to": { "enabled": edge.directed, "scaleFactor": 1, "type": "arrow" },
                "from": { "enabled": edge.directed, "scaleFactor": 1, "type": "arrow" },
                "middle": {
                    "enabled": true,
                    "imageHeight": 30,
                    "imageWidth": 30,
                    "scaleFactor": 1,
                    "src": NodeKind::SecurityGroup.default_icon(),
                    "type": "image",
                },
            });
        }
        None => {
            value["arrows"] = json!({
                "to": { "enabled": edge.directed, "scaleFactor": 1, "type": "arrow" },
            });
        }
    }
    if let Some(via) = &edge.via {
        value["via"] = json!(via);
    }
    value
}

pub fn options() -> Value {
    json!({
        "configure": {
            "enabled": true,
            "filter": "physics, edges",
            "showButton": true,
        },
        "edges": { "smooth": false },
        "physics": {
            "hierarchicalRepulsion": {
                "springLength": 235,
                "springConstant": 0.1,
                "nodeDistance": 100,
                "damping": 0.3,
                "avoidOverlap": 1,
            },
            "minVelocity": 0.75,
            "solver": "hierarchicalRepulsion",
        },
    })
}
