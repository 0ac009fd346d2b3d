use crate::graph::{Graph, NodeKind};
use crate::plan::RenderConfig;
use serde_json::json;
use std::error::Error;

pub fn render(graph: &Graph, render_config: &RenderConfig) -> Result<String, Box<dyn Error>> {
    let handlebars = crate::common::get_handlebars();

    let regions: Vec<_> = graph
        .regions
        .iter()
        .map(|region| {
            let nodes: Vec<_> = graph
                .nodes_in_region(region)
                .map(|node| {
                    json!({
                        "key": node.qualified_id(),
                        "label": node.label,
                        "kind": node.kind.as_str(),
                        "color": fill_color(node.kind),
                    })
                })
                .collect();
            json!({ "name": region, "nodes": nodes })
        })
        .collect();

    let edges: Vec<_> = graph
        .edges
        .iter()
        .map(|edge| {
            json!({
                "source": edge.qualified_source(),
                "target": edge.qualified_target(),
                "label": edge.label,
                "dashed": edge.dashed,
                "directed": edge.directed,
            })
        })
        .collect();

    let res = handlebars.render_template(
        &get_template(),
        &json!({
            "name": graph.name,
            "config": { "orientation": render_config.orientation.as_str() },
            "regions": regions,
            "edges": edges,
        }),
    )?;
    Ok(res)
}

fn fill_color(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Vpc => "#dbeafe",
        NodeKind::RouteTable => "#fef3c7",
        NodeKind::TransitGateway => "#dcfce7",
        NodeKind::PeeringConnection => "#ede9fe",
        NodeKind::SecurityGroup => "#fee2e2",
    }
}

pub fn get_template() -> String {
    include_str!("to_dot.hbs").to_string()
}
