use crate::graph::Graph;
use std::error::Error;

pub fn render(graph: &Graph) -> Result<String, Box<dyn Error>> {
    use serde_json::json;

    let res = json!({
        "name": graph.name,
        "regions": graph.regions,
        "nodes": graph.nodes,
        "edges": graph.edges,
        "stats": {
            "regions": graph.regions.len(),
            "nodes": graph.nodes.len(),
            "edges": graph.edges.len(),
        },
    });
    Ok(serde_json::to_string_pretty(&res)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::sample_graph;
    use serde_json::Value;

    #[test]
    fn json_export_carries_whole_graph() {
        let out = render(&sample_graph()).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["name"], "sample");
        assert_eq!(value["regions"][0], "eu-west-1");
        assert_eq!(value["stats"]["nodes"], 4);
        assert_eq!(value["stats"]["edges"], 3);
        assert_eq!(value["nodes"][0]["id"], "vpc-a-0");
        assert_eq!(value["nodes"][0]["kind"], "VPC");
        assert_eq!(value["edges"][0]["via"], "rtb-1");
        assert_eq!(value["edges"][2]["dashed"], true);
    }

    #[test]
    fn json_export_reads_back_into_graph() {
        let graph = sample_graph();
        let value: Value = serde_json::from_str(&render(&graph).unwrap()).unwrap();
        let nodes: Vec<crate::graph::Node> =
            serde_json::from_value(value["nodes"].clone()).unwrap();
        assert_eq!(nodes, graph.nodes);
    }
}
