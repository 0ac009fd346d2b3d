use crate::export::csv_common::export_to_csv;
use crate::graph::Graph;
use std::error::Error;

pub fn render(graph: &Graph) -> Result<String, Box<dyn Error>> {
    export_to_csv(
        &graph.nodes,
        &[
            "region", "id", "resource_id", "kind", "label", "level", "group", "vpc_id",
        ],
        |node| {
            vec![
                node.region.clone(),
                node.id.clone(),
                node.resource_id.clone(),
                node.kind.to_string(),
                node.label.clone(),
                node.level.to_string(),
                node.group.clone().unwrap_or_default(),
                node.vpc_id.clone().unwrap_or_default(),
            ]
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::sample_graph;

    #[test]
    fn csv_nodes_has_one_row_per_node() {
        let out = render(&sample_graph()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[0],
            "region,id,resource_id,kind,label,level,group,vpc_id"
        );
        assert_eq!(
            lines[1],
            r#"eu-west-1,vpc-a-0,vpc-a,VPC,"core ""prod""",0,vpc-a,"#
        );
        assert_eq!(lines[2], "eu-west-1,tgw-1-0,tgw-1,TransitGateway,tgw-1,0,,");
    }
}
