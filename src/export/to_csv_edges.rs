use crate::export::csv_common::export_to_csv;
use crate::graph::Graph;
use std::error::Error;

pub fn render(graph: &Graph) -> Result<String, Box<dyn Error>> {
    export_to_csv(
        &graph.edges,
        &[
            "region", "id", "source", "target", "mechanism", "label", "level", "dashed", "via",
        ],
        |edge| {
            vec![
                edge.region.clone(),
                edge.id.clone(),
                edge.source.clone(),
                edge.target.clone(),
                edge.mechanism.to_string(),
                edge.label.clone().unwrap_or_default(),
                edge.level.to_string(),
                edge.dashed.to_string(),
                edge.via.clone().unwrap_or_default(),
            ]
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::fixtures::sample_graph;

    #[test]
    fn csv_edges_has_one_row_per_edge() {
        let out = render(&sample_graph()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "region,id,source,target,mechanism,label,level,dashed,via"
        );
        assert_eq!(
            lines[1],
            "eu-west-1,e0-0,vpc-a-0,tgw-1-0,TransitGateway,,0,false,rtb-1"
        );
        assert_eq!(
            lines[2],
            r#"eu-west-1,e0-1,tgw-1-0,vpc-b-0,TransitGateway,"22, 443",0,false,"#
        );
        assert_eq!(lines[3], "eu-west-1,e0-2,vpc-a-0,vpc-c-0,Rule,sg-1,0,true,");
    }
}
