pub mod to_csv_edges;
pub mod to_csv_nodes;
pub mod to_dot;
pub mod to_json;
pub mod to_vis_network;

use crate::graph::Graph;
use crate::plan::{ExportFileType, RenderConfig};
use std::error::Error;

/// Renders `graph` in the format named by `exporter`.
pub fn render(
    graph: &Graph,
    exporter: ExportFileType,
    render_config: &RenderConfig,
) -> Result<String, Box<dyn Error>> {
    match exporter {
        ExportFileType::JSON => to_json::render(graph),
        ExportFileType::VisNetwork => to_vis_network::render(graph),
        ExportFileType::DOT => to_dot::render(graph, render_config),
        ExportFileType::CSVNodes => to_csv_nodes::render(graph),
        ExportFileType::CSVEdges => to_csv_edges::render(graph),
    }
}

/// Shared CSV plumbing for the tabular exporters
pub mod csv_common {
    use csv::Writer;
    use std::error::Error;

    pub fn export_to_csv<T, F>(
        items: impl IntoIterator<Item = T>,
        headers: &[&str],
        row_fn: F,
    ) -> Result<String, Box<dyn Error>>
    where
        F: Fn(T) -> Vec<String>,
    {
        let mut wtr = Writer::from_writer(vec![]);
        wtr.write_record(headers)?;

        for item in items {
            wtr.write_record(&row_fn(item))?;
        }

        let data = wtr.into_inner()?;
        String::from_utf8(data).map_err(Into::into)
    }
}
