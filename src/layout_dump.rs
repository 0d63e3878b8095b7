use crate::force::{ForceGraph, GraphStats, ZoomTransform};
use crate::layout::LayoutState;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayoutDump {
    Flow(FlowDump),
    Graph(GraphDump),
}

#[derive(Debug, Serialize)]
pub struct FlowDump {
    pub width: f32,
    pub height: f32,
    pub layout_width: f32,
    pub surface_width: f32,
    pub surface_height: f32,
    pub layers: Vec<Vec<String>>,
    pub nodes: Vec<TaskDump>,
    pub start: [f32; 2],
    pub end: [f32; 2],
    pub connectors: Vec<ConnectorDump>,
}

#[derive(Debug, Serialize)]
pub struct TaskDump {
    pub name: String,
    pub layer: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
pub struct ConnectorDump {
    pub kind: String,
    pub from: String,
    pub to: String,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct GraphDump {
    pub alpha: f32,
    pub transform: ZoomTransform,
    pub stats: GraphStats,
    pub nodes: Vec<GraphNodeDump>,
    pub edges: Vec<GraphEdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct GraphNodeDump {
    pub id: String,
    pub category: String,
    pub radius: f32,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize)]
pub struct GraphEdgeDump {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FlowDump {
    pub fn from_state(state: &LayoutState) -> Self {
        let name = |endpoint: crate::layout::Endpoint| match endpoint {
            crate::layout::Endpoint::Start => "start".to_string(),
            crate::layout::Endpoint::End => "end".to_string(),
            crate::layout::Endpoint::Task(idx) => state
                .tasks
                .get(idx)
                .map(|task| task.name.clone())
                .unwrap_or_default(),
        };

        let layers = state
            .layers
            .iter()
            .map(|layer| layer.iter().map(|&idx| state.tasks[idx].name.clone()).collect())
            .collect();
        let nodes = state
            .positions
            .iter()
            .map(|pos| TaskDump {
                name: state.tasks[pos.task_index].name.clone(),
                layer: pos.layer,
                x: pos.x,
                y: pos.y,
                width: state.node_width,
                height: state.node_height,
            })
            .collect();
        let connectors = state
            .connectors
            .iter()
            .map(|connector| ConnectorDump {
                kind: format!("{:?}", connector.kind).to_lowercase(),
                from: name(connector.from),
                to: name(connector.to),
                path: connector.path_data(),
            })
            .collect();

        let start = state.start_marker_origin();
        let end = state.end_marker_origin();
        FlowDump {
            width: state.canvas_width,
            height: state.canvas_height,
            layout_width: state.layout_width,
            surface_width: state.surface_width,
            surface_height: state.surface_height,
            layers,
            nodes,
            start: [start.x, start.y],
            end: [end.x, end.y],
            connectors,
        }
    }
}

impl GraphDump {
    pub fn from_graph(graph: &ForceGraph) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .enumerate()
            .map(|(idx, node)| {
                let at = graph.position(idx).unwrap_or_default();
                GraphNodeDump {
                    id: node.id.clone(),
                    category: node.category.tag().to_string(),
                    radius: node.radius,
                    x: at.x,
                    y: at.y,
                }
            })
            .collect();
        let edges = graph
            .edges()
            .iter()
            .map(|edge| GraphEdgeDump {
                source: graph.nodes()[edge.source].id.clone(),
                target: graph.nodes()[edge.target].id.clone(),
                kind: edge.kind.tag().to_string(),
            })
            .collect();
        GraphDump {
            alpha: graph.simulation().alpha(),
            transform: graph.zoom().transform(),
            stats: graph.stats(),
            nodes,
            edges,
        }
    }
}

pub fn write_layout_dump(path: &Path, dump: &LayoutDump) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, dump)?;
    Ok(())
}
