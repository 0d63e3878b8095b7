use std::collections::HashMap;

use crate::config::FlowLayoutConfig;
use crate::ir::{Task, name_index};

use super::types::{LayoutState, NodePosition};

/// Places layers top to bottom between the Start and End markers.
///
/// Every layer is centered on the arithmetic layout width. The canvas width is
/// that width clamped to `min_canvas_width`; the canvas height is only known
/// once the End marker has been placed below the last layer.
pub(crate) fn pack_layers(
    tasks: &[Task],
    layers: Vec<Vec<usize>>,
    config: &FlowLayoutConfig,
) -> LayoutState {
    let node_w = config.node_width;
    let node_h = config.node_height;
    let gap_x = config.gap_x;
    let gap_y = config.gap_y;
    let marker_w = config.marker_width;
    let marker_h = config.marker_height;

    let widest = layers.iter().map(Vec::len).max().unwrap_or(0).max(1) as f32;
    let layout_width = config.padding_left * 2.0 + widest * node_w + (widest - 1.0) * gap_x;
    let canvas_width = layout_width.max(config.min_canvas_width);

    let start_x = layout_width / 2.0 - marker_w / 2.0;
    let start_y = config.padding_top;

    let mut positions: Vec<Option<NodePosition>> = vec![None; tasks.len()];
    let mut cursor_y = start_y + marker_h + gap_y;
    for (layer_idx, layer) in layers.iter().enumerate() {
        let count = layer.len() as f32;
        let layer_width = count * node_w + (count - 1.0).max(0.0) * gap_x;
        let offset_x = (layout_width - layer_width) / 2.0;
        for (col, &task_idx) in layer.iter().enumerate() {
            let x = offset_x + col as f32 * (node_w + gap_x);
            positions[task_idx] = Some(NodePosition::new(
                task_idx, layer_idx, x, cursor_y, node_w, node_h,
            ));
        }
        cursor_y += node_h + gap_y;
    }

    let end_x = layout_width / 2.0 - marker_w / 2.0;
    let end_y = cursor_y;
    let canvas_height = end_y + marker_h + config.padding_top;

    let positions: Vec<NodePosition> = positions
        .into_iter()
        .enumerate()
        .map(|(idx, pos)| {
            pos.unwrap_or_else(|| NodePosition::new(idx, 0, 0.0, 0.0, node_w, node_h))
        })
        .collect();

    let index: HashMap<String, usize> = name_index(tasks)
        .into_iter()
        .map(|(name, idx)| (name.to_string(), idx))
        .collect();

    let mut state = LayoutState {
        tasks: tasks.to_vec(),
        name_index: index,
        layers,
        positions,
        node_width: node_w,
        node_height: node_h,
        marker_width: marker_w,
        marker_height: marker_h,
        start_center_x: start_x + marker_w / 2.0,
        start_bottom: start_y + marker_h,
        end_center_x: end_x + marker_w / 2.0,
        end_top: end_y,
        layout_width,
        canvas_width,
        canvas_height,
        connectors: Vec::new(),
        surface_width: 0.0,
        surface_height: 0.0,
        raised: None,
        min_surface: config.min_surface,
        surface_margin: config.surface_margin,
    };
    state.redraw();
    state
}
