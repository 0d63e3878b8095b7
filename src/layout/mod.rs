pub mod canvas;
mod connectors;
pub mod drag;
mod error;
mod packing;
mod ranking;
pub(crate) mod types;

pub use canvas::{Canvas, CanvasId, CanvasRegistry, RenderOutcome, Surface};
pub use drag::{DragController, DragState};
pub use error::{LayoutError, Result};
pub use ranking::{group_layers, resolve_depths};
pub use types::*;

use crate::config::FlowLayoutConfig;
use crate::ir::Workflow;

/// Full layered layout of a workflow: depths, packed layers, markers and connectors.
pub fn compute_flow_layout(workflow: &Workflow, config: &FlowLayoutConfig) -> Result<LayoutState> {
    let depths = resolve_depths(&workflow.tasks)?;
    let layers = group_layers(&depths);
    let state = packing::pack_layers(&workflow.tasks, layers, config);
    tracing::debug!(
        tasks = workflow.tasks.len(),
        layers = state.layers.len(),
        connectors = state.connectors.len(),
        "computed flow layout"
    );
    Ok(state)
}
