use std::collections::HashMap;
use std::fmt;

use crate::config::FlowLayoutConfig;
use crate::ir::Workflow;

use super::compute_flow_layout;
use super::drag::DragController;
use super::error::LayoutError;
use super::types::{DragTarget, LayoutState, Point};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanvasId(String);

impl CanvasId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CanvasId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for CanvasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
pub enum Surface {
    Placeholder { message: String },
    Flow(LayoutState),
}

#[derive(Debug, Clone)]
pub struct Canvas {
    pub surface: Surface,
    pub drag: DragController,
}

impl Canvas {
    pub fn layout(&self) -> Option<&LayoutState> {
        match &self.surface {
            Surface::Flow(state) => Some(state),
            Surface::Placeholder { .. } => None,
        }
    }

    pub fn layout_mut(&mut self) -> Option<&mut LayoutState> {
        match &mut self.surface {
            Surface::Flow(state) => Some(state),
            Surface::Placeholder { .. } => None,
        }
    }

    pub fn pointer_down(&mut self, target: DragTarget, pointer: Point) -> bool {
        let Surface::Flow(state) = &mut self.surface else {
            return false;
        };
        self.drag.pointer_down(state, target, pointer)
    }

    pub fn pointer_move(&mut self, pointer: Point) -> Option<Point> {
        let Surface::Flow(state) = &mut self.surface else {
            return None;
        };
        self.drag.pointer_move(state, pointer)
    }

    pub fn pointer_up(&mut self) -> Option<DragTarget> {
        let layout = match &mut self.surface {
            Surface::Flow(state) => Some(state),
            Surface::Placeholder { .. } => None,
        };
        self.drag.pointer_up(layout)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Rendered { layers: usize, connectors: usize },
    Placeholder,
    /// The workflow could not be laid out; the previous surface is kept.
    Rejected(LayoutError),
}

/// Owns one layout state per canvas; a render replaces whatever was there.
#[derive(Debug, Default)]
pub struct CanvasRegistry {
    config: FlowLayoutConfig,
    canvases: HashMap<CanvasId, Canvas>,
}

impl CanvasRegistry {
    pub fn new(config: FlowLayoutConfig) -> Self {
        Self {
            config,
            canvases: HashMap::new(),
        }
    }

    pub fn config(&self) -> &FlowLayoutConfig {
        &self.config
    }

    pub fn render(&mut self, id: impl Into<CanvasId>, workflow: &Workflow) -> RenderOutcome {
        let id = id.into();
        if workflow.tasks.is_empty() {
            self.canvases.insert(
                id,
                Canvas {
                    surface: Surface::Placeholder {
                        message: self.config.placeholder_text.clone(),
                    },
                    drag: DragController::new(),
                },
            );
            return RenderOutcome::Placeholder;
        }

        match compute_flow_layout(workflow, &self.config) {
            Ok(state) => {
                let outcome = RenderOutcome::Rendered {
                    layers: state.layers.len(),
                    connectors: state.connectors.len(),
                };
                tracing::debug!(
                    canvas = %id,
                    workflow = %workflow.name,
                    ?outcome,
                    "rendered workflow"
                );
                self.canvases.insert(
                    id,
                    Canvas {
                        surface: Surface::Flow(state),
                        drag: DragController::new(),
                    },
                );
                outcome
            }
            Err(err) => {
                tracing::warn!(
                    canvas = %id,
                    workflow = %workflow.name,
                    error = %err,
                    "workflow layout rejected"
                );
                RenderOutcome::Rejected(err)
            }
        }
    }

    pub fn get(&self, id: &CanvasId) -> Option<&Canvas> {
        self.canvases.get(id)
    }

    pub fn get_mut(&mut self, id: &CanvasId) -> Option<&mut Canvas> {
        self.canvases.get_mut(id)
    }

    pub fn layout(&self, id: &CanvasId) -> Option<&LayoutState> {
        self.canvases.get(id).and_then(Canvas::layout)
    }

    pub fn clear(&mut self, id: &CanvasId) -> Option<Canvas> {
        self.canvases.remove(id)
    }

    pub fn pointer_down(&mut self, id: &CanvasId, target: DragTarget, pointer: Point) -> bool {
        self.canvases
            .get_mut(id)
            .is_some_and(|canvas| canvas.pointer_down(target, pointer))
    }

    pub fn pointer_move(&mut self, id: &CanvasId, pointer: Point) -> Option<Point> {
        self.canvases.get_mut(id)?.pointer_move(pointer)
    }

    pub fn pointer_up(&mut self, id: &CanvasId) -> Option<DragTarget> {
        self.canvases.get_mut(id)?.pointer_up()
    }

    pub fn len(&self) -> usize {
        self.canvases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canvases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Task;

    fn abc() -> Workflow {
        Workflow::new(
            "abc",
            vec![
                Task::new("A"),
                Task::new("B").depends_on(&["A"]),
                Task::new("C").depends_on(&["A", "B"]),
            ],
        )
    }

    #[test]
    fn empty_workflow_leaves_placeholder_without_state() {
        let mut registry = CanvasRegistry::default();
        let id = CanvasId::from("history");
        assert_eq!(
            registry.render(id.clone(), &Workflow::default()),
            RenderOutcome::Placeholder
        );
        assert!(registry.layout(&id).is_none());
        assert!(!registry.pointer_down(&id, DragTarget::Start, Point::default()));
    }

    #[test]
    fn render_replaces_previous_state() {
        let mut registry = CanvasRegistry::default();
        let id = CanvasId::from("designer");
        registry.render(id.clone(), &abc());
        registry.render(id.clone(), &Workflow::new("one", vec![Task::new("solo")]));
        let state = registry.layout(&id).unwrap();
        assert_eq!(state.tasks.len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn render_is_idempotent() {
        let mut registry = CanvasRegistry::default();
        let id = CanvasId::from("auto");
        registry.render(id.clone(), &abc());
        let first = registry.layout(&id).unwrap().clone();
        registry.render(id.clone(), &abc());
        let second = registry.layout(&id).unwrap();
        assert_eq!(first.layers, second.layers);
        assert_eq!(first.canvas_width, second.canvas_width);
        assert_eq!(first.canvas_height, second.canvas_height);
        assert_eq!(first.positions, second.positions);
    }

    #[test]
    fn cyclic_workflow_keeps_prior_surface() {
        let mut registry = CanvasRegistry::default();
        let id = CanvasId::from("auto");
        registry.render(id.clone(), &abc());
        let cyclic = Workflow::new(
            "loop",
            vec![Task::new("x").depends_on(&["y"]), Task::new("y").depends_on(&["x"])],
        );
        assert!(matches!(
            registry.render(id.clone(), &cyclic),
            RenderOutcome::Rejected(LayoutError::Cycle { .. })
        ));
        assert_eq!(registry.layout(&id).unwrap().tasks.len(), 3);
    }

    #[test]
    fn canvases_are_independent() {
        let mut registry = CanvasRegistry::default();
        let left = CanvasId::from("left");
        let right = CanvasId::from("right");
        registry.render(left.clone(), &abc());
        registry.render(right.clone(), &abc());
        assert!(registry.pointer_down(&left, DragTarget::Task(0), Point::new(200.0, 140.0)));
        assert!(registry.pointer_down(&right, DragTarget::Task(0), Point::new(200.0, 140.0)));
        registry.pointer_move(&left, Point::new(260.0, 200.0));
        assert_ne!(
            registry.layout(&left).unwrap().positions[0],
            registry.layout(&right).unwrap().positions[0]
        );
        assert_eq!(registry.pointer_up(&left), Some(DragTarget::Task(0)));
        registry.clear(&right);
        assert!(registry.get(&right).is_none());
    }
}
