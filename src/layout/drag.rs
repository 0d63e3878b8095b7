use super::types::{DragTarget, LayoutState, Point};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        target: DragTarget,
        /// Pointer position relative to the element's top-left corner at grab time.
        offset: Point,
    },
}

/// Pointer-driven repositioning of cards and markers on one canvas.
///
/// Only one element can be dragged at a time; a drag ends only on pointer-up.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn cursor(&self) -> &'static str {
        if self.is_dragging() { "grabbing" } else { "grab" }
    }

    pub fn pointer_down(
        &mut self,
        layout: &mut LayoutState,
        target: DragTarget,
        pointer: Point,
    ) -> bool {
        if self.is_dragging() {
            return false;
        }
        let Some(origin) = layout.origin_of(target) else {
            return false;
        };
        self.state = DragState::Dragging {
            target,
            offset: Point::new(pointer.x - origin.x, pointer.y - origin.y),
        };
        layout.raised = Some(target);
        tracing::debug!(?target, "drag started");
        true
    }

    /// Moves the grabbed element and regenerates every connector.
    ///
    /// Returns the element's new top-left corner, or `None` when idle.
    pub fn pointer_move(&mut self, layout: &mut LayoutState, pointer: Point) -> Option<Point> {
        let DragState::Dragging { target, offset } = self.state else {
            return None;
        };
        let x = (pointer.x - offset.x).max(0.0);
        let y = (pointer.y - offset.y).max(0.0);
        if !layout.move_element(target, x, y) {
            return None;
        }
        layout.redraw();
        Some(Point::new(x, y))
    }

    pub fn pointer_up(&mut self, layout: Option<&mut LayoutState>) -> Option<DragTarget> {
        let DragState::Dragging { target, .. } = self.state else {
            return None;
        };
        self.state = DragState::Idle;
        if let Some(layout) = layout {
            layout.raised = None;
        }
        tracing::debug!(?target, "drag ended");
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FlowLayoutConfig;
    use crate::ir::{Task, Workflow};
    use crate::layout::compute_flow_layout;
    use crate::layout::types::{ConnectorKind, Endpoint};

    fn layout() -> LayoutState {
        let workflow = Workflow::new(
            "abc",
            vec![
                Task::new("A"),
                Task::new("B").depends_on(&["A"]),
                Task::new("C").depends_on(&["A", "B"]),
            ],
        );
        compute_flow_layout(&workflow, &FlowLayoutConfig::default()).unwrap()
    }

    #[test]
    fn drag_moves_only_the_grabbed_card() {
        let mut state = layout();
        let before = state.positions.clone();
        let mut drag = DragController::new();
        let origin = state.origin_of(DragTarget::Task(1)).unwrap();
        let grab = Point::new(origin.x + 10.0, origin.y + 5.0);
        assert!(drag.pointer_down(&mut state, DragTarget::Task(1), grab));
        assert_eq!(drag.cursor(), "grabbing");
        assert_eq!(state.raised, Some(DragTarget::Task(1)));

        let moved = drag
            .pointer_move(&mut state, Point::new(grab.x + 40.0, grab.y + 30.0))
            .unwrap();
        assert_eq!(moved, Point::new(origin.x + 40.0, origin.y + 30.0));

        let b = state.position(1).unwrap();
        assert_eq!(b.left, moved.x);
        assert_eq!(b.top, moved.y);
        assert_eq!(b.right, moved.x + 210.0);
        assert_eq!(b.bottom, moved.y + 110.0);
        assert_eq!(b.center_x, moved.x + 105.0);
        assert_eq!(state.positions[0], before[0]);
        assert_eq!(state.positions[2], before[2]);

        for connector in &state.connectors {
            if connector.to == Endpoint::Task(1) {
                assert_eq!(connector.end.x, b.center_x);
                assert_eq!(connector.end.y, b.top);
            }
            if connector.from == Endpoint::Task(1) {
                assert_eq!(connector.start.x, b.center_x);
                assert_eq!(connector.start.y, b.bottom);
            }
        }

        assert_eq!(drag.pointer_up(Some(&mut state)), Some(DragTarget::Task(1)));
        assert_eq!(state.raised, None);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn positions_clamp_at_top_left_only() {
        let mut state = layout();
        let mut drag = DragController::new();
        let origin = state.origin_of(DragTarget::Task(0)).unwrap();
        drag.pointer_down(&mut state, DragTarget::Task(0), origin);
        let moved = drag.pointer_move(&mut state, Point::new(-500.0, -20.0)).unwrap();
        assert_eq!(moved, Point::new(0.0, 0.0));
        let far = drag
            .pointer_move(&mut state, Point::new(5000.0, 4000.0))
            .unwrap();
        assert_eq!(far, Point::new(5000.0, 4000.0));
        assert!(state.surface_width >= 5000.0 + 210.0);
    }

    #[test]
    fn marker_drag_updates_anchor_scalars() {
        let mut state = layout();
        let mut drag = DragController::new();
        let origin = state.origin_of(DragTarget::End).unwrap();
        drag.pointer_down(&mut state, DragTarget::End, origin);
        drag.pointer_move(&mut state, Point::new(origin.x + 100.0, origin.y + 20.0));
        assert_eq!(state.end_center_x, origin.x + 100.0 + 36.0);
        assert_eq!(state.end_top, origin.y + 20.0);
        let exit = state
            .connectors
            .iter()
            .find(|c| c.kind == ConnectorKind::Exit)
            .unwrap();
        assert_eq!(exit.end.x, state.end_center_x);
        assert_eq!(exit.end.y, state.end_top);

        drag.pointer_up(Some(&mut state));
        let origin = state.origin_of(DragTarget::Start).unwrap();
        drag.pointer_down(&mut state, DragTarget::Start, origin);
        drag.pointer_move(&mut state, Point::new(origin.x, origin.y + 10.0));
        assert_eq!(state.start_bottom, origin.y + 10.0 + 36.0);
    }

    #[test]
    fn second_grab_is_refused_while_dragging() {
        let mut state = layout();
        let mut drag = DragController::new();
        assert!(drag.pointer_down(&mut state, DragTarget::Task(0), Point::new(60.0, 140.0)));
        assert!(!drag.pointer_down(&mut state, DragTarget::Task(2), Point::new(60.0, 140.0)));
        assert!(!drag.pointer_down(&mut state, DragTarget::Task(99), Point::default()));
    }

    #[test]
    fn moves_without_grab_are_ignored() {
        let mut state = layout();
        let before = state.connectors.clone();
        let mut drag = DragController::new();
        assert!(drag.pointer_move(&mut state, Point::new(10.0, 10.0)).is_none());
        assert_eq!(drag.pointer_up(Some(&mut state)), None);
        assert_eq!(state.connectors, before);
    }
}
