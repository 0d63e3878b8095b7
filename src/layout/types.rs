use serde::Serialize;
use std::collections::HashMap;

use crate::ir::Task;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Placed task card. The derived edges and center always agree with `x`/`y`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePosition {
    pub task_index: usize,
    pub layer: usize,
    pub x: f32,
    pub y: f32,
    pub center_x: f32,
    pub center_y: f32,
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl NodePosition {
    pub fn new(task_index: usize, layer: usize, x: f32, y: f32, width: f32, height: f32) -> Self {
        let mut position = Self {
            task_index,
            layer,
            x,
            y,
            center_x: 0.0,
            center_y: 0.0,
            top: 0.0,
            bottom: 0.0,
            left: 0.0,
            right: 0.0,
        };
        position.move_to(x, y, width, height);
        position
    }

    pub fn move_to(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.x = x;
        self.y = y;
        self.center_x = x + width / 2.0;
        self.center_y = y + height / 2.0;
        self.top = y;
        self.bottom = y + height;
        self.left = x;
        self.right = x + width;
    }

    pub fn top_center(&self) -> Point {
        Point::new(self.center_x, self.top)
    }

    pub fn bottom_center(&self) -> Point {
        Point::new(self.center_x, self.bottom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Endpoint {
    Start,
    Task(usize),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectorKind {
    /// Start marker to a first-layer task.
    Entry,
    Dependency,
    /// Last-layer task to the End marker.
    Exit,
}

/// Cubic connector whose control points share the endpoints' x and sit at mid height.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connector {
    pub kind: ConnectorKind,
    pub from: Endpoint,
    pub to: Endpoint,
    pub start: Point,
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

impl Connector {
    pub fn vertical_s(
        kind: ConnectorKind,
        from: Endpoint,
        to: Endpoint,
        start: Point,
        end: Point,
    ) -> Self {
        let mid_y = start.y + (end.y - start.y) * 0.5;
        Self {
            kind,
            from,
            to,
            start,
            control1: Point::new(start.x, mid_y),
            control2: Point::new(end.x, mid_y),
            end,
        }
    }

    pub fn path_data(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            fmt_num(self.start.x),
            fmt_num(self.start.y),
            fmt_num(self.control1.x),
            fmt_num(self.control1.y),
            fmt_num(self.control2.x),
            fmt_num(self.control2.y),
            fmt_num(self.end.x),
            fmt_num(self.end.y),
        )
    }
}

pub(crate) fn fmt_num(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DragTarget {
    Task(usize),
    Start,
    End,
}

/// Per-canvas layout record shared by the redraw routine and the drag handlers.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutState {
    pub tasks: Vec<Task>,
    #[serde(skip)]
    pub name_index: HashMap<String, usize>,
    pub layers: Vec<Vec<usize>>,
    pub positions: Vec<NodePosition>,
    pub node_width: f32,
    pub node_height: f32,
    pub marker_width: f32,
    pub marker_height: f32,
    pub start_center_x: f32,
    pub start_bottom: f32,
    pub end_center_x: f32,
    pub end_top: f32,
    /// Arithmetic width used to center layers; may be below `canvas_width`.
    pub layout_width: f32,
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub connectors: Vec<Connector>,
    pub surface_width: f32,
    pub surface_height: f32,
    pub raised: Option<DragTarget>,
    #[serde(skip)]
    pub(crate) min_surface: f32,
    #[serde(skip)]
    pub(crate) surface_margin: f32,
}

impl LayoutState {
    pub fn position(&self, task_index: usize) -> Option<&NodePosition> {
        self.positions.get(task_index)
    }

    pub fn layer_of(&self, name: &str) -> Option<usize> {
        let idx = *self.name_index.get(name)?;
        self.positions.get(idx).map(|pos| pos.layer)
    }

    pub fn start_marker_origin(&self) -> Point {
        Point::new(
            self.start_center_x - self.marker_width / 2.0,
            self.start_bottom - self.marker_height,
        )
    }

    pub fn end_marker_origin(&self) -> Point {
        Point::new(self.end_center_x - self.marker_width / 2.0, self.end_top)
    }

    /// Top-left corner of a draggable element.
    pub fn origin_of(&self, target: DragTarget) -> Option<Point> {
        match target {
            DragTarget::Task(idx) => self.positions.get(idx).map(|pos| Point::new(pos.x, pos.y)),
            DragTarget::Start => Some(self.start_marker_origin()),
            DragTarget::End => Some(self.end_marker_origin()),
        }
    }

    /// Moves an element's top-left corner and refreshes every derived coordinate.
    pub fn move_element(&mut self, target: DragTarget, x: f32, y: f32) -> bool {
        match target {
            DragTarget::Task(idx) => {
                let (width, height) = (self.node_width, self.node_height);
                let Some(pos) = self.positions.get_mut(idx) else {
                    return false;
                };
                pos.move_to(x, y, width, height);
            }
            DragTarget::Start => {
                self.start_center_x = x + self.marker_width / 2.0;
                self.start_bottom = y + self.marker_height;
            }
            DragTarget::End => {
                self.end_center_x = x + self.marker_width / 2.0;
                self.end_top = y;
            }
        }
        true
    }

    /// Regenerates the whole connector overlay from current positions.
    pub fn redraw(&mut self) {
        self.connectors = super::connectors::build_connectors(self);
        let (width, height) = super::connectors::surface_size(self);
        self.surface_width = width;
        self.surface_height = height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_coordinates_follow_moves() {
        let mut pos = NodePosition::new(0, 0, 10.0, 20.0, 210.0, 110.0);
        assert_eq!(pos.center_x, 115.0);
        assert_eq!(pos.bottom, 130.0);
        pos.move_to(0.0, 0.0, 210.0, 110.0);
        assert_eq!(pos.right, 210.0);
        assert_eq!(pos.center_y, 55.0);
        assert_eq!(pos.left, pos.x);
        assert_eq!(pos.top, pos.y);
    }

    #[test]
    fn connector_controls_sit_at_mid_height() {
        let connector = Connector::vertical_s(
            ConnectorKind::Dependency,
            Endpoint::Task(0),
            Endpoint::Task(1),
            Point::new(100.0, 200.0),
            Point::new(300.0, 250.0),
        );
        assert_eq!(connector.control1, Point::new(100.0, 225.0));
        assert_eq!(connector.control2, Point::new(300.0, 225.0));
        assert_eq!(connector.path_data(), "M 100 200 C 100 225, 300 225, 300 250");
    }
}
