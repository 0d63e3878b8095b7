use super::types::{Connector, ConnectorKind, Endpoint, LayoutState, Point};

/// Entry connectors, one per resolvable dependency, then exit connectors.
pub(crate) fn build_connectors(state: &LayoutState) -> Vec<Connector> {
    let mut connectors = Vec::new();
    let start = Point::new(state.start_center_x, state.start_bottom);
    let end = Point::new(state.end_center_x, state.end_top);

    if let Some(first) = state.layers.first() {
        for &idx in first {
            let Some(pos) = state.position(idx) else {
                continue;
            };
            connectors.push(Connector::vertical_s(
                ConnectorKind::Entry,
                Endpoint::Start,
                Endpoint::Task(idx),
                start,
                pos.top_center(),
            ));
        }
    }

    for (idx, task) in state.tasks.iter().enumerate() {
        for dep in &task.depends_on {
            let Some(&from_idx) = state.name_index.get(dep) else {
                continue;
            };
            let (Some(from), Some(to)) = (state.position(from_idx), state.position(idx)) else {
                continue;
            };
            connectors.push(Connector::vertical_s(
                ConnectorKind::Dependency,
                Endpoint::Task(from_idx),
                Endpoint::Task(idx),
                from.bottom_center(),
                to.top_center(),
            ));
        }
    }

    if let Some(last) = state.layers.last() {
        for &idx in last {
            let Some(pos) = state.position(idx) else {
                continue;
            };
            connectors.push(Connector::vertical_s(
                ConnectorKind::Exit,
                Endpoint::Task(idx),
                Endpoint::End,
                pos.bottom_center(),
                end,
            ));
        }
    }

    connectors
}

/// Overlay size: furthest card or marker edge, floored and then padded.
pub(crate) fn surface_size(state: &LayoutState) -> (f32, f32) {
    let mut max_x = state.min_surface;
    let mut max_y = state.min_surface;
    for pos in &state.positions {
        max_x = max_x.max(pos.right);
        max_y = max_y.max(pos.bottom);
    }
    let half_marker = state.marker_width / 2.0;
    max_x = max_x
        .max(state.start_center_x + half_marker)
        .max(state.end_center_x + half_marker);
    max_y = max_y
        .max(state.start_bottom)
        .max(state.end_top + state.marker_height);
    (max_x + state.surface_margin, max_y + state.surface_margin)
}

#[cfg(test)]
mod tests {
    use crate::config::FlowLayoutConfig;
    use crate::ir::{Task, Workflow};
    use crate::layout::compute_flow_layout;
    use crate::layout::types::{ConnectorKind, Endpoint};

    fn kinds(workflow: &Workflow) -> (usize, usize, usize) {
        let state = compute_flow_layout(workflow, &FlowLayoutConfig::default()).unwrap();
        let count =
            |kind: ConnectorKind| state.connectors.iter().filter(|c| c.kind == kind).count();
        (
            count(ConnectorKind::Entry),
            count(ConnectorKind::Dependency),
            count(ConnectorKind::Exit),
        )
    }

    #[test]
    fn entry_and_exit_match_first_and_last_layer() {
        let workflow = Workflow::new(
            "fan",
            vec![
                Task::new("a"),
                Task::new("b"),
                Task::new("c").depends_on(&["a"]),
                Task::new("d").depends_on(&["a", "b"]),
                Task::new("e").depends_on(&["b"]),
            ],
        );
        assert_eq!(kinds(&workflow), (2, 4, 3));
    }

    #[test]
    fn dangling_dependency_adds_no_connector() {
        let workflow = Workflow::new("dangling", vec![Task::new("D").depends_on(&["Z"])]);
        let state = compute_flow_layout(&workflow, &FlowLayoutConfig::default()).unwrap();
        assert_eq!(state.connectors.len(), 2);
        assert!(state
            .connectors
            .iter()
            .all(|c| c.kind != ConnectorKind::Dependency));
    }

    #[test]
    fn dependency_runs_bottom_center_to_top_center() {
        let workflow = Workflow::new(
            "pair",
            vec![Task::new("a"), Task::new("b").depends_on(&["a"])],
        );
        let state = compute_flow_layout(&workflow, &FlowLayoutConfig::default()).unwrap();
        let dep = state
            .connectors
            .iter()
            .find(|c| c.kind == ConnectorKind::Dependency)
            .unwrap();
        assert_eq!(dep.from, Endpoint::Task(0));
        assert_eq!(dep.to, Endpoint::Task(1));
        let a = state.position(0).unwrap();
        let b = state.position(1).unwrap();
        assert_eq!(dep.start.x, a.center_x);
        assert_eq!(dep.start.y, a.bottom);
        assert_eq!(dep.end.x, b.center_x);
        assert_eq!(dep.end.y, b.top);
    }

    #[test]
    fn surface_has_floor_and_margin() {
        let workflow = Workflow::new("one", vec![Task::new("a")]);
        let state = compute_flow_layout(&workflow, &FlowLayoutConfig::default()).unwrap();
        assert_eq!(state.surface_width, 500.0);
        assert_eq!(state.surface_height, 500.0);
    }
}
