use crate::config::{FlowLayoutConfig, RenderConfig};
use crate::force::ForceGraph;
use crate::ir::{DependencyType, Task};
use crate::layout::types::fmt_num;
use crate::layout::{ConnectorKind, DragTarget, LayoutState, NodePosition};
use crate::text_metrics::{fit_with_ellipsis, text_width, wrap_lines};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const HEADER_HEIGHT: f32 = 28.0;
const CARD_RADIUS: f32 = 8.0;
const CARD_INSET: f32 = 10.0;
const LEGEND_INSET: f32 = 20.0;
const LEGEND_ROW: f32 = 20.0;

pub fn render_flow_svg(state: &LayoutState, theme: &Theme) -> String {
    let width = state.canvas_width.max(state.surface_width);
    let height = state.canvas_height.max(state.surface_height);
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = fmt_num(width),
        h = fmt_num(height),
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str(&format!(
        "<defs><marker id=\"ah\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"8\" markerHeight=\"8\" orient=\"auto\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker></defs>",
        theme.connector_color
    ));

    svg.push_str(&format!(
        "<g class=\"flow-lines\" data-width=\"{}\" data-height=\"{}\">",
        fmt_num(state.surface_width),
        fmt_num(state.surface_height)
    ));
    for connector in &state.connectors {
        let kind = match connector.kind {
            ConnectorKind::Entry => "entry",
            ConnectorKind::Dependency => "dependency",
            ConnectorKind::Exit => "exit",
        };
        svg.push_str(&format!(
            "<path class=\"{kind}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-opacity=\"{}\" marker-end=\"url(#ah)\"/>",
            connector.path_data(),
            theme.connector_color,
            fmt_num(theme.connector_width),
            theme.connector_opacity
        ));
    }
    svg.push_str("</g>");

    let mut order: Vec<DragTarget> = vec![DragTarget::Start];
    order.extend(
        state
            .layers
            .iter()
            .flatten()
            .map(|&idx| DragTarget::Task(idx)),
    );
    order.push(DragTarget::End);
    if let Some(raised) = state.raised {
        order.retain(|target| *target != raised);
        order.push(raised);
    }

    for target in order {
        match target {
            DragTarget::Start => {
                let origin = state.start_marker_origin();
                marker_svg(&mut svg, origin.x, origin.y, state, "Start", &theme.start_fill, theme);
            }
            DragTarget::End => {
                let origin = state.end_marker_origin();
                marker_svg(&mut svg, origin.x, origin.y, state, "End", &theme.end_fill, theme);
            }
            DragTarget::Task(idx) => {
                if let (Some(task), Some(pos)) = (state.tasks.get(idx), state.position(idx)) {
                    card_svg(&mut svg, idx, task, pos, state, theme);
                }
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

fn marker_svg(
    svg: &mut String,
    x: f32,
    y: f32,
    state: &LayoutState,
    label: &str,
    fill: &str,
    theme: &Theme,
) {
    let (w, h) = (state.marker_width, state.marker_height);
    svg.push_str(&format!(
        "<g class=\"flow-marker\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" fill=\"{fill}\"/>",
        fmt_num(x),
        fmt_num(y),
        fmt_num(w),
        fmt_num(h),
        fmt_num(h / 2.0)
    ));
    svg.push_str(&format!(
        "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" font-weight=\"600\" fill=\"{}\">{label}</text></g>",
        fmt_num(x + w / 2.0),
        fmt_num(y + h / 2.0),
        escape_xml(&theme.font_family),
        fmt_num(theme.font_size),
        theme.marker_text
    ));
}

/// Step badge and service header, then name, `SERVICE → operation` and description.
fn card_svg(
    svg: &mut String,
    idx: usize,
    task: &Task,
    pos: &NodePosition,
    state: &LayoutState,
    theme: &Theme,
) {
    let (w, h) = (state.node_width, state.node_height);
    let (x, y) = (pos.x, pos.y);
    let family = theme.font_family.as_str();
    let size = theme.font_size;
    let small = (size - 1.0).max(1.0);
    let measure = |text: &str| text_width(text, size, family);
    let measure_small = |text: &str| text_width(text, small, family);
    let service = task.service.to_uppercase();

    svg.push_str(&format!(
        "<g class=\"flow-node\" data-task=\"{}\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{CARD_RADIUS}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
        escape_xml(&task.name),
        fmt_num(x),
        fmt_num(y),
        fmt_num(w),
        fmt_num(h),
        theme.node_fill,
        theme.node_border
    ));
    svg.push_str(&format!(
        "<path d=\"M {x0} {y1} L {x0} {yr} Q {x0} {y0} {xr} {y0} L {xl} {y0} Q {x1} {y0} {x1} {yr} L {x1} {y1} Z\" fill=\"{}\"/>",
        theme.node_header_fill,
        x0 = fmt_num(x),
        x1 = fmt_num(x + w),
        xr = fmt_num(x + CARD_RADIUS),
        xl = fmt_num(x + w - CARD_RADIUS),
        y0 = fmt_num(y),
        yr = fmt_num(y + CARD_RADIUS),
        y1 = fmt_num(y + HEADER_HEIGHT),
    ));

    let badge_x = x + CARD_INSET + 8.0;
    let badge_y = y + HEADER_HEIGHT / 2.0;
    svg.push_str(&format!(
        "<circle cx=\"{}\" cy=\"{}\" r=\"9\" fill=\"{}\"/><text x=\"{}\" y=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" font-weight=\"700\" fill=\"{}\">{}</text>",
        fmt_num(badge_x),
        fmt_num(badge_y),
        theme.badge_fill,
        fmt_num(badge_x),
        fmt_num(badge_y),
        escape_xml(family),
        fmt_num(small),
        theme.badge_text,
        idx + 1
    ));

    let header_x = badge_x + 16.0;
    let header = fit_with_ellipsis(&service, x + w - CARD_INSET - header_x, measure);
    text_svg(svg, header_x, badge_y, &header, size, "600", &theme.node_header_text, family);

    let body_x = x + CARD_INSET;
    let body_width = w - CARD_INSET * 2.0;
    let mut line_y = y + HEADER_HEIGHT + size + 6.0;
    let name = fit_with_ellipsis(&task.name, body_width, measure);
    text_svg(svg, body_x, line_y, &name, size, "600", &theme.text_color, family);

    line_y += size + 6.0;
    let call = format!("{service} \u{2192} {}", task.operation);
    let call = fit_with_ellipsis(&call, body_width, measure_small);
    text_svg(svg, body_x, line_y, &call, small, "400", &theme.muted_text_color, family);

    if let Some(description) = task.description.as_deref().filter(|d| !d.trim().is_empty()) {
        let remaining = y + h - line_y - 6.0;
        let max_lines = (remaining / (small + 3.0)).floor().max(1.0) as usize;
        for line in wrap_lines(description, body_width, max_lines, measure_small) {
            line_y += small + 3.0;
            text_svg(svg, body_x, line_y, &line, small, "400", &theme.muted_text_color, family);
        }
    }

    svg.push_str("</g>");
}

#[allow(clippy::too_many_arguments)]
fn text_svg(
    svg: &mut String,
    x: f32,
    y: f32,
    text: &str,
    size: f32,
    weight: &str,
    fill: &str,
    family: &str,
) {
    svg.push_str(&format!(
        "<text x=\"{}\" y=\"{}\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{weight}\" fill=\"{fill}\">{}</text>",
        fmt_num(x),
        fmt_num(y),
        escape_xml(family),
        fmt_num(size),
        escape_xml(text)
    ));
}

/// Shown instead of a flow when the workflow has no tasks.
pub fn render_placeholder_svg(message: &str, config: &FlowLayoutConfig, theme: &Theme) -> String {
    let width = config.min_canvas_width;
    let height = config.padding_top * 2.0 + config.marker_height;
    placeholder_svg(message, width, height, theme)
}

fn placeholder_svg(message: &str, width: f32, height: f32, theme: &Theme) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\"><rect width=\"100%\" height=\"100%\" fill=\"{}\"/><text x=\"{}\" y=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text></svg>",
        theme.background,
        fmt_num(width / 2.0),
        fmt_num(height / 2.0),
        escape_xml(&theme.font_family),
        fmt_num(theme.font_size),
        theme.muted_text_color,
        escape_xml(message),
        w = fmt_num(width),
        h = fmt_num(height),
    )
}

/// Snapshot of the force graph at its current positions and highlight.
///
/// A graph without nodes renders the configured placeholder instead.
pub fn render_force_svg(graph: &ForceGraph, theme: &Theme) -> String {
    let (width, height) = graph.zoom().viewport();
    if graph.is_empty() {
        return placeholder_svg(&graph.config().placeholder_text, width, height, theme);
    }
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = fmt_num(width),
        h = fmt_num(height),
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));

    svg.push_str("<defs>");
    for kind in DependencyType::ALL {
        let style = kind.style();
        svg.push_str(&format!(
            "<marker id=\"arrow-{}\" viewBox=\"0 -4 8 8\" refX=\"20\" refY=\"0\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto\"><path d=\"M0,-4L8,0L0,4\" fill=\"{}\" opacity=\"0.6\"/></marker>",
            kind.tag(),
            style.color
        ));
    }
    svg.push_str("</defs>");

    svg.push_str(&format!(
        "<g transform=\"{}\">",
        graph.zoom().transform().to_svg()
    ));

    svg.push_str("<g class=\"links\">");
    for (idx, edge) in graph.edges().iter().enumerate() {
        let (Some(source), Some(target), Some(look)) = (
            graph.position(edge.source),
            graph.position(edge.target),
            graph.edge_appearance(idx),
        ) else {
            continue;
        };
        let style = edge.kind.style();
        let dash = style
            .dash
            .map(|dash| format!(" stroke-dasharray=\"{dash}\""))
            .unwrap_or_default();
        let display = if look.visible { "" } else { " display=\"none\"" };
        svg.push_str(&format!(
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\"{dash} stroke-opacity=\"{}\" marker-end=\"url(#arrow-{})\"{display}/>",
            fmt_num(source.x),
            fmt_num(source.y),
            fmt_num(target.x),
            fmt_num(target.y),
            style.color,
            style.width,
            look.opacity,
            edge.kind.tag()
        ));
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"nodes\">");
    let label_offset = graph.config().label_offset;
    for (idx, node) in graph.nodes().iter().enumerate() {
        let (Some(at), Some(look)) = (graph.position(idx), graph.node_appearance(idx)) else {
            continue;
        };
        let display = if look.visible { "" } else { " display=\"none\"" };
        svg.push_str(&format!(
            "<g class=\"node\" data-id=\"{}\" transform=\"translate({},{})\"{display}>",
            escape_xml(&node.id),
            fmt_num(at.x),
            fmt_num(at.y)
        ));
        svg.push_str(&format!(
            "<circle r=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\" opacity=\"{}\"><title>{} ({})</title></circle>",
            fmt_num(node.radius),
            node.category.color(),
            theme.graph_node_stroke,
            look.opacity,
            escape_xml(&node.label),
            escape_xml(&node.short)
        ));
        svg.push_str(&format!(
            "<text text-anchor=\"middle\" dy=\"{}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" opacity=\"{}\" pointer-events=\"none\">{}</text></g>",
            fmt_num(node.radius + label_offset),
            escape_xml(&theme.font_family),
            fmt_num(theme.graph_label_size),
            theme.graph_label_color,
            look.label_opacity,
            escape_xml(&node.short)
        ));
    }
    svg.push_str("</g></g>");
    legend_svg(&mut svg, graph, theme);
    svg.push_str("</svg>");
    svg
}

/// Category key in screen space; switched-off categories are faded.
fn legend_svg(svg: &mut String, graph: &ForceGraph, theme: &Theme) {
    let filter = graph.filter();
    svg.push_str("<g class=\"legend\">");
    for (row, category) in filter.categories().iter().enumerate() {
        let y = LEGEND_INSET + row as f32 * LEGEND_ROW;
        let active = filter.is_active(category);
        let opacity = if active { 1.0 } else { 0.35 };
        svg.push_str(&format!(
            "<g class=\"legend-item\" data-category=\"{}\" data-active=\"{active}\" opacity=\"{opacity}\"><circle cx=\"{}\" cy=\"{}\" r=\"6\" fill=\"{}\"/><text x=\"{}\" y=\"{}\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text></g>",
            escape_xml(category.tag()),
            fmt_num(LEGEND_INSET),
            fmt_num(y),
            category.color(),
            fmt_num(LEGEND_INSET + 12.0),
            fmt_num(y),
            escape_xml(&theme.font_family),
            fmt_num(theme.graph_label_size),
            theme.graph_label_color,
            escape_xml(category.label())
        ));
    }
    svg.push_str("</g>");
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap =
        resvg::tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
            anyhow::anyhow!(
                "failed to allocate a {}x{} pixmap",
                size.width(),
                size.height()
            )
        })?;

    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap.as_mut());
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    anyhow::bail!("PNG output requires the `png` feature")
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForceLayoutConfig;
    use crate::ir::{ServiceCategory, ServiceEdge, ServiceGraph, ServiceNode, Workflow};
    use crate::layout::{DragController, Point, compute_flow_layout};

    fn workflow() -> Workflow {
        Workflow::new(
            "web",
            vec![
                Task::new("vpc").with_service("vpc", "create_vpc"),
                Task::new("ecs <web>")
                    .with_service("ecs", "create_servers")
                    .depends_on(&["vpc"]),
            ],
        )
    }

    #[test]
    fn flow_svg_draws_lines_before_cards() {
        let state = compute_flow_layout(&workflow(), &FlowLayoutConfig::default()).unwrap();
        let svg = render_flow_svg(&state, &Theme::classic());
        assert!(svg.starts_with("<svg"));
        let lines = svg.find("flow-lines").unwrap();
        let card = svg.find("flow-node").unwrap();
        assert!(lines < card);
        assert_eq!(svg.matches("marker-end=\"url(#ah)\"").count(), 3);
        assert!(svg.contains("ecs &lt;web&gt;"));
        assert!(svg.contains(">2</text>"));
        assert!(svg.contains("VPC \u{2192} create_vpc"));
    }

    #[test]
    fn raised_card_is_drawn_last() {
        let mut state = compute_flow_layout(&workflow(), &FlowLayoutConfig::default()).unwrap();
        let mut drag = DragController::new();
        drag.pointer_down(&mut state, crate::layout::DragTarget::Task(0), Point::new(60.0, 140.0));
        let svg = render_flow_svg(&state, &Theme::classic());
        let vpc = svg.find("data-task=\"vpc\"").unwrap();
        let end = svg.find(">End</text>").unwrap();
        assert!(vpc > end);
    }

    #[test]
    fn placeholder_carries_message() {
        let svg =
            render_placeholder_svg("No tasks", &FlowLayoutConfig::default(), &Theme::classic());
        assert!(svg.contains(">No tasks</text>"));
    }

    #[test]
    fn force_svg_has_typed_arrows_and_hidden_filtered_nodes() {
        let graph = ServiceGraph {
            nodes: vec![
                ServiceNode {
                    id: "ecs".to_string(),
                    label: "Elastic Cloud Server".to_string(),
                    short: "ECS".to_string(),
                    category: ServiceCategory::Compute,
                },
                ServiceNode {
                    id: "vpc".to_string(),
                    label: "Virtual Private Cloud".to_string(),
                    short: "VPC".to_string(),
                    category: ServiceCategory::Network,
                },
            ],
            edges: vec![ServiceEdge {
                source: "ecs".to_string(),
                target: "vpc".to_string(),
                kind: DependencyType::Optional,
                description: None,
            }],
        };
        let mut engine = ForceGraph::new(&graph, ForceLayoutConfig::default(), 800.0, 600.0);
        engine.run_to_rest(10);
        engine.toggle_category(&ServiceCategory::Network);
        let svg = render_force_svg(&engine, &Theme::classic());
        for kind in DependencyType::ALL {
            assert!(svg.contains(&format!("id=\"arrow-{}\"", kind.tag())));
        }
        assert!(svg.contains("stroke-dasharray=\"6,3\""));
        assert!(svg.contains("translate(400,300) scale(0.85)"));
        assert_eq!(svg.matches("display=\"none\"").count(), 2);
        assert!(svg.contains("fill=\"#0d6efd\""));
    }

    #[test]
    fn empty_graph_renders_placeholder() {
        let engine = ForceGraph::new(
            &ServiceGraph::default(),
            ForceLayoutConfig::default(),
            800.0,
            600.0,
        );
        let svg = render_force_svg(&engine, &Theme::classic());
        assert!(svg.contains(">No services</text>"));
        assert!(svg.contains("width=\"800\""));
        assert!(!svg.contains("class=\"nodes\""));
    }

    #[test]
    fn legend_lists_categories_and_fades_hidden_ones() {
        let node = |id: &str, category| ServiceNode {
            id: id.to_string(),
            label: id.to_uppercase(),
            short: id.to_uppercase(),
            category,
        };
        let graph = ServiceGraph {
            nodes: vec![
                node("ecs", ServiceCategory::Compute),
                node("vpc", ServiceCategory::Network),
                node("bms", ServiceCategory::Compute),
            ],
            edges: Vec::new(),
        };
        let mut engine = ForceGraph::new(&graph, ForceLayoutConfig::default(), 800.0, 600.0);
        engine.toggle_category(&ServiceCategory::Network);
        let svg = render_force_svg(&engine, &Theme::classic());
        assert_eq!(svg.matches("class=\"legend-item\"").count(), 2);
        let compute = svg.find("data-category=\"compute\" data-active=\"true\"").unwrap();
        let network = svg.find("data-category=\"network\" data-active=\"false\"").unwrap();
        assert!(compute < network);
        assert!(svg.contains(">Compute</text>"));
        assert!(svg.contains(">Network</text>"));
        assert!(svg.contains("opacity=\"0.35\""));
        assert!(svg.contains(&format!("fill=\"{}\"", ServiceCategory::Network.color())));
    }
}
