use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowLayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    pub gap_x: f32,
    pub gap_y: f32,
    pub padding_left: f32,
    pub padding_top: f32,
    pub marker_width: f32,
    pub marker_height: f32,
    pub min_canvas_width: f32,
    pub min_surface: f32,
    pub surface_margin: f32,
    pub placeholder_text: String,
}

impl Default for FlowLayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 210.0,
            node_height: 110.0,
            gap_x: 60.0,
            gap_y: 50.0,
            padding_left: 50.0,
            padding_top: 50.0,
            marker_width: 72.0,
            marker_height: 36.0,
            min_canvas_width: 400.0,
            min_surface: 400.0,
            surface_margin: 100.0,
            placeholder_text: "No tasks".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForceLayoutConfig {
    pub link_distance: f32,
    pub charge_strength: f32,
    pub charge_distance_min: f32,
    pub collide_padding: f32,
    pub collide_strength: f32,
    pub axis_strength: f32,
    pub alpha_min: f32,
    pub alpha_decay: Option<f32>,
    pub velocity_decay: f32,
    pub drag_alpha_target: f32,
    pub radius_min: f32,
    pub radius_max: f32,
    pub radius_per_in_degree: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub zoom_in_factor: f32,
    pub zoom_out_factor: f32,
    pub initial_scale: f32,
    pub label_offset: f32,
    pub node_opacity: f32,
    pub label_opacity: f32,
    pub edge_opacity: f32,
    pub dimmed_node_opacity: f32,
    pub focus_edge_opacity: f32,
    pub dimmed_edge_opacity: f32,
    pub search_miss_opacity: f32,
    pub top_depended_count: usize,
    pub placeholder_text: String,
}

impl Default for ForceLayoutConfig {
    fn default() -> Self {
        Self {
            link_distance: 120.0,
            charge_strength: -300.0,
            charge_distance_min: 1.0,
            collide_padding: 6.0,
            collide_strength: 1.0,
            axis_strength: 0.04,
            alpha_min: 0.001,
            alpha_decay: None,
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
            radius_min: 8.0,
            radius_max: 22.0,
            radius_per_in_degree: 1.5,
            zoom_min: 0.2,
            zoom_max: 4.0,
            zoom_in_factor: 1.3,
            zoom_out_factor: 0.7,
            initial_scale: 0.85,
            label_offset: 14.0,
            node_opacity: 0.9,
            label_opacity: 1.0,
            edge_opacity: 0.5,
            dimmed_node_opacity: 0.15,
            focus_edge_opacity: 0.8,
            dimmed_edge_opacity: 0.05,
            search_miss_opacity: 0.1,
            top_depended_count: 10,
            placeholder_text: "No services".to_string(),
        }
    }
}

impl ForceLayoutConfig {
    /// d3's default: alpha reaches `alpha_min` after 300 ticks.
    pub fn resolved_alpha_decay(&self) -> f32 {
        match self.alpha_decay {
            Some(decay) => decay.clamp(0.0, 1.0),
            None => 1.0 - self.alpha_min.max(f32::MIN_POSITIVE).powf(1.0 / 300.0),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub flow: FlowLayoutConfig,
    pub force: ForceLayoutConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub ticks: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
            ticks: 300,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    flowchart: Option<FlowchartConfigFile>,
    graph: Option<GraphConfigFile>,
    ticks: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    text_color: Option<String>,
    line_color: Option<String>,
    line_opacity: Option<f32>,
    primary_color: Option<String>,
    primary_border_color: Option<String>,
    start_color: Option<String>,
    end_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlowchartConfigFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    node_spacing: Option<f32>,
    rank_spacing: Option<f32>,
    padding: Option<f32>,
    marker_width: Option<f32>,
    marker_height: Option<f32>,
    min_width: Option<f32>,
    placeholder_text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphConfigFile {
    link_distance: Option<f32>,
    charge_strength: Option<f32>,
    collide_padding: Option<f32>,
    axis_strength: Option<f32>,
    alpha_min: Option<f32>,
    alpha_decay: Option<f32>,
    velocity_decay: Option<f32>,
    drag_alpha_target: Option<f32>,
    zoom_min: Option<f32>,
    zoom_max: Option<f32>,
    initial_scale: Option<f32>,
    placeholder_text: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::by_name(theme_name) {
            Some(theme) => config.theme = theme,
            None => tracing::warn!(theme = theme_name, "unknown theme, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.connector_color = v;
        }
        if let Some(v) = vars.line_opacity {
            config.theme.connector_opacity = v.clamp(0.0, 1.0);
        }
        if let Some(v) = vars.primary_color {
            config.theme.node_header_fill = v;
        }
        if let Some(v) = vars.primary_border_color {
            config.theme.node_border = v;
        }
        if let Some(v) = vars.start_color {
            config.theme.start_fill = v;
        }
        if let Some(v) = vars.end_color {
            config.theme.end_fill = v;
        }
    }
    config.render.background = config.theme.background.clone();

    if let Some(flow) = parsed.flowchart {
        let target = &mut config.layout.flow;
        if let Some(v) = flow.node_width {
            target.node_width = v.max(1.0);
        }
        if let Some(v) = flow.node_height {
            target.node_height = v.max(1.0);
        }
        if let Some(v) = flow.node_spacing {
            target.gap_x = v.max(0.0);
        }
        if let Some(v) = flow.rank_spacing {
            target.gap_y = v.max(0.0);
        }
        if let Some(v) = flow.padding {
            target.padding_left = v.max(0.0);
            target.padding_top = v.max(0.0);
        }
        if let Some(v) = flow.marker_width {
            target.marker_width = v.max(1.0);
        }
        if let Some(v) = flow.marker_height {
            target.marker_height = v.max(1.0);
        }
        if let Some(v) = flow.min_width {
            target.min_canvas_width = v.max(0.0);
        }
        if let Some(v) = flow.placeholder_text {
            target.placeholder_text = v;
        }
    }

    if let Some(graph) = parsed.graph {
        let target = &mut config.layout.force;
        if let Some(v) = graph.link_distance {
            target.link_distance = v;
        }
        if let Some(v) = graph.charge_strength {
            target.charge_strength = v;
        }
        if let Some(v) = graph.collide_padding {
            target.collide_padding = v;
        }
        if let Some(v) = graph.axis_strength {
            target.axis_strength = v;
        }
        if let Some(v) = graph.alpha_min {
            target.alpha_min = v;
        }
        if let Some(v) = graph.alpha_decay {
            target.alpha_decay = Some(v);
        }
        if let Some(v) = graph.velocity_decay {
            target.velocity_decay = v.clamp(0.0, 1.0);
        }
        if let Some(v) = graph.drag_alpha_target {
            target.drag_alpha_target = v;
        }
        if let Some(v) = graph.zoom_min {
            target.zoom_min = v;
        }
        if let Some(v) = graph.zoom_max {
            target.zoom_max = v;
        }
        if let Some(v) = graph.initial_scale {
            target.initial_scale = v;
        }
        if let Some(v) = graph.placeholder_text {
            target.placeholder_text = v;
        }
    }

    if let Some(ticks) = parsed.ticks {
        config.render.ticks = ticks;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_alpha_decay_matches_three_hundred_ticks() {
        let config = ForceLayoutConfig::default();
        let decay = config.resolved_alpha_decay();
        assert!((decay - 0.0228).abs() < 1e-3);
    }

    #[test]
    fn config_file_overrides_selected_fields() {
        let config = parse_config(
            r##"{
                "theme": "modern",
                "themeVariables": {"lineColor": "#ff0000"},
                "flowchart": {"nodeWidth": 180, "rankSpacing": 40},
                "graph": {"linkDistance": 90, "placeholderText": "Nothing deployed"},
                "ticks": 50
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.connector_color, "#ff0000");
        assert_eq!(config.layout.flow.node_width, 180.0);
        assert_eq!(config.layout.flow.gap_y, 40.0);
        assert_eq!(config.layout.flow.gap_x, 60.0);
        assert_eq!(config.layout.force.link_distance, 90.0);
        assert_eq!(config.layout.force.placeholder_text, "Nothing deployed");
        assert_eq!(config.render.ticks, 50);
    }

    #[test]
    fn missing_path_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.flow.node_height, 110.0);
    }
}
