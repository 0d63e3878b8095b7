use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub text_color: String,
    pub muted_text_color: String,
    pub connector_color: String,
    pub connector_opacity: f32,
    pub connector_width: f32,
    pub node_fill: String,
    pub node_border: String,
    pub node_header_fill: String,
    pub node_header_text: String,
    pub badge_fill: String,
    pub badge_text: String,
    pub start_fill: String,
    pub end_fill: String,
    pub marker_text: String,
    pub graph_node_stroke: String,
    pub graph_label_color: String,
    pub graph_label_size: f32,
}

impl Theme {
    /// Colors of the workflow console the renderer was built for.
    pub fn classic() -> Self {
        Self {
            font_family: "-apple-system, \"Segoe UI\", Roboto, \"Helvetica Neue\", Arial, sans-serif"
                .to_string(),
            font_size: 12.0,
            background: "#FFFFFF".to_string(),
            text_color: "#212529".to_string(),
            muted_text_color: "#6c757d".to_string(),
            connector_color: "#0d6efd".to_string(),
            connector_opacity: 0.6,
            connector_width: 2.0,
            node_fill: "#FFFFFF".to_string(),
            node_border: "#dee2e6".to_string(),
            node_header_fill: "#0d6efd".to_string(),
            node_header_text: "#FFFFFF".to_string(),
            badge_fill: "#FFFFFF".to_string(),
            badge_text: "#0d6efd".to_string(),
            start_fill: "#198754".to_string(),
            end_fill: "#dc3545".to_string(),
            marker_text: "#FFFFFF".to_string(),
            graph_node_stroke: "#FFFFFF".to_string(),
            graph_label_color: "#333333".to_string(),
            graph_label_size: 10.0,
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            background: "#FFFFFF".to_string(),
            text_color: "#1C2430".to_string(),
            muted_text_color: "#7A8AA6".to_string(),
            connector_color: "#7A8AA6".to_string(),
            connector_opacity: 0.8,
            connector_width: 1.6,
            node_fill: "#F8FAFF".to_string(),
            node_border: "#C7D2E5".to_string(),
            node_header_fill: "#EEF2F8".to_string(),
            node_header_text: "#1C2430".to_string(),
            badge_fill: "#1C2430".to_string(),
            badge_text: "#FFFFFF".to_string(),
            start_fill: "#2F9E6E".to_string(),
            end_fill: "#C2495A".to_string(),
            marker_text: "#FFFFFF".to_string(),
            graph_node_stroke: "#FFFFFF".to_string(),
            graph_label_color: "#1C2430".to_string(),
            graph_label_size: 10.0,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "classic" | "default" => Some(Self::classic()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
