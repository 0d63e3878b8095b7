mod detail;
mod filter;
mod highlight;
mod simulation;
mod zoom;

pub use detail::{DependencyProvider, InMemoryProvider, JsonProvider, ProviderError};
pub use filter::CategoryFilter;
pub use highlight::{Highlight, HighlightState, SearchOverlay};
pub use simulation::{Body, Simulation};
pub use zoom::{ZoomController, ZoomTransform};

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::config::ForceLayoutConfig;
use crate::ir::{DependencyDetail, DependencyType, ServiceCategory, ServiceGraph};
use crate::layout::Point;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub short: String,
    pub category: ServiceCategory,
    pub in_degree: usize,
    pub radius: f32,
}

/// Edge between two nodes that both exist; dangling edges never get here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub source: usize,
    pub target: usize,
    pub kind: DependencyType,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeAppearance {
    pub visible: bool,
    pub opacity: f32,
    pub label_opacity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeAppearance {
    pub visible: bool,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub categories: usize,
    /// Services with the most dependents, most depended-on first.
    pub top_depended: Vec<(String, usize)>,
}

/// Interactive service dependency graph: physics, drag pinning, highlight,
/// category filter, search and the zoom transform.
#[derive(Debug, Clone)]
pub struct ForceGraph {
    config: ForceLayoutConfig,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    index: HashMap<String, usize>,
    raw_edge_count: usize,
    simulation: Simulation,
    highlight: HighlightState,
    filter: CategoryFilter,
    zoom: ZoomController,
    detail: Option<DependencyDetail>,
    dragging: HashSet<usize>,
}

impl ForceGraph {
    pub fn new(graph: &ServiceGraph, config: ForceLayoutConfig, width: f32, height: f32) -> Self {
        let zoom = ZoomController::new(width, height, &config);
        let mut engine = Self {
            simulation: Simulation::new(Vec::new(), &[], &config),
            config,
            nodes: Vec::new(),
            edges: Vec::new(),
            index: HashMap::new(),
            raw_edge_count: 0,
            highlight: HighlightState::default(),
            filter: CategoryFilter::default(),
            zoom,
            detail: None,
            dragging: HashSet::new(),
        };
        engine.load(graph);
        engine
    }

    fn load(&mut self, graph: &ServiceGraph) {
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        for edge in &graph.edges {
            *in_degree.entry(edge.target.as_str()).or_default() += 1;
        }

        let config = &self.config;
        self.nodes = graph
            .nodes
            .iter()
            .map(|node| {
                let degree = in_degree.get(node.id.as_str()).copied().unwrap_or(0);
                let radius = (config.radius_min + degree as f32 * config.radius_per_in_degree)
                    .clamp(config.radius_min, config.radius_max);
                GraphNode {
                    id: node.id.clone(),
                    label: node.label.clone(),
                    short: node.short.clone(),
                    category: node.category.clone(),
                    in_degree: degree,
                    radius,
                }
            })
            .collect();
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id.clone(), idx))
            .collect();

        self.edges = graph
            .edges
            .iter()
            .filter_map(|edge| {
                let source = *self.index.get(&edge.source)?;
                let target = *self.index.get(&edge.target)?;
                Some(GraphEdge {
                    source,
                    target,
                    kind: edge.kind,
                    description: edge.description.clone(),
                })
            })
            .collect();
        self.raw_edge_count = graph.edges.len();

        let dropped = graph.edges.len() - self.edges.len();
        if dropped > 0 {
            tracing::debug!(dropped, "ignoring edges with unknown endpoints");
        }

        let radii = self.nodes.iter().map(|node| node.radius).collect();
        let links: Vec<(usize, usize)> = self.edges.iter().map(|e| (e.source, e.target)).collect();
        self.simulation = Simulation::new(radii, &links, &self.config);
        self.filter = CategoryFilter::new(self.nodes.iter().map(|node| &node.category));
        self.highlight.clear();
        self.detail = None;
        self.dragging.clear();
        tracing::debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            categories = self.filter.categories().len(),
            "loaded service graph"
        );
    }

    /// Rebuilds everything from fresh data and clears the selection.
    pub fn reload(&mut self, graph: &ServiceGraph) {
        self.simulation.stop();
        self.load(graph);
    }

    pub fn config(&self) -> &ForceLayoutConfig {
        &self.config
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn position(&self, idx: usize) -> Option<Point> {
        self.simulation.body(idx).map(Body::position)
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn highlight(&self) -> &HighlightState {
        &self.highlight
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn zoom(&self) -> &ZoomController {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut ZoomController {
        &mut self.zoom
    }

    pub fn selected(&self) -> Option<usize> {
        self.highlight.selected()
    }

    pub fn detail(&self) -> Option<&DependencyDetail> {
        self.detail.as_ref()
    }

    pub fn tick(&mut self) -> bool {
        self.simulation.tick()
    }

    pub fn run_to_rest(&mut self, max_ticks: usize) -> usize {
        self.simulation.run_to_rest(max_ticks)
    }

    /// Pins the node where it is and reheats the simulation for the first drag.
    ///
    /// Starting a drag on a node that is already being dragged only re-pins it.
    pub fn drag_start(&mut self, idx: usize) -> bool {
        let Some(at) = self.position(idx) else {
            return false;
        };
        if self.dragging.is_empty() {
            self.simulation.set_alpha_target(self.config.drag_alpha_target);
            self.simulation.restart();
        }
        self.dragging.insert(idx);
        self.simulation.pin(idx, at)
    }

    pub fn drag_move(&mut self, idx: usize, to: Point) -> bool {
        if !self.dragging.contains(&idx) {
            return false;
        }
        self.simulation.pin(idx, to)
    }

    /// Releases the node; heat decays once no drag is left.
    pub fn drag_end(&mut self, idx: usize) {
        if !self.dragging.remove(&idx) {
            return;
        }
        self.simulation.unpin(idx);
        if self.dragging.is_empty() {
            self.simulation.set_alpha_target(0.0);
        }
    }

    pub fn is_dragging(&self) -> bool {
        !self.dragging.is_empty()
    }

    pub fn hover_enter(&mut self, idx: usize) {
        if idx < self.nodes.len() {
            self.highlight.hover_enter(idx);
        }
    }

    pub fn hover_leave(&mut self) {
        self.highlight.hover_leave();
    }

    /// Locks the highlight on a node and loads its dependency detail.
    ///
    /// A failing provider is logged and the previously shown detail is kept.
    pub fn select(&mut self, idx: usize, provider: &dyn DependencyProvider) -> bool {
        let Some(node) = self.nodes.get(idx) else {
            return false;
        };
        self.highlight.select(idx);
        match provider.dependencies(&node.id) {
            Ok(detail) => self.detail = Some(detail),
            Err(err) => {
                tracing::warn!(service = %node.id, error = %err, "failed to load dependency detail")
            }
        }
        true
    }

    /// Selects a service from the detail list and pans it into view.
    pub fn focus_service(&mut self, id: &str, provider: &dyn DependencyProvider) -> bool {
        let Some(idx) = self.node_index(id) else {
            return false;
        };
        self.select(idx, provider);
        if let Some(at) = self.position(idx) {
            self.zoom.focus(at);
        }
        true
    }

    pub fn deselect(&mut self) {
        self.highlight.deselect();
        self.detail = None;
    }

    /// Case-insensitive substring match on id, label and short name.
    ///
    /// A blank query drops the overlay. Returns the number of matches.
    pub fn search(&mut self, query: &str) -> usize {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            self.highlight.set_search(None);
            return 0;
        }
        let matches: HashSet<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| {
                node.id.to_lowercase().contains(&query)
                    || node.label.to_lowercase().contains(&query)
                    || node.short.to_lowercase().contains(&query)
            })
            .map(|(idx, _)| idx)
            .collect();
        let count = matches.len();
        self.highlight.set_search(Some(SearchOverlay { query, matches }));
        count
    }

    pub fn toggle_category(&mut self, category: &ServiceCategory) -> bool {
        self.filter.toggle(category)
    }

    pub fn show_all_categories(&mut self) {
        self.filter.show_all();
    }

    fn neighbours(&self, idx: usize) -> HashSet<usize> {
        let mut connected = HashSet::from([idx]);
        for edge in &self.edges {
            if edge.source == idx {
                connected.insert(edge.target);
            }
            if edge.target == idx {
                connected.insert(edge.source);
            }
        }
        connected
    }

    pub fn node_appearance(&self, idx: usize) -> Option<NodeAppearance> {
        let node = self.nodes.get(idx)?;
        let visible = self.filter.is_active(&node.category);
        let cfg = &self.config;
        let (opacity, label_opacity) = match self.highlight.effective() {
            Highlight::None => (cfg.node_opacity, cfg.label_opacity),
            Highlight::Neighborhood(center) => {
                if self.neighbours(center).contains(&idx) {
                    (1.0, 1.0)
                } else {
                    (cfg.dimmed_node_opacity, cfg.dimmed_node_opacity)
                }
            }
            Highlight::Search(matches) => {
                if matches.contains(&idx) {
                    (1.0, 1.0)
                } else {
                    (cfg.search_miss_opacity, cfg.search_miss_opacity)
                }
            }
        };
        Some(NodeAppearance {
            visible,
            opacity,
            label_opacity,
        })
    }

    pub fn edge_appearance(&self, idx: usize) -> Option<EdgeAppearance> {
        let edge = self.edges.get(idx)?;
        let visible = self.filter.is_active(&self.nodes[edge.source].category)
            && self.filter.is_active(&self.nodes[edge.target].category);
        let cfg = &self.config;
        let opacity = match self.highlight.effective() {
            Highlight::None => cfg.edge_opacity,
            Highlight::Neighborhood(center) => {
                if edge.source == center || edge.target == center {
                    cfg.focus_edge_opacity
                } else {
                    cfg.dimmed_edge_opacity
                }
            }
            Highlight::Search(_) => cfg.dimmed_edge_opacity,
        };
        Some(EdgeAppearance { visible, opacity })
    }

    pub fn stats(&self) -> GraphStats {
        let mut ranked: Vec<(String, usize)> = self
            .nodes
            .iter()
            .filter(|node| node.in_degree > 0)
            .map(|node| (node.id.clone(), node.in_degree))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(self.config.top_depended_count);
        GraphStats {
            nodes: self.nodes.len(),
            edges: self.raw_edge_count,
            categories: self.filter.categories().len(),
            top_depended: ranked,
        }
    }
}
