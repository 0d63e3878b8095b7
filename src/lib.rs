#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod force;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use force::ForceGraph;
pub use layout::{CanvasId, CanvasRegistry, LayoutError, RenderOutcome, compute_flow_layout};
