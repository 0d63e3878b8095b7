use crate::config::{Config, load_config};
use crate::force::ForceGraph;
use crate::ir::{ServiceGraph, Workflow};
use crate::layout::{CanvasId, CanvasRegistry, RenderOutcome, Surface};
use crate::layout_dump::{FlowDump, GraphDump, LayoutDump, write_layout_dump};
use crate::parser::{Payload, detect_payload, parse_service_graph, parse_workflow};
use crate::render::{
    render_flow_svg, render_force_svg, render_placeholder_svg, write_output_png, write_output_svg,
};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "flowviz",
    version,
    about = "Render workflow DAGs and service dependency graphs to SVG/PNG"
)]
pub struct Args {
    /// Input JSON file (workflow or service graph) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (themeVariables, flowchart, graph)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// How to interpret the input
    #[arg(short = 'm', long = "mode", value_enum, default_value = "auto")]
    pub mode: Mode,

    /// Simulation ticks before a graph snapshot is taken
    #[arg(long = "ticks")]
    pub ticks: Option<usize>,

    /// Write the computed layout as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Auto,
    Flow,
    Graph,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

pub fn run() -> Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;
    if let Some(ticks) = args.ticks {
        config.render.ticks = ticks;
    }

    let input = read_input(args.input.as_deref())?;
    let payload = match args.mode {
        Mode::Auto => detect_payload(&input)?,
        Mode::Flow => Payload::Workflow(parse_workflow(&input)?),
        Mode::Graph => Payload::ServiceGraph(parse_service_graph(&input)?),
    };

    let (svg, dump) = match payload {
        Payload::Workflow(workflow) => render_workflow(&workflow, &config)?,
        Payload::ServiceGraph(graph) => render_graph(&graph, &config),
    };

    if let (Some(path), Some(dump)) = (args.dump_layout.as_deref(), dump.as_ref()) {
        write_layout_dump(path, dump)?;
    }

    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref())?,
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_output_png(&svg, &output, &config.render)?;
        }
    }
    Ok(())
}

fn render_workflow(workflow: &Workflow, config: &Config) -> Result<(String, Option<LayoutDump>)> {
    let mut registry = CanvasRegistry::new(config.layout.flow.clone());
    let id = CanvasId::from("main");
    if let RenderOutcome::Rejected(err) = registry.render(id.clone(), workflow) {
        return Err(err.into());
    }
    let canvas = registry
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("canvas `{id}` was not created"))?;
    Ok(match &canvas.surface {
        Surface::Placeholder { message } => (
            render_placeholder_svg(message, registry.config(), &config.theme),
            None,
        ),
        Surface::Flow(state) => (
            render_flow_svg(state, &config.theme),
            Some(LayoutDump::Flow(FlowDump::from_state(state))),
        ),
    })
}

fn render_graph(graph: &ServiceGraph, config: &Config) -> (String, Option<LayoutDump>) {
    let mut engine = ForceGraph::new(
        graph,
        config.layout.force.clone(),
        config.render.width,
        config.render.height,
    );
    if engine.is_empty() {
        return (render_force_svg(&engine, &config.theme), None);
    }
    engine.run_to_rest(config.render.ticks);
    let dump = LayoutDump::Graph(GraphDump::from_graph(&engine));
    (render_force_svg(&engine, &config.theme), Some(dump))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Task;

    #[test]
    fn parses_short_flags() {
        let args = Args::try_parse_from([
            "flowviz", "-i", "wf.json", "-e", "png", "-o", "out.png", "-m", "graph", "--ticks",
            "50",
        ])
        .unwrap();
        assert_eq!(args.mode, Mode::Graph);
        assert_eq!(args.ticks, Some(50));
        assert!(matches!(args.output_format, OutputFormat::Png));
    }

    #[test]
    fn empty_workflow_renders_placeholder() {
        let (svg, dump) = render_workflow(&Workflow::default(), &Config::default()).unwrap();
        assert!(svg.contains("No tasks"));
        assert!(dump.is_none());
    }

    #[test]
    fn empty_service_graph_renders_placeholder() {
        let (svg, dump) = render_graph(&ServiceGraph::default(), &Config::default());
        assert!(svg.contains("No services"));
        assert!(dump.is_none());
    }

    #[test]
    fn cyclic_workflow_is_an_error_at_the_cli() {
        let workflow = Workflow::new(
            "loop",
            vec![Task::new("a").depends_on(&["b"]), Task::new("b").depends_on(&["a"])],
        );
        let err = render_workflow(&workflow, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("cycle"));
    }
}
