//! Command line driver for the scene garbage collector
//!
//! Loads a RON scene document, runs one collector pass and prints what is
//! left of the hierarchy. In debug mode the diagnostic snapshot is printed
//! instead.

mod config;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use scene_gc::config::{Config, ConfigError};
use scene_gc::foundation::collections::NodeId;
use scene_gc::foundation::logging;
use scene_gc::gc::{FindUnusedObjects, GcMode, GcReport};
use scene_gc::scene::document::{DocumentError, LoadedScene, SceneDocument};

use crate::config::CliConfig;

/// Remove unused nodes and components from a scene document
#[derive(Debug, Parser)]
#[command(name = "scene_gc_cli", version)]
struct Args {
    /// Scene document (RON)
    scene: PathBuf,
    
    /// Configuration file (TOML or RON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    
    /// Print the diagnostic snapshot instead of sweeping
    #[arg(long)]
    debug: bool,
    
    /// Use the payload-scanning legacy collector
    #[arg(long)]
    legacy: bool,
}

/// Driver errors
#[derive(thiserror::Error, Debug)]
enum CliError {
    /// Config file could not be read
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    
    /// Scene document could not be loaded
    #[error("Scene document error: {0}")]
    Document(#[from] DocumentError),
    
    /// Snapshot could not be rendered
    #[error("Output error: {0}")]
    Output(String),
    
    /// Hierarchy listing could not be written
    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),
}

fn main() -> ExitCode {
    let args = Args::parse();
    
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    logging::init_with_default(&config.log_filter);
    
    match run(&args.scene, &config) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<CliConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => CliConfig::load_from_file(path)?,
        None => CliConfig::default(),
    };
    config.gc.gc_debug |= args.debug;
    config.gc.use_legacy_gc |= args.legacy;
    Ok(config)
}

fn run(scene_path: &Path, config: &CliConfig) -> Result<String, CliError> {
    log::info!("Loading scene document {}", scene_path.display());
    let document = SceneDocument::load(scene_path)?;
    let mut loaded = document.build()?;
    process(&mut loaded, config)
}

/// Run one pass over a loaded document and render the result
fn process(loaded: &mut LoadedScene, config: &CliConfig) -> Result<String, CliError> {
    let collector = FindUnusedObjects::new(&loaded.overlay, config.gc.clone())
        .with_exclusions(loaded.exclusions.iter().copied());
    let report = collector.process(&mut loaded.scene, &loaded.graph);
    log_report(&report);
    
    match (report.mode, &report.snapshot) {
        (GcMode::Debug, Some(snapshot)) => ron::ser::to_string_pretty(snapshot, ron::ser::PrettyConfig::default())
            .map(|mut text| {
                text.push('\n');
                text
            })
            .map_err(|e| CliError::Output(e.to_string())),
        _ => Ok(render_hierarchy(loaded)?),
    }
}

fn log_report(report: &GcReport) {
    log::info!(
        "{:?}: removed {} nodes and {} components, {} nodes qualified for merging",
        report.mode,
        report.removed_nodes,
        report.removed_components,
        report.merged_nodes.len()
    );
}

/// Indented node list with component types; merge candidates are tagged
fn render_hierarchy(loaded: &LoadedScene) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    let mut stack: Vec<(NodeId, usize)> = vec![(loaded.scene.root(), 0)];
    
    while let Some((id, depth)) = stack.pop() {
        let Some(node) = loaded.scene.node(id) else {
            continue;
        };
        let types: Vec<&str> = node
            .components()
            .iter()
            .filter_map(|c| loaded.scene.component(*c))
            .map(|c| c.type_name.as_str())
            .collect();
        let merge = if node.merge_bone() { " (merge)" } else { "" };
        writeln!(out, "{:indent$}{} [{}]{merge}", "", node.name, types.join(", "), indent = depth * 2)?;
        
        // reversed so children print in order
        for child in loaded.scene.children(id).iter().rev() {
            stack.push((*child, depth + 1));
        }
    }
    Ok(out)
}
