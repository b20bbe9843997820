//! route-runtime CLI.
//!
//! Loads a route manifest and drives the routing core from the command line:
//!
//! ```text
//! route-runtime resolve /posts/hello        matched chain + params as JSON
//! route-runtime render "/a;side=/b"         prime every router, print RenderOutput
//! route-runtime watch "/a;side=/b"          re-render whenever the manifest changes
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;

use route_runtime::config::{load_config, ManifestWatcher, RouterConfig};
use route_runtime::observability::{logging, metrics};
use route_runtime::routing::load_manifest;
use route_runtime::ssr::{fill_template, render_module, OutlineRenderer};
use route_runtime::{merge_into, BoxError, RuntimeInstance};

#[derive(Parser)]
#[command(name = "route-runtime")]
#[command(about = "Resolve, prime and render routes from a route manifest", long_about = None)]
struct Cli {
    /// Runtime configuration (TOML). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Route manifest (TOML or JSON).
    #[arg(short, long, default_value = "routes.toml")]
    manifest: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the node chain and params a path resolves to
    Resolve { path: String },
    /// Prime every router in a composite URL and render the outline
    Render {
        #[arg(default_value = "/")]
        composite: String,
        /// Base document with <!--ssr:html-->, <!--ssr:head--> and <!--ssr:css--> markers
        #[arg(short, long)]
        template: Option<PathBuf>,
    },
    /// Render, then re-render on every manifest change
    Watch {
        #[arg(default_value = "/")]
        composite: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    logging::init(&config.observability)?;
    metrics::set_enabled(config.observability.metrics_enabled);

    tracing::info!(
        manifest = ?cli.manifest,
        default_reflector = ?config.router.default_reflector,
        history_limit = config.router.history_limit,
        "Configuration loaded"
    );

    match cli.command {
        Commands::Resolve { path } => resolve(&cli.manifest, &path),
        Commands::Render {
            composite,
            template,
        } => render(&cli.manifest, config, &composite, template.as_deref()).await,
        Commands::Watch { composite } => watch(&cli.manifest, config, &composite).await,
    }
}

fn resolve(manifest: &Path, path: &str) -> Result<(), BoxError> {
    let tree = load_manifest(manifest)?;
    let resolution = tree.resolve(path)?;
    let nodes: Vec<String> = resolution
        .nodes
        .iter()
        .map(|node| node.segment().to_string())
        .collect();
    let output = json!({
        "path": path,
        "nodes": nodes,
        "params": resolution.params,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn render(
    manifest: &Path,
    config: RouterConfig,
    composite: &str,
    template: Option<&Path>,
) -> Result<(), BoxError> {
    let instance = RuntimeInstance::new(load_manifest(manifest)?, config);
    let output = render_module(&instance, &OutlineRenderer, composite).await?;

    match template {
        Some(path) => {
            let template = std::fs::read_to_string(path)?;
            println!("{}", fill_template(&template, &output));
        }
        None => println!("{}", serde_json::to_string_pretty(&output)?),
    }
    Ok(())
}

async fn watch(manifest: &Path, config: RouterConfig, composite: &str) -> Result<(), BoxError> {
    let mut instance = RuntimeInstance::new(load_manifest(manifest)?, config.clone());
    print_render(&instance, composite).await?;

    let (watcher, mut trees) = ManifestWatcher::new(manifest);
    let _watcher = watcher.run()?;

    loop {
        tokio::select! {
            Some(tree) = trees.recv() => {
                let next = RuntimeInstance::new(tree, config.clone());
                let moved = merge_into(&next, &instance);
                tracing::info!(moved, "Route tree reloaded");
                for router in next.routers() {
                    if let Err(e) = router.reload().await {
                        tracing::warn!(router = %router.name(), error = %e, "Failed to reload router");
                    }
                }
                instance = next;
                print_render(&instance, composite).await?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    for router in instance.routers() {
        router.destroy();
    }
    Ok(())
}

async fn print_render(instance: &Arc<RuntimeInstance>, composite: &str) -> Result<(), BoxError> {
    let output = render_module(instance, &OutlineRenderer, composite).await?;
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}
