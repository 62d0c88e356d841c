use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec2;
use shapestage_input::PointerDispatcher;
use shapestage_kernel::{ComposedScene, FrameClock, SceneVariant, compose};
use shapestage_params::{ParamStore, load_overrides};
use shapestage_render::{DebugTextRenderer, RenderView, Renderer};
use shapestage_tools::{EventTally, SceneInspector};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shapestage-cli", about = "Headless driver for shapestage scenes")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Scene variant: basic or tunable
    #[arg(long, global = true, default_value = "basic")]
    variant: SceneVariant,

    /// JSON file of parameter overrides, e.g. {"lightIntensity": 3.0}
    #[arg(long, global = true)]
    params: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and a summary of the composed scene
    Info,
    /// Step the scene and print the final frame
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Seconds per frame
        #[arg(long, default_value = "0.016")]
        dt: f64,
    },
    /// Print current parameter values as JSON
    Params,
    /// Pick from the default view at normalized device coordinates
    Pick {
        #[arg(short, long, allow_hyphen_values = true)]
        x: f32,
        #[arg(short, long, allow_hyphen_values = true)]
        y: f32,
        /// Viewport width over height
        #[arg(long, default_value = "1.7778")]
        aspect: f32,
    },
}

fn load(cli: &Cli) -> anyhow::Result<(ComposedScene, ParamStore)> {
    let mut params = ParamStore::new();
    let mut composed = compose(cli.variant, &mut params)?;
    if let Some(path) = &cli.params {
        let overrides = load_overrides(path)
            .with_context(|| format!("reading parameter overrides from {}", path.display()))?;
        params.apply_overrides(&overrides)?;
        composed.sync_params(&mut params)?;
    }
    Ok((composed, params))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let (mut composed, mut params) = load(&cli)?;

    match cli.command {
        Commands::Info => {
            println!("shapestage-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("variant: {}", composed.variant);
            println!("zoom: {}", if composed.orbit.enable_zoom { "enabled" } else { "disabled" });
            println!("parameters: {}", params.len());
            println!("{}", SceneInspector::summary(&composed.scene));
            for id in SceneInspector::list_shapes(&composed.scene) {
                if let Some(info) = SceneInspector::inspect_shape(&composed.scene, id) {
                    println!("  {info}");
                }
            }
        }
        Commands::Simulate { frames, dt } => {
            let mut clock = FrameClock::new();
            let mut tally = EventTally::new();
            for _ in 0..frames {
                composed.sync_params(&mut params)?;
                composed.scene.step(clock.advance(dt))?;
                tally.absorb(&mut composed.scene);
            }
            let view = RenderView::default();
            print!("{}", DebugTextRenderer::new().render(&composed.scene, &view));
            println!("{tally}");
        }
        Commands::Params => {
            println!("{}", serde_json::to_string_pretty(&params.snapshot())?);
        }
        Commands::Pick { x, y, aspect } => {
            let ray = RenderView::default().ray_through(Vec2::new(x, y), aspect);
            let mut dispatcher = PointerDispatcher::new();
            dispatcher.pointer_moved(ray);
            let report = dispatcher.flush(&mut composed.scene)?;
            if report.entered.is_empty() {
                println!("no hover-reactive shape at ({x}, {y})");
            }
            for id in report.entered {
                if let Some(info) = SceneInspector::inspect_shape(&composed.scene, id) {
                    println!("entered {info}");
                }
            }
        }
    }

    composed.unmount(&mut params);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    if let Err(e) = run(cli) {
        tracing::error!("{e:#}");
        return Err(e);
    }
    Ok(())
}
